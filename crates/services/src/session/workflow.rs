use std::sync::Arc;

use tracing::debug;

use wordtrail_core::model::{
    AttemptOutcome, InterruptedAction, OptionKey, StreakRecord, Topic, TopicQuizState,
};

use super::bridge::SessionBridge;
use super::context::SessionContext;
use crate::content_service::{ContentService, ContentMode, GeneratedContent};
use crate::error::{ContentServiceError, SessionError};
use crate::quiz_service::QuizProgressService;
use crate::streak_service::StreakService;

/// Where a newly opened topic lands in the exploration chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicPlacement {
    /// A fresh root search; finalizes any active chain first.
    Root,
    /// A related-topic click that grows the active chain.
    Chained,
}

/// Orchestrates topic exploration across content generation, streak
/// tracking, quiz state, and the interrupt bridge.
///
/// Every entry point that can hit a login wall or a rate limit captures the
/// interrupted intent before surfacing the error, and the resume paths replay
/// that intent through these same entry points, so resumed state matches what
/// an uninterrupted call would have produced.
#[derive(Clone)]
pub struct SessionWorkflow {
    content: Arc<ContentService>,
    quizzes: Arc<QuizProgressService>,
    bridge: SessionBridge,
}

impl SessionWorkflow {
    #[must_use]
    pub fn new(
        content: Arc<ContentService>,
        quizzes: Arc<QuizProgressService>,
        bridge: SessionBridge,
    ) -> Self {
        Self {
            content,
            quizzes,
            bridge,
        }
    }

    #[must_use]
    pub fn bridge(&self) -> &SessionBridge {
        &self.bridge
    }

    /// Open a topic: fetch explanation and quiz content, cache both, and
    /// grow (or start) the exploration chain.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` when generation fails. A blocking
    /// failure (login wall, rate limit) captures the interrupted intent
    /// before the error is returned; nothing in the session mutates on any
    /// failure path.
    pub async fn explore_topic(
        &self,
        ctx: &mut SessionContext,
        streaks: &mut StreakService,
        topic: Topic,
        placement: TopicPlacement,
    ) -> Result<(), SessionError> {
        let content = match self.content.generate(&topic, ContentMode::Quiz, None).await {
            Ok(content) => content,
            Err(err) => {
                self.note_interrupt(
                    ctx,
                    streaks,
                    &err,
                    InterruptedAction::ExploreTopic {
                        topic: topic.clone(),
                    },
                )?;
                return Err(err.into());
            }
        };

        self.apply_generated(ctx, &topic, content);

        match placement {
            TopicPlacement::Root => {
                streaks.start_new_streak(topic.clone()).await;
            }
            TopicPlacement::Chained => {
                if streaks.is_active() {
                    // NotActive is unreachable here; the guard above holds.
                    let _ = streaks.extend_streak(topic.clone());
                } else {
                    streaks.start_new_streak(topic.clone()).await;
                }
            }
        }

        ctx.set_focus(topic);
        Ok(())
    }

    /// Continue a branching dialogue with the user's chosen option.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Content` when generation fails; a blocking
    /// failure captures the choice for replay, and the partial state of the
    /// failed call never reaches the session.
    pub async fn choose_branch(
        &self,
        ctx: &mut SessionContext,
        streaks: &mut StreakService,
        topic: &Topic,
        choice: &str,
    ) -> Result<(), SessionError> {
        let prior = ctx.cached_content(topic).map(str::to_string);

        let content = match self.content.branch(topic, choice, prior.as_deref()).await {
            Ok(content) => content,
            Err(err) => {
                self.note_interrupt(
                    ctx,
                    streaks,
                    &err,
                    InterruptedAction::BranchChoice {
                        topic: topic.clone(),
                        choice: choice.to_string(),
                    },
                )?;
                return Err(err.into());
            }
        };

        self.apply_generated(ctx, topic, content);
        Ok(())
    }

    /// Submit an answer for the focused topic's quiz.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::TopicNotLoaded` when no quiz exists for the
    /// topic, and propagates quiz/persistence failures.
    pub async fn submit_attempt(
        &self,
        ctx: &mut SessionContext,
        topic: &Topic,
        index: usize,
        selected: OptionKey,
    ) -> Result<AttemptOutcome, SessionError> {
        let Some(state) = ctx.quiz_mut(topic) else {
            return Err(SessionError::TopicNotLoaded {
                topic: topic.clone(),
            });
        };
        Ok(self
            .quizzes
            .submit_attempt(topic, state, index, selected)
            .await?)
    }

    /// Restore the guest snapshot after a successful login and replay the
    /// action it noted, if any.
    ///
    /// The snapshot is destroyed on read; it never survives the one
    /// interruption cycle it was captured for.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the snapshot cannot be read or the replay
    /// fails.
    pub async fn resume_after_login(
        &self,
        ctx: &mut SessionContext,
        streaks: &mut StreakService,
    ) -> Result<Option<InterruptedAction>, SessionError> {
        let Some(snapshot) = self.bridge.take_guest_snapshot()? else {
            return Ok(None);
        };

        let (streak, resume) = ctx.restore(snapshot);
        if let Some(streak) = streak {
            streaks.restore(streak);
        }
        debug!("guest snapshot restored after login");

        if let Some(action) = resume.clone() {
            self.replay(ctx, streaks, action).await?;
        }
        Ok(resume)
    }

    /// Replay the choice a rate limit interrupted, at most once.
    ///
    /// The slot is cleared only after the replay succeeds; a failed replay
    /// keeps the choice captured for the next resume.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the slot cannot be read or the replay
    /// fails.
    pub async fn resume_pending_action(
        &self,
        ctx: &mut SessionContext,
        streaks: &mut StreakService,
    ) -> Result<Option<InterruptedAction>, SessionError> {
        let Some(action) = self.bridge.peek_pending_action()? else {
            return Ok(None);
        };

        self.replay(ctx, streaks, action.clone()).await?;
        self.bridge.clear_pending_action()?;
        Ok(Some(action))
    }

    /// End the session: finalize the streak, drop live state, wipe the
    /// interrupt slots. Returns the streak record emitted on the way out, if
    /// the chain was long enough.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bridge` when the slots cannot be cleared.
    pub async fn teardown(
        &self,
        ctx: &mut SessionContext,
        streaks: &mut StreakService,
    ) -> Result<Option<StreakRecord>, SessionError> {
        let record = streaks.finalize_streak().await;
        ctx.clear();
        self.bridge.clear_all()?;
        Ok(record)
    }

    /// Route a blocked call's intent into the matching interrupt slot.
    fn note_interrupt(
        &self,
        ctx: &SessionContext,
        streaks: &StreakService,
        err: &ContentServiceError,
        action: InterruptedAction,
    ) -> Result<(), SessionError> {
        match err {
            ContentServiceError::AuthRequired => {
                let snapshot = ctx.snapshot(streaks.capture(), Some(action));
                self.bridge.capture_guest_snapshot(&snapshot)?;
            }
            ContentServiceError::RateLimited => {
                self.bridge.capture_pending_action(&action)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply a replayed intent through the same transition functions the
    /// original call would have used.
    async fn replay(
        &self,
        ctx: &mut SessionContext,
        streaks: &mut StreakService,
        action: InterruptedAction,
    ) -> Result<(), SessionError> {
        match action {
            InterruptedAction::ExploreTopic { topic } => {
                self.explore_topic(ctx, streaks, topic, TopicPlacement::Chained)
                    .await
            }
            InterruptedAction::BranchChoice { topic, choice } => {
                self.choose_branch(ctx, streaks, &topic, &choice).await
            }
        }
    }

    fn apply_generated(&self, ctx: &mut SessionContext, topic: &Topic, content: GeneratedContent) {
        let questions = content.quiz_questions();

        if let Some(explanation) = content.explanation {
            ctx.cache_content(topic.clone(), explanation);
        }

        if !questions.is_empty() {
            match ctx.quiz_mut(topic) {
                Some(state) => state.push_questions(questions),
                None => ctx.insert_quiz(topic.clone(), TopicQuizState::new(questions)),
            }
        }
    }
}
