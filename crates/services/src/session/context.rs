use std::collections::BTreeMap;

use wordtrail_core::model::{
    FavoriteState, GuestSnapshot, InterruptedAction, LiveStreak, Topic, TopicQuizState,
};

/// Live state for one continuous app session.
///
/// Constructed at session start and cleared at logout; components receive it
/// explicitly instead of reaching for module-level globals. Quiz states are
/// created lazily on first quiz-content fetch and live for the whole session.
#[derive(Debug, Default)]
pub struct SessionContext {
    focus: Option<Topic>,
    cached_content: BTreeMap<Topic, String>,
    quizzes: BTreeMap<Topic, TopicQuizState>,
    favorites: BTreeMap<Topic, FavoriteState>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn focus(&self) -> Option<&Topic> {
        self.focus.as_ref()
    }

    pub fn set_focus(&mut self, topic: Topic) {
        self.focus = Some(topic);
    }

    pub fn cache_content(&mut self, topic: Topic, explanation: String) {
        self.cached_content.insert(topic, explanation);
    }

    #[must_use]
    pub fn cached_content(&self, topic: &Topic) -> Option<&str> {
        self.cached_content.get(topic).map(String::as_str)
    }

    #[must_use]
    pub fn quiz(&self, topic: &Topic) -> Option<&TopicQuizState> {
        self.quizzes.get(topic)
    }

    pub fn quiz_mut(&mut self, topic: &Topic) -> Option<&mut TopicQuizState> {
        self.quizzes.get_mut(topic)
    }

    pub fn insert_quiz(&mut self, topic: Topic, state: TopicQuizState) {
        self.quizzes.insert(topic, state);
    }

    /// Current favorite state for a topic; an unseen topic is not a favorite.
    #[must_use]
    pub fn favorite(&self, topic: &Topic) -> FavoriteState {
        self.favorites
            .get(topic)
            .copied()
            .unwrap_or_else(|| FavoriteState::settled(false))
    }

    pub fn favorite_mut(&mut self, topic: &Topic) -> &mut FavoriteState {
        self.favorites
            .entry(topic.clone())
            .or_insert_with(|| FavoriteState::settled(false))
    }

    /// Copy the session into a guest snapshot.
    ///
    /// `streak` comes from the streak tracker (which owns it) and `resume`
    /// notes the action to replay after login, if one was blocked.
    #[must_use]
    pub fn snapshot(
        &self,
        streak: Option<LiveStreak>,
        resume: Option<InterruptedAction>,
    ) -> GuestSnapshot {
        GuestSnapshot {
            streak,
            quizzes: self.quizzes.clone(),
            focus: self.focus.clone(),
            cached_content: self.cached_content.clone(),
            resume,
        }
    }

    /// Merge a restored snapshot back into live state.
    ///
    /// Returns the streak for the tracker to adopt and the action to resume,
    /// if one was captured. Favorites are untouched; they were never part of
    /// the snapshot.
    pub fn restore(
        &mut self,
        snapshot: GuestSnapshot,
    ) -> (Option<LiveStreak>, Option<InterruptedAction>) {
        if let Some(focus) = snapshot.focus {
            self.focus = Some(focus);
        }
        self.cached_content.extend(snapshot.cached_content);
        self.quizzes.extend(snapshot.quizzes);
        (snapshot.streak, snapshot.resume)
    }

    /// Drop all per-session state (logout / session end).
    pub fn clear(&mut self) {
        self.focus = None;
        self.cached_content.clear();
        self.quizzes.clear();
        self.favorites.clear();
    }
}
