use std::sync::Arc;

use tracing::warn;

use storage::repository::StreakRepository;
use wordtrail_core::Clock;
use wordtrail_core::model::{ExtendOutcome, LiveStreak, StreakId, StreakRecord, Topic};

use crate::error::StreakServiceError;

/// Tracks the in-progress exploration chain and finalizes it into history
/// records.
///
/// State machine over `{ idle, active(LiveStreak) }`. Finalization is
/// fire-and-forget with respect to persistence: local state clears whether or
/// not the remote save lands, so a failed save silently loses that record.
/// That is an accepted trade-off of the design, not something this service
/// papers over with a retry queue.
pub struct StreakService {
    clock: Clock,
    streaks: Arc<dyn StreakRepository>,
    current: Option<LiveStreak>,
}

impl StreakService {
    #[must_use]
    pub fn new(clock: Clock, streaks: Arc<dyn StreakRepository>) -> Self {
        Self {
            clock,
            streaks,
            current: None,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&LiveStreak> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Clone the live chain for a guest snapshot.
    #[must_use]
    pub fn capture(&self) -> Option<LiveStreak> {
        self.current.clone()
    }

    /// Adopt a chain restored from a guest snapshot.
    pub fn restore(&mut self, streak: LiveStreak) {
        self.current = Some(streak);
    }

    /// Begin a new chain at `root`, finalizing any chain already active.
    ///
    /// Returns the record emitted for the previous chain, if it was long
    /// enough to persist.
    pub async fn start_new_streak(&mut self, root: Topic) -> Option<StreakRecord> {
        let finalized = self.finalize_streak().await;
        self.current = Some(LiveStreak::start(root));
        finalized
    }

    /// Append a topic to the active chain.
    ///
    /// Re-extending with the word already at the end of the chain returns
    /// `ExtendOutcome::AlreadyCurrent` and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError::NotActive` when no chain is active.
    pub fn extend_streak(&mut self, topic: Topic) -> Result<ExtendOutcome, StreakServiceError> {
        let Some(streak) = self.current.as_mut() else {
            return Err(StreakServiceError::NotActive);
        };
        Ok(streak.extend(topic))
    }

    /// Finalize the active chain and return to idle.
    ///
    /// A chain of two or more words becomes a `StreakRecord` handed to
    /// persistence; a shorter chain is discarded without persisting. The
    /// remote save is fire-and-forget: a failure is logged and the record is
    /// still returned, its local copy being all that remains of it.
    pub async fn finalize_streak(&mut self) -> Option<StreakRecord> {
        let streak = self.current.take()?;

        let record = match streak.into_record(StreakId::random(), self.clock.now()) {
            Ok(record) => record,
            // Below the record minimum: discard, never persist.
            Err(_) => return None,
        };

        if let Err(err) = self
            .streaks
            .save_streak(record.words(), record.score())
            .await
        {
            warn!(error = %err, score = record.score(), "streak save failed; record lost remotely");
        }

        Some(record)
    }
}
