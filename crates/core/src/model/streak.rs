use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::Topic;

/// Minimum score a streak must reach before it is worth persisting.
pub const RECORD_MIN_SCORE: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StreakError {
    #[error("a streak of {score} is below the record minimum of {RECORD_MIN_SCORE}")]
    BelowRecordMinimum { score: u32 },

    #[error("score ({score}) does not match word count ({words})")]
    ScoreMismatch { score: u32, words: usize },
}

/// Opaque identifier for a persisted streak record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreakId(Uuid);

impl StreakId {
    /// Mint a fresh id for a newly finalized streak.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for StreakId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to parse StreakId from string")]
pub struct ParseStreakIdError;

impl FromStr for StreakId {
    type Err = ParseStreakIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self).map_err(|_| ParseStreakIdError)
    }
}

/// Outcome of extending the live streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// The topic was appended and the score grew by one.
    Extended,
    /// The topic is already the most recent word; nothing changed.
    AlreadyCurrent,
}

/// The in-progress exploration chain.
///
/// The word list is non-empty from construction onward and the score is its
/// length, so `score == words.len()` cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStreak {
    words: Vec<Topic>,
}

impl LiveStreak {
    /// Start a chain at its root topic.
    #[must_use]
    pub fn start(root: Topic) -> Self {
        Self { words: vec![root] }
    }

    #[must_use]
    pub fn words(&self) -> &[Topic] {
        &self.words
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        u32::try_from(self.words.len()).unwrap_or(u32::MAX)
    }

    /// Append a topic to the chain.
    ///
    /// Re-extending with the word already at the end of the chain is a no-op,
    /// so a repeated click cannot inflate the score.
    pub fn extend(&mut self, topic: Topic) -> ExtendOutcome {
        if self.words.last() == Some(&topic) {
            return ExtendOutcome::AlreadyCurrent;
        }
        self.words.push(topic);
        ExtendOutcome::Extended
    }

    /// Finalize into a persistable record.
    ///
    /// # Errors
    ///
    /// Returns `StreakError::BelowRecordMinimum` for chains shorter than
    /// `RECORD_MIN_SCORE`; such streaks are discarded, never persisted.
    pub fn into_record(
        self,
        id: StreakId,
        completed_at: DateTime<Utc>,
    ) -> Result<StreakRecord, StreakError> {
        let score = self.score();
        if score < RECORD_MIN_SCORE {
            return Err(StreakError::BelowRecordMinimum { score });
        }
        Ok(StreakRecord {
            id,
            words: self.words,
            score,
            completed_at,
        })
    }
}

/// A finalized streak as it is persisted and listed in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    id: StreakId,
    words: Vec<Topic>,
    score: u32,
    completed_at: DateTime<Utc>,
}

impl StreakRecord {
    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `StreakError::ScoreMismatch` if the stored score does not
    /// match the word count, and `StreakError::BelowRecordMinimum` if a
    /// sub-minimum record somehow made it to storage.
    pub fn from_persisted(
        id: StreakId,
        words: Vec<Topic>,
        score: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, StreakError> {
        let expected = usize::try_from(score).unwrap_or(usize::MAX);
        if words.len() != expected {
            return Err(StreakError::ScoreMismatch {
                score,
                words: words.len(),
            });
        }
        if score < RECORD_MIN_SCORE {
            return Err(StreakError::BelowRecordMinimum { score });
        }

        Ok(Self {
            id,
            words,
            score,
            completed_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> StreakId {
        self.id
    }

    #[must_use]
    pub fn words(&self) -> &[Topic] {
        &self.words
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
