use serde::{Deserialize, Serialize};

use crate::model::{StreakRecord, Topic};

/// Authoritative per-user view returned by the backend.
///
/// The favorite controller reconciles its optimistic state against this on
/// every full profile read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub explored_words: Vec<Topic>,
    pub favorite_words: Vec<Topic>,
    pub streak_history: Vec<StreakRecord>,
}

impl Profile {
    #[must_use]
    pub fn is_favorite(&self, topic: &Topic) -> bool {
        self.favorite_words.contains(topic)
    }
}
