use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use wordtrail_core::Clock;
use wordtrail_core::model::{Profile, QuizAttempt, StreakId, StreakRecord, Topic};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("authentication required")]
    Unauthorized,

    #[error("rate limited")]
    RateLimited,

    #[error("backend returned status {status}")]
    Http { status: u16 },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract for finalized streaks.
#[async_trait]
pub trait StreakRepository: Send + Sync {
    /// Persist a finalized streak and return the refreshed history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the streak cannot be stored.
    async fn save_streak(
        &self,
        words: &[Topic],
        score: u32,
    ) -> Result<Vec<StreakRecord>, StorageError>;
}

/// Persistence contract for quiz attempts.
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    /// Append one attempt to the topic's remote history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn save_attempt(
        &self,
        topic: &Topic,
        attempt: &QuizAttempt,
    ) -> Result<(), StorageError>;
}

/// Persistence contract for favorite flags.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Flip the favorite flag for a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the toggle cannot be applied.
    async fn toggle_favorite(&self, topic: &Topic) -> Result<(), StorageError>;
}

/// Read contract for the authoritative profile.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the full profile for the current user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be read.
    async fn fetch_profile(&self) -> Result<Profile, StorageError>;
}

/// In-memory backend for tests and prototyping.
///
/// Behaves like the remote API: `save_streak` assigns server-side ids and
/// timestamps, `fetch_profile` reflects everything stored so far.
#[derive(Clone)]
pub struct InMemoryBackend {
    clock: Clock,
    explored: Arc<Mutex<Vec<Topic>>>,
    favorites: Arc<Mutex<BTreeSet<Topic>>>,
    streaks: Arc<Mutex<Vec<StreakRecord>>>,
    attempts: Arc<Mutex<Vec<(Topic, QuizAttempt)>>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            explored: Arc::new(Mutex::new(Vec::new())),
            favorites: Arc::new(Mutex::new(BTreeSet::new())),
            streaks: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Attempts stored so far, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the inner lock is poisoned.
    pub fn stored_attempts(&self) -> Result<Vec<(Topic, QuizAttempt)>, StorageError> {
        Ok(self.attempts.lock().map_err(poisoned)?.clone())
    }

    /// Streak records stored so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the inner lock is poisoned.
    pub fn stored_streaks(&self) -> Result<Vec<StreakRecord>, StorageError> {
        Ok(self.streaks.lock().map_err(poisoned)?.clone())
    }

    fn note_explored(explored: &mut Vec<Topic>, topic: &Topic) {
        if !explored.contains(topic) {
            explored.push(topic.clone());
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl StreakRepository for InMemoryBackend {
    async fn save_streak(
        &self,
        words: &[Topic],
        score: u32,
    ) -> Result<Vec<StreakRecord>, StorageError> {
        let record = StreakRecord::from_persisted(
            StreakId::random(),
            words.to_vec(),
            score,
            self.clock.now(),
        )
        .map_err(ser)?;

        let mut explored = self.explored.lock().map_err(poisoned)?;
        for word in words {
            Self::note_explored(&mut explored, word);
        }
        drop(explored);

        let mut streaks = self.streaks.lock().map_err(poisoned)?;
        streaks.push(record);
        Ok(streaks.clone())
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryBackend {
    async fn save_attempt(
        &self,
        topic: &Topic,
        attempt: &QuizAttempt,
    ) -> Result<(), StorageError> {
        let mut explored = self.explored.lock().map_err(poisoned)?;
        Self::note_explored(&mut explored, topic);
        drop(explored);

        self.attempts
            .lock()
            .map_err(poisoned)?
            .push((topic.clone(), attempt.clone()));
        Ok(())
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryBackend {
    async fn toggle_favorite(&self, topic: &Topic) -> Result<(), StorageError> {
        let mut favorites = self.favorites.lock().map_err(poisoned)?;
        if !favorites.remove(topic) {
            favorites.insert(topic.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryBackend {
    async fn fetch_profile(&self) -> Result<Profile, StorageError> {
        Ok(Profile {
            explored_words: self.explored.lock().map_err(poisoned)?.clone(),
            favorite_words: self
                .favorites
                .lock()
                .map_err(poisoned)?
                .iter()
                .cloned()
                .collect(),
            streak_history: self.streaks.lock().map_err(poisoned)?.clone(),
        })
    }
}

/// Aggregates the persistence traits behind trait objects so backends swap
/// without touching the services.
#[derive(Clone)]
pub struct Storage {
    pub streaks: Arc<dyn StreakRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        let backend = InMemoryBackend::new(clock);
        Self {
            streaks: Arc::new(backend.clone()),
            attempts: Arc::new(backend.clone()),
            favorites: Arc::new(backend.clone()),
            profiles: Arc::new(backend),
        }
    }

    /// Build storage backed by the remote HTTP API.
    ///
    /// # Errors
    ///
    /// Returns `HttpInitError` if the HTTP client cannot be constructed.
    pub fn http(config: crate::http::HttpConfig) -> Result<Self, crate::http::HttpInitError> {
        let backend = crate::http::HttpRepository::new(config)?;
        Ok(Self {
            streaks: Arc::new(backend.clone()),
            attempts: Arc::new(backend.clone()),
            favorites: Arc::new(backend.clone()),
            profiles: Arc::new(backend),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordtrail_core::model::OptionKey;
    use wordtrail_core::time::{fixed_clock, fixed_now};

    fn topic(name: &str) -> Topic {
        Topic::new(name).unwrap()
    }

    fn attempt(index: usize) -> QuizAttempt {
        QuizAttempt {
            question_index: index,
            selected: OptionKey::A,
            is_correct: true,
            answered_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn saved_streaks_show_up_in_the_profile() {
        let backend = InMemoryBackend::new(fixed_clock());
        let words = vec![topic("cat"), topic("feline")];

        let history = backend.save_streak(&words, 2).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score(), 2);
        assert_eq!(history[0].completed_at(), fixed_now());

        let profile = backend.fetch_profile().await.unwrap();
        assert_eq!(profile.streak_history.len(), 1);
        assert_eq!(profile.explored_words, words);
    }

    #[tokio::test]
    async fn mismatched_score_is_rejected() {
        let backend = InMemoryBackend::new(fixed_clock());
        let err = backend
            .save_streak(&[topic("cat")], 3)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn toggling_twice_returns_to_the_original_state() {
        let backend = InMemoryBackend::new(fixed_clock());
        let word = topic("cat");

        backend.toggle_favorite(&word).await.unwrap();
        assert!(backend.fetch_profile().await.unwrap().is_favorite(&word));

        backend.toggle_favorite(&word).await.unwrap();
        assert!(!backend.fetch_profile().await.unwrap().is_favorite(&word));
    }

    #[tokio::test]
    async fn attempts_are_kept_in_arrival_order() {
        let backend = InMemoryBackend::new(fixed_clock());
        let word = topic("cat");

        backend.save_attempt(&word, &attempt(0)).await.unwrap();
        backend.save_attempt(&word, &attempt(1)).await.unwrap();

        let stored = backend.stored_attempts().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].1.question_index, 0);
        assert_eq!(stored[1].1.question_index, 1);
    }
}
