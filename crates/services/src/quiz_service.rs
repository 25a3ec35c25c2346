use std::sync::Arc;

use tracing::debug;

use storage::repository::QuizAttemptRepository;
use wordtrail_core::Clock;
use wordtrail_core::model::{AttemptOutcome, OptionKey, Topic, TopicQuizState};

use crate::error::QuizServiceError;

/// Applies quiz answers to per-topic state and forwards new attempts to
/// persistence.
pub struct QuizProgressService {
    clock: Clock,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl QuizProgressService {
    #[must_use]
    pub fn new(clock: Clock, attempts: Arc<dyn QuizAttemptRepository>) -> Self {
        Self { clock, attempts }
    }

    /// Record an answer and forward it to persistence.
    ///
    /// The local log is written first and drives the question pointer; a
    /// persistence failure is returned after the append so the caller can
    /// surface it without the attempt being lost. A repeat submission for an
    /// already-answered index is a no-op that forwards nothing, which keeps
    /// submissions idempotent by index regardless of arrival order.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::State` for an out-of-range index and
    /// `QuizServiceError::Storage` when forwarding fails.
    pub async fn submit_attempt(
        &self,
        topic: &Topic,
        state: &mut TopicQuizState,
        index: usize,
        selected: OptionKey,
    ) -> Result<AttemptOutcome, QuizServiceError> {
        let outcome = state.record_attempt(index, selected, self.clock.now())?;

        match &outcome {
            AttemptOutcome::Recorded(attempt) => {
                self.attempts.save_attempt(topic, attempt).await?;
            }
            AttemptOutcome::AlreadyAnswered => {
                debug!(
                    topic = topic.as_str(),
                    index, "attempt already recorded; nothing forwarded"
                );
            }
        }

        Ok(outcome)
    }

    /// Clear a topic's attempt log for a retake.
    ///
    /// Only local state is touched; whether server-side history resets is the
    /// backend's concern.
    pub fn reset_topic(&self, state: &mut TopicQuizState) {
        state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use storage::repository::{InMemoryBackend, StorageError};
    use wordtrail_core::model::{QuizAttempt, QuizQuestion, QuizStateError};
    use wordtrail_core::time::fixed_clock;

    fn topic(name: &str) -> Topic {
        Topic::new(name).unwrap()
    }

    fn question(text: &str, correct: OptionKey) -> QuizQuestion {
        let options = BTreeMap::from([
            (OptionKey::A, "first".to_string()),
            (OptionKey::B, "second".to_string()),
        ]);
        QuizQuestion::new(text, options, correct, None).unwrap()
    }

    fn state() -> TopicQuizState {
        TopicQuizState::new(vec![
            question("Q1", OptionKey::A),
            question("Q2", OptionKey::B),
        ])
    }

    struct FailingAttemptRepo;

    #[async_trait]
    impl QuizAttemptRepository for FailingAttemptRepo {
        async fn save_attempt(
            &self,
            _topic: &Topic,
            _attempt: &QuizAttempt,
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("backend unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn recorded_attempts_are_forwarded_with_correctness_computed() {
        let backend = InMemoryBackend::new(fixed_clock());
        let service = QuizProgressService::new(fixed_clock(), Arc::new(backend.clone()));
        let word = topic("cat");
        let mut state = state();

        let outcome = service
            .submit_attempt(&word, &mut state, 0, OptionKey::A)
            .await
            .unwrap();
        assert!(matches!(outcome, AttemptOutcome::Recorded(_)));

        let stored = backend.stored_attempts().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, word);
        assert!(stored[0].1.is_correct);
    }

    #[tokio::test]
    async fn duplicate_submission_forwards_nothing() {
        let backend = InMemoryBackend::new(fixed_clock());
        let service = QuizProgressService::new(fixed_clock(), Arc::new(backend.clone()));
        let word = topic("cat");
        let mut state = state();

        service
            .submit_attempt(&word, &mut state, 0, OptionKey::A)
            .await
            .unwrap();
        let second = service
            .submit_attempt(&word, &mut state, 0, OptionKey::B)
            .await
            .unwrap();

        assert!(matches!(second, AttemptOutcome::AlreadyAnswered));
        assert_eq!(state.attempts().len(), 1);
        assert_eq!(state.attempts()[0].selected, OptionKey::A);
        assert_eq!(backend.stored_attempts().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_keeps_the_local_attempt() {
        let service = QuizProgressService::new(fixed_clock(), Arc::new(FailingAttemptRepo));
        let word = topic("cat");
        let mut state = state();

        let err = service
            .submit_attempt(&word, &mut state, 0, OptionKey::B)
            .await
            .unwrap_err();

        assert!(matches!(err, QuizServiceError::Storage(_)));
        assert_eq!(state.attempts().len(), 1);
        assert_eq!(state.current_index(), 1);
    }

    #[tokio::test]
    async fn out_of_range_index_is_a_state_error() {
        let backend = InMemoryBackend::new(fixed_clock());
        let service = QuizProgressService::new(fixed_clock(), Arc::new(backend));
        let word = topic("cat");
        let mut state = state();

        let err = service
            .submit_attempt(&word, &mut state, 9, OptionKey::A)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuizServiceError::State(QuizStateError::QuestionOutOfRange { index: 9, len: 2 })
        ));
    }

    #[tokio::test]
    async fn reset_starts_the_quiz_over_locally() {
        let backend = InMemoryBackend::new(fixed_clock());
        let service = QuizProgressService::new(fixed_clock(), Arc::new(backend));
        let word = topic("cat");
        let mut state = state();

        service
            .submit_attempt(&word, &mut state, 0, OptionKey::A)
            .await
            .unwrap();
        service.reset_topic(&mut state);

        assert_eq!(state.current_index(), 0);
        assert!(state.attempts().is_empty());
    }
}
