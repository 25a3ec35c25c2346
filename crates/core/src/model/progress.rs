use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{OptionKey, QuizQuestion};

/// A single answered question in a topic's quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub question_index: usize,
    pub selected: OptionKey,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizStateError {
    #[error("question index {index} is out of range for a quiz of {len}")]
    QuestionOutOfRange { index: usize, len: usize },
}

/// Outcome of recording an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The attempt was appended to the log.
    Recorded(QuizAttempt),
    /// The index was already answered; the log is unchanged.
    AlreadyAnswered,
}

/// Question queue for one topic plus its append-only attempt log.
///
/// The log holds at most one attempt per question index; the first write for
/// an index wins and later submissions change nothing. The "current question"
/// pointer and the score are both derived from the log, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicQuizState {
    questions: Vec<QuizQuestion>,
    attempts: Vec<QuizAttempt>,
}

impl TopicQuizState {
    #[must_use]
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            attempts: Vec::new(),
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn attempts(&self) -> &[QuizAttempt] {
        &self.attempts
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&QuizQuestion> {
        self.questions.get(index)
    }

    /// Append newly fetched questions to the queue.
    pub fn push_questions(&mut self, questions: Vec<QuizQuestion>) {
        self.questions.extend(questions);
    }

    /// Index of the question to show next: the number of distinct answered
    /// indices, clamped to the queue length. A value equal to
    /// `questions().len()` is the terminal summary state.
    #[must_use]
    pub fn current_index(&self) -> usize {
        let answered: HashSet<usize> = self
            .attempts
            .iter()
            .map(|attempt| attempt.question_index)
            .collect();
        answered.len().min(self.questions.len())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_index() == self.questions.len()
    }

    /// Correct answers so far; derived from the log.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.is_correct)
            .count()
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.attempts
            .iter()
            .any(|attempt| attempt.question_index == index)
    }

    /// Record an answer for `index`.
    ///
    /// The first write for an index wins; a repeat submission returns
    /// `AttemptOutcome::AlreadyAnswered` and leaves the log untouched, which
    /// keeps attempts idempotent by index regardless of arrival order.
    ///
    /// # Errors
    ///
    /// Returns `QuizStateError::QuestionOutOfRange` if `index` is past the
    /// question queue.
    pub fn record_attempt(
        &mut self,
        index: usize,
        selected: OptionKey,
        answered_at: DateTime<Utc>,
    ) -> Result<AttemptOutcome, QuizStateError> {
        let Some(question) = self.questions.get(index) else {
            return Err(QuizStateError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            });
        };

        if self.is_answered(index) {
            return Ok(AttemptOutcome::AlreadyAnswered);
        }

        let attempt = QuizAttempt {
            question_index: index,
            selected,
            is_correct: question.is_correct(selected),
            answered_at,
        };
        self.attempts.push(attempt.clone());
        Ok(AttemptOutcome::Recorded(attempt))
    }

    /// Clear the attempt log for a retake. The question queue is kept.
    pub fn reset(&mut self) {
        self.attempts.clear();
    }
}
