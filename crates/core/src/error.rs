use thiserror::Error;

use crate::model::{QuizQuestionError, QuizStateError, StreakError, TopicError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Question(#[from] QuizQuestionError),
    #[error(transparent)]
    QuizState(#[from] QuizStateError),
    #[error(transparent)]
    Streak(#[from] StreakError),
}
