//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use wordtrail_core::model::{QuizStateError, Topic};

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error("content generation is not configured")]
    Disabled,
    #[error("content generation returned an empty response")]
    EmptyResponse,
    #[error("authentication required")]
    AuthRequired,
    #[error("rate limited by the content service")]
    RateLimited,
    #[error("content request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ContentServiceError {
    /// Whether this failure blocks the action behind an interrupt/resume
    /// cycle instead of a plain retry message.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::RateLimited)
    }
}

/// Errors emitted by `StreakService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreakServiceError {
    #[error("no streak is active")]
    NotActive,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    State(#[from] QuizStateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `FavoriteService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FavoriteServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the session bridge.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the session workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no quiz loaded for topic {topic}")]
    TopicNotLoaded { topic: Topic },
    #[error(transparent)]
    Content(#[from] ContentServiceError),
    #[error(transparent)]
    Quiz(#[from] QuizServiceError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
