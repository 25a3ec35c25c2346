#![forbid(unsafe_code)]

pub mod http;
pub mod repository;
pub mod session_store;

pub use repository::{
    FavoriteRepository, InMemoryBackend, ProfileRepository, QuizAttemptRepository, Storage,
    StorageError, StreakRepository,
};
pub use session_store::{InMemorySessionStore, SessionSlot, SessionSlotStore};
