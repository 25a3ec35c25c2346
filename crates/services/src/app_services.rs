use std::sync::Arc;

use storage::http::{HttpConfig, HttpInitError};
use storage::repository::Storage;
use storage::session_store::{InMemorySessionStore, SessionSlotStore};
use wordtrail_core::Clock;

use crate::content_service::ContentService;
use crate::favorite_service::FavoriteService;
use crate::quiz_service::QuizProgressService;
use crate::session::{SessionBridge, SessionWorkflow};
use crate::streak_service::StreakService;

/// Assembles the engine's services over one storage backend.
///
/// This is the construction point for a session: the binary glue builds one
/// of these at startup and hands the pieces to the UI layer.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    content: Arc<ContentService>,
    quiz_progress: Arc<QuizProgressService>,
    favorites: Arc<FavoriteService>,
    bridge: SessionBridge,
}

impl AppServices {
    /// Build services over the in-memory backend (tests, prototyping).
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::assemble(
            clock,
            Storage::in_memory(clock),
            Arc::new(InMemorySessionStore::new()),
            ContentService::from_env(),
        )
    }

    /// Build services over the remote HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns `HttpInitError` if the HTTP client cannot be constructed.
    pub fn http(clock: Clock, api: HttpConfig) -> Result<Self, HttpInitError> {
        Ok(Self::assemble(
            clock,
            Storage::http(api)?,
            Arc::new(InMemorySessionStore::new()),
            ContentService::from_env(),
        ))
    }

    /// Assemble services over explicit collaborators.
    #[must_use]
    pub fn assemble(
        clock: Clock,
        storage: Storage,
        slots: Arc<dyn SessionSlotStore>,
        content: ContentService,
    ) -> Self {
        let content = Arc::new(content);
        let quiz_progress = Arc::new(QuizProgressService::new(
            clock,
            Arc::clone(&storage.attempts),
        ));
        let favorites = Arc::new(FavoriteService::new(
            clock,
            Arc::clone(&storage.favorites),
            Arc::clone(&storage.profiles),
        ));
        let bridge = SessionBridge::new(slots);

        Self {
            clock,
            storage,
            content,
            quiz_progress,
            favorites,
            bridge,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn quiz_progress(&self) -> Arc<QuizProgressService> {
        Arc::clone(&self.quiz_progress)
    }

    #[must_use]
    pub fn favorites(&self) -> Arc<FavoriteService> {
        Arc::clone(&self.favorites)
    }

    #[must_use]
    pub fn bridge(&self) -> SessionBridge {
        self.bridge.clone()
    }

    /// Fresh streak tracker for a new session; the caller owns its state.
    #[must_use]
    pub fn new_streak_service(&self) -> StreakService {
        StreakService::new(self.clock, Arc::clone(&self.storage.streaks))
    }

    /// Workflow wired over this assembly's services.
    #[must_use]
    pub fn workflow(&self) -> SessionWorkflow {
        SessionWorkflow::new(
            Arc::clone(&self.content),
            Arc::clone(&self.quiz_progress),
            self.bridge.clone(),
        )
    }
}
