use std::sync::Arc;

use storage::repository::{FavoriteRepository, ProfileRepository};
use wordtrail_core::Clock;
use wordtrail_core::model::{FavoriteState, FavoriteToggle, Profile, Topic};

use crate::error::FavoriteServiceError;

/// Optimistic favorite toggling with explicit rollback.
///
/// Each toggle is modeled as a command carrying the pre-toggle value, so a
/// failed request reverts to exactly that value and nothing else. Nothing is
/// retried automatically; the authoritative value is whatever the next full
/// profile read reports.
pub struct FavoriteService {
    clock: Clock,
    favorites: Arc<dyn FavoriteRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl FavoriteService {
    #[must_use]
    pub fn new(
        clock: Clock,
        favorites: Arc<dyn FavoriteRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            clock,
            favorites,
            profiles,
        }
    }

    /// Toggle a topic's favorite flag.
    ///
    /// `state` is flipped optimistically (with `pending` set) before the
    /// request goes out. On success the flip settles; on failure the state
    /// reverts to the pre-toggle value and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteServiceError::Storage` when the request fails; the
    /// state has already been rolled back by then.
    pub async fn toggle(
        &self,
        topic: &Topic,
        state: &mut FavoriteState,
    ) -> Result<(), FavoriteServiceError> {
        let command = FavoriteToggle::issue(state.value, self.clock.now());
        *state = command.optimistic();

        match self.favorites.toggle_favorite(topic).await {
            Ok(()) => {
                *state = command.settled();
                Ok(())
            }
            Err(err) => {
                *state = command.rolled_back();
                Err(err.into())
            }
        }
    }

    /// Fetch the authoritative profile for reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `FavoriteServiceError::Storage` when the read fails.
    pub async fn refresh_profile(&self) -> Result<Profile, FavoriteServiceError> {
        Ok(self.profiles.fetch_profile().await?)
    }

    /// Adopt the authoritative value from a profile read, unless a toggle is
    /// still in flight (the local flip wins until its request settles).
    pub fn reconcile(&self, topic: &Topic, state: &mut FavoriteState, profile: &Profile) {
        if state.pending {
            return;
        }
        *state = FavoriteState::settled(profile.is_favorite(topic));
    }
}
