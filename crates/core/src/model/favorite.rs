use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local favorite flag for a topic.
///
/// `pending` is true only while a toggle request is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteState {
    pub value: bool,
    pub pending: bool,
}

impl FavoriteState {
    #[must_use]
    pub fn settled(value: bool) -> Self {
        Self {
            value,
            pending: false,
        }
    }

    #[must_use]
    pub fn in_flight(value: bool) -> Self {
        Self {
            value,
            pending: true,
        }
    }
}

/// Command issued for one optimistic toggle.
///
/// The command carries the pre-toggle value, so the rollback target stays
/// unambiguous even when toggles overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteToggle {
    pub prior_value: bool,
    pub issued_at: DateTime<Utc>,
}

impl FavoriteToggle {
    #[must_use]
    pub fn issue(prior_value: bool, issued_at: DateTime<Utc>) -> Self {
        Self {
            prior_value,
            issued_at,
        }
    }

    /// State shown while the request is in flight.
    #[must_use]
    pub fn optimistic(&self) -> FavoriteState {
        FavoriteState::in_flight(!self.prior_value)
    }

    /// State after a successful round trip.
    #[must_use]
    pub fn settled(&self) -> FavoriteState {
        FavoriteState::settled(!self.prior_value)
    }

    /// State after a failed round trip: exactly the pre-toggle value.
    #[must_use]
    pub fn rolled_back(&self) -> FavoriteState {
        FavoriteState::settled(self.prior_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn toggle_states_derive_from_the_prior_value() {
        let toggle = FavoriteToggle::issue(false, fixed_now());

        assert_eq!(toggle.optimistic(), FavoriteState::in_flight(true));
        assert_eq!(toggle.settled(), FavoriteState::settled(true));
        assert_eq!(toggle.rolled_back(), FavoriteState::settled(false));
    }

    #[test]
    fn rollback_restores_a_true_prior_value() {
        let toggle = FavoriteToggle::issue(true, fixed_now());
        assert_eq!(toggle.rolled_back(), FavoriteState::settled(true));
    }
}
