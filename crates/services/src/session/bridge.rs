use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use storage::session_store::{SessionSlot, SessionSlotStore};
use wordtrail_core::model::{GuestSnapshot, InterruptedAction};

use crate::error::BridgeError;

/// Capture-signal-replay over the two session slots.
///
/// Both interruption kinds share one shape: serialize the minimal state into
/// a slot, surface the prompt, replay on resume, destroy the slot. Capturing
/// over an occupied slot overwrites it; the UI only ever has one interruption
/// of each kind in flight.
#[derive(Clone)]
pub struct SessionBridge {
    store: Arc<dyn SessionSlotStore>,
}

impl SessionBridge {
    #[must_use]
    pub fn new(store: Arc<dyn SessionSlotStore>) -> Self {
        Self { store }
    }

    fn capture<T: Serialize>(&self, slot: SessionSlot, value: &T) -> Result<(), BridgeError> {
        let json = serde_json::to_string(value)?;
        self.store.put(slot, json)?;
        debug!(slot = slot.key(), "interrupt state captured");
        Ok(())
    }

    fn peek<T: DeserializeOwned>(&self, slot: SessionSlot) -> Result<Option<T>, BridgeError> {
        match self.store.get(slot)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn take<T: DeserializeOwned>(&self, slot: SessionSlot) -> Result<Option<T>, BridgeError> {
        match self.store.take(slot)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Capture everything a guest needs to survive the login wall.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the snapshot cannot be serialized or stored.
    pub fn capture_guest_snapshot(&self, snapshot: &GuestSnapshot) -> Result<(), BridgeError> {
        self.capture(SessionSlot::GuestSnapshot, snapshot)
    }

    /// Read and destroy the guest snapshot after a successful login.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the slot cannot be read or decoded.
    pub fn take_guest_snapshot(&self) -> Result<Option<GuestSnapshot>, BridgeError> {
        self.take(SessionSlot::GuestSnapshot)
    }

    /// Capture the single choice a rate limit interrupted.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the action cannot be serialized or stored.
    pub fn capture_pending_action(&self, action: &InterruptedAction) -> Result<(), BridgeError> {
        self.capture(SessionSlot::PendingAction, action)
    }

    /// Read the pending choice without destroying it. The slot is cleared
    /// only after a successful replay, via [`Self::clear_pending_action`], so
    /// the choice is never replayed twice and never lost to a failed replay.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the slot cannot be read or decoded.
    pub fn peek_pending_action(&self) -> Result<Option<InterruptedAction>, BridgeError> {
        self.peek(SessionSlot::PendingAction)
    }

    /// Destroy the pending choice after it has been replayed.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the slot cannot be cleared.
    pub fn clear_pending_action(&self) -> Result<(), BridgeError> {
        Ok(self.store.clear(SessionSlot::PendingAction)?)
    }

    /// Wipe both slots (logout or session end).
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the store cannot be cleared.
    pub fn clear_all(&self) -> Result<(), BridgeError> {
        Ok(self.store.clear_all()?)
    }
}
