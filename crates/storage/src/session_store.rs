use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::repository::StorageError;

/// The two interruption slots the engine keeps between navigations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSlot {
    GuestSnapshot,
    PendingAction,
}

impl SessionSlot {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::GuestSnapshot => "wordtrail.guest_snapshot",
            Self::PendingAction => "wordtrail.pending_action",
        }
    }
}

/// Session-scoped key/value store for interrupt snapshots.
///
/// Values are JSON strings. `put` overwrites: the UI has at most one
/// interruption of each kind in flight, so a newer capture replaces the
/// older one rather than queueing behind it.
pub trait SessionSlotStore: Send + Sync {
    /// Store a value, replacing any previous occupant of the slot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    fn put(&self, slot: SessionSlot, json: String) -> Result<(), StorageError>;

    /// Read a slot without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be read.
    fn get(&self, slot: SessionSlot) -> Result<Option<String>, StorageError>;

    /// Read and destroy a slot in one step.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be read or cleared.
    fn take(&self, slot: SessionSlot) -> Result<Option<String>, StorageError>;

    /// Destroy a slot's value, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be cleared.
    fn clear(&self, slot: SessionSlot) -> Result<(), StorageError>;

    /// Wipe both slots (logout or session end).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be cleared.
    fn clear_all(&self) -> Result<(), StorageError>;
}

/// Process-local slot store.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    slots: Arc<Mutex<HashMap<&'static str, String>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SessionSlotStore for InMemorySessionStore {
    fn put(&self, slot: SessionSlot, json: String) -> Result<(), StorageError> {
        self.slots.lock().map_err(poisoned)?.insert(slot.key(), json);
        Ok(())
    }

    fn get(&self, slot: SessionSlot) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().map_err(poisoned)?.get(slot.key()).cloned())
    }

    fn take(&self, slot: SessionSlot) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().map_err(poisoned)?.remove(slot.key()))
    }

    fn clear(&self, slot: SessionSlot) -> Result<(), StorageError> {
        self.slots.lock().map_err(poisoned)?.remove(slot.key());
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StorageError> {
        self.slots.lock().map_err(poisoned)?.clear();
        Ok(())
    }
}
