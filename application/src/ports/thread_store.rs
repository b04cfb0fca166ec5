//! Thread identity store port
//!
//! Persists the single conversation identifier across restarts. A missing
//! value is a normal result meaning "no conversation yet".

use std::sync::Mutex;
use thiserror::Error;
use threadline_domain::ThreadId;

/// Errors that can occur when reading or writing the identity store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Stored state is corrupt: {0}")]
    Corrupt(String),
}

/// Durable key-value slot holding the current thread id.
///
/// Calls are synchronous from the caller's perspective.
pub trait ThreadIdentityStore: Send + Sync {
    /// Read the stored id; `Ok(None)` when nothing has been saved.
    fn load(&self) -> Result<Option<ThreadId>, StoreError>;

    /// Store `id`, overwriting any previous value. Idempotent.
    fn save(&self, id: &ThreadId) -> Result<(), StoreError>;

    /// Forget the stored id (start a new conversation).
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryThreadStore {
    slot: Mutex<Option<ThreadId>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread(id: ThreadId) -> Self {
        Self {
            slot: Mutex::new(Some(id)),
        }
    }
}

impl ThreadIdentityStore for InMemoryThreadStore {
    fn load(&self) -> Result<Option<ThreadId>, StoreError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    fn save(&self, id: &ThreadId) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|e| StoreError::Io(e.to_string()))?;
        *slot = Some(id.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|e| StoreError::Io(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}
