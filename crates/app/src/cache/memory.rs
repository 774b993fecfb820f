//! In-memory cache store.

use std::sync::{Mutex, PoisonError};

use atrium::{clients::ClientId, migrations::PersistedCacheEnvelope};

use crate::cache::{CacheError, CacheStore};

/// Cache store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    envelope: Mutex<Option<PersistedCacheEnvelope>>,
    pointer: Mutex<Option<ClientId>>,
}

impl MemoryCacheStore {
    /// A store pre-loaded with an envelope and pointer.
    #[must_use]
    pub fn with_contents(envelope: Option<PersistedCacheEnvelope>, pointer: Option<ClientId>) -> Self {
        Self {
            envelope: Mutex::new(envelope),
            pointer: Mutex::new(pointer),
        }
    }

    /// The envelope currently held.
    #[must_use]
    pub fn envelope(&self) -> Option<PersistedCacheEnvelope> {
        self.envelope
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The pointer currently held.
    #[must_use]
    pub fn pointer(&self) -> Option<ClientId> {
        self.pointer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load_envelope(&self) -> Result<Option<PersistedCacheEnvelope>, CacheError> {
        Ok(self.envelope())
    }

    fn save_envelope(&self, envelope: &PersistedCacheEnvelope) -> Result<(), CacheError> {
        *self.envelope.lock().unwrap_or_else(PoisonError::into_inner) = Some(envelope.clone());

        Ok(())
    }

    fn load_active_pointer(&self) -> Result<Option<ClientId>, CacheError> {
        Ok(self.pointer())
    }

    fn save_active_pointer(&self, id: Option<&ClientId>) -> Result<(), CacheError> {
        *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = id.cloned();

        Ok(())
    }
}
