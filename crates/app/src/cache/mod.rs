//! Local cache
//!
//! The cache holds one [`PersistedCacheEnvelope`] plus the active client id
//! as a standalone pointer for resuming across sessions. Both are replaced
//! wholesale on every write.

use atrium::{clients::ClientId, migrations::PersistedCacheEnvelope};

pub mod errors;
mod file;
mod memory;

pub use errors::CacheError;
pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;

/// Persistent storage for the cached envelope and active pointer.
pub trait CacheStore: Send + Sync {
    /// The stored envelope, if one was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or decoded.
    fn load_envelope(&self) -> Result<Option<PersistedCacheEnvelope>, CacheError>;

    /// Replace the stored envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save_envelope(&self, envelope: &PersistedCacheEnvelope) -> Result<(), CacheError>;

    /// The stored active client id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_active_pointer(&self) -> Result<Option<ClientId>, CacheError>;

    /// Replace or clear the stored active client id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save_active_pointer(&self, id: Option<&ClientId>) -> Result<(), CacheError>;
}
