//! Cache store errors.

use thiserror::Error;

/// Errors raised by a cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the cache file failed.
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache file is not valid JSON.
    #[error("cache decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Moving the written temp file into place failed.
    #[error("cache persist error: {0}")]
    Persist(#[from] tempfile::PersistError),
}
