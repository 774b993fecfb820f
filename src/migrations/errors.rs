//! Migration errors

use thiserror::Error;

/// Errors raised while upgrading a persisted cache envelope.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The envelope claims a version this build cannot read.
    #[error("unsupported cache schema version {0}")]
    UnsupportedVersion(u32),

    /// The envelope's state does not have the expected shape.
    #[error("malformed cache state: {0}")]
    MalformedState(String),

    /// Converting between the raw and typed state failed.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
