//! Schema Migrations
//!
//! The local cache is a [`PersistedCacheEnvelope`]: a raw JSON state tagged
//! with the schema version it was written with. Older envelopes are upgraded
//! through an ordered table of transforms, one version step at a time.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{ClientConfiguration, ClientId};

pub mod errors;
mod steps;

pub use errors::MigrationError;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 4;

/// Envelopes written before versioning existed are version 1.
const fn unversioned() -> u32 {
    1
}

/// The locally cached state, tagged with its schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCacheEnvelope {
    /// Schema version of `state`.
    #[serde(default = "unversioned")]
    pub version: u32,

    /// Raw state in the shape of `version`.
    #[serde(default)]
    pub state: Value,
}

impl PersistedCacheEnvelope {
    /// An empty envelope at the current version.
    #[must_use]
    pub fn empty() -> Self {
        CacheState::default().to_envelope()
    }
}

/// One step in the migration chain.
pub struct Migration {
    /// Version the transform reads.
    pub from: u32,

    /// Version the transform writes.
    pub to: u32,

    /// Short description for logs.
    pub name: &'static str,

    apply: fn(Value) -> Result<Value, MigrationError>,
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Migration {
    /// Run the transform on a raw state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state does not have the shape of `from`.
    pub fn apply(&self, state: Value) -> Result<Value, MigrationError> {
        (self.apply)(state)
    }
}

/// Every migration, in application order.
pub const MIGRATIONS: [Migration; 3] = [
    Migration {
        from: 1,
        to: 2,
        name: "current client pointer",
        apply: steps::current_client_pointer,
    },
    Migration {
        from: 2,
        to: 3,
        name: "lead statuses rename",
        apply: steps::lead_statuses_rename,
    },
    Migration {
        from: 3,
        to: 4,
        name: "status collection backfill",
        apply: steps::backfill_collections,
    },
];

/// Upgrade an envelope to [`CURRENT_VERSION`].
///
/// An envelope that is already current is returned unchanged.
///
/// # Errors
///
/// Returns [`MigrationError::UnsupportedVersion`] for version 0 or a version
/// newer than this build, and the transform's error if one fails.
pub fn migrate(envelope: PersistedCacheEnvelope) -> Result<PersistedCacheEnvelope, MigrationError> {
    let PersistedCacheEnvelope { mut version, mut state } = envelope;

    if version == 0 || version > CURRENT_VERSION {
        return Err(MigrationError::UnsupportedVersion(version));
    }

    while version < CURRENT_VERSION {
        let migration = MIGRATIONS
            .iter()
            .find(|migration| migration.from == version)
            .ok_or(MigrationError::UnsupportedVersion(version))?;

        state = migration.apply(state)?;
        version = migration.to;
    }

    Ok(PersistedCacheEnvelope { version, state })
}

/// Typed view of a current-version envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheState {
    /// Cached clients.
    #[serde(default)]
    pub clients: Vec<ClientConfiguration>,

    /// Active client, if one was selected.
    #[serde(default)]
    pub current_client_id: Option<ClientId>,
}

impl CacheState {
    /// Wrap the state in a current-version envelope.
    #[must_use]
    pub fn to_envelope(&self) -> PersistedCacheEnvelope {
        PersistedCacheEnvelope {
            version: CURRENT_VERSION,
            state: serde_json::to_value(self).unwrap_or(Value::Null),
        }
    }

    /// Read the typed state out of a current-version envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope is not current or its state does not
    /// deserialize.
    pub fn from_envelope(envelope: PersistedCacheEnvelope) -> Result<Self, MigrationError> {
        if envelope.version != CURRENT_VERSION {
            return Err(MigrationError::UnsupportedVersion(envelope.version));
        }

        if envelope.state.is_null() {
            return Ok(Self::default());
        }

        Ok(serde_json::from_value(envelope.state)?)
    }
}

/// Migrate and read an envelope, falling back to an empty state.
///
/// Never yields a half-migrated state: on any failure the returned state is
/// empty and the error is handed back for the caller to log.
#[must_use]
pub fn migrate_or_reset(envelope: PersistedCacheEnvelope) -> (CacheState, Option<MigrationError>) {
    match migrate(envelope).and_then(CacheState::from_envelope) {
        Ok(state) => (state, None),
        Err(error) => (CacheState::default(), Some(error)),
    }
}
