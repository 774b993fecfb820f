//! File-backed cache store.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use atrium::{clients::ClientId, migrations::PersistedCacheEnvelope};

use crate::cache::{CacheError, CacheStore};

/// Cache store writing JSON files next to each other.
///
/// The envelope lives at the configured path and the pointer beside it with
/// an `.active` extension. Writes go to a temp file in the same directory that
/// is then renamed over the target, so readers never see a partial file.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    envelope_path: PathBuf,
    pointer_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct ActivePointer {
    current_client_id: Option<ClientId>,
}

impl FileCacheStore {
    /// A store rooted at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let envelope_path = path.into();
        let pointer_path = envelope_path.with_extension("active");

        Self {
            envelope_path,
            pointer_path,
        }
    }

    /// Location of the envelope file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.envelope_path
    }

    fn read(path: &Path) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn replace(path: &Path, contents: &[u8]) -> Result<(), CacheError> {
        let directory = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        fs::create_dir_all(directory)?;

        let mut file = NamedTempFile::new_in(directory)?;

        file.write_all(contents)?;
        file.as_file().sync_all()?;
        file.persist(path)?;

        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn load_envelope(&self) -> Result<Option<PersistedCacheEnvelope>, CacheError> {
        Self::read(&self.envelope_path)?
            .map(|contents| serde_json::from_str(&contents))
            .transpose()
            .map_err(CacheError::from)
    }

    fn save_envelope(&self, envelope: &PersistedCacheEnvelope) -> Result<(), CacheError> {
        Self::replace(&self.envelope_path, &serde_json::to_vec_pretty(envelope)?)
    }

    fn load_active_pointer(&self) -> Result<Option<ClientId>, CacheError> {
        let pointer: Option<ActivePointer> = Self::read(&self.pointer_path)?
            .map(|contents| serde_json::from_str(&contents))
            .transpose()?;

        Ok(pointer.and_then(|pointer| pointer.current_client_id))
    }

    fn save_active_pointer(&self, id: Option<&ClientId>) -> Result<(), CacheError> {
        let pointer = ActivePointer {
            current_client_id: id.cloned(),
        };

        Self::replace(&self.pointer_path, &serde_json::to_vec(&pointer)?)
    }
}
