//! JSON-file storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{PersistedSession, RECORD_NAME, SessionStorage, StorageError, StoredRecord};

/// Directory under the platform data dir used by [`FileStorage::in_data_dir`].
const APP_DIR: &str = "learnhub";

/// Stores the session record as `<dir>/auth-storage.json`.
///
/// Writes go to a sibling temp file first and are then renamed over the
/// record, so a crash mid-write leaves either the old record or the new
/// one, never half of each.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Stores the record inside `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("{RECORD_NAME}.json")),
        })
    }

    /// Stores the record in the platform's per-user data directory
    /// (e.g. `~/.local/share/learnhub` on Linux).
    pub fn in_data_dir() -> Result<Self, StorageError> {
        let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Self::new(dir.join(APP_DIR))
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = StoredRecord::decode(&bytes)?;
        tracing::debug!(path = %self.path.display(), "session record loaded");
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let bytes = StoredRecord::encode(session)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "session record saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session record removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
