//! In-process storage.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{PersistedSession, SessionStorage, StorageError, StoredRecord};

/// Keeps the serialized record in memory.
///
/// Clones share the same slot, so a test can hand one clone to the
/// session store and inspect the other afterwards. The record goes through
/// the same JSON envelope as [`FileStorage`](crate::FileStorage), so a
/// corrupt record can be simulated with [`MemoryStorage::with_raw`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if a previous run had
    /// signed in.
    pub fn with_token(token: impl Into<String>) -> Self {
        let storage = Self::new();
        let bytes = StoredRecord::encode(&PersistedSession::with_token(token))
            .expect("a token-only record always serializes");
        *storage.lock() = Some(bytes);
        storage
    }

    /// A store holding arbitrary bytes.
    pub fn with_raw(bytes: impl Into<Vec<u8>>) -> Self {
        let storage = Self::new();
        *storage.lock() = Some(bytes.into());
        storage
    }

    /// The token currently stored, if any. Corrupt records read as `None`.
    pub fn stored_token(&self) -> Option<String> {
        self.load().ok().flatten().and_then(|session| session.token)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        // The slot holds plain bytes, so a panic elsewhere can't leave it
        // half-written.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        match self.lock().as_deref() {
            Some(bytes) => StoredRecord::decode(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let bytes = StoredRecord::encode(session)?;
        *self.lock() = Some(bytes);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.lock() = None;
        Ok(())
    }
}
