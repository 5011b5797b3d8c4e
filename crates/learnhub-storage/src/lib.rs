//! Durable session storage for Learnhub.
//!
//! Provides the [`SessionStorage`] trait that the session store writes
//! through, plus two implementations:
//!
//! - [`FileStorage`]: a JSON record on disk (the default, behind the `file`
//!   feature).
//! - [`MemoryStorage`]: an in-process slot, used in tests and by embedders
//!   that bring their own persistence.
//!
//! Only the token is ever stored. Everything else in a session is either
//! derived from it (the user) or transient (loading and error flags).
//!
//! # Feature Flags
//!
//! - `file` (default): [`FileStorage`], locating its default directory via
//!   `dirs`.

mod error;
#[cfg(feature = "file")]
mod file;
mod memory;
mod record;

pub use error::StorageError;
#[cfg(feature = "file")]
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use record::{PersistedSession, RECORD_NAME, RECORD_VERSION, StoredRecord};

use std::sync::Arc;

/// Reads and writes the persisted session record.
///
/// Methods are synchronous: the record is a few hundred bytes and is
/// touched once at startup and once per login/logout.
pub trait SessionStorage: Send + Sync + 'static {
    /// Loads the persisted record.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PersistedSession>, StorageError>;

    /// Replaces the persisted record.
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;

    /// Removes the persisted record. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

impl<T: SessionStorage> SessionStorage for Arc<T> {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        (**self).load()
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}
