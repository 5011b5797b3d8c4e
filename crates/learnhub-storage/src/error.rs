/// Errors that can occur while reading or writing the session record.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying file could not be read, written, or removed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("failed to serialize session record: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stored bytes are not a record this client understands.
    #[error("stored session record is corrupt: {0}")]
    Corrupt(String),

    /// The platform has no per-user data directory to store the record in.
    #[error("no data directory available on this platform")]
    NoDataDir,
}
