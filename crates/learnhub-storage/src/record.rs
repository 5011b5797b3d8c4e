//! The persisted record and its on-disk envelope.

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// Name of the single record the client persists.
pub const RECORD_NAME: &str = "auth-storage";

/// Envelope version written by this client.
pub const RECORD_VERSION: u32 = 0;

/// The part of a session that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// The bearer token, if the user was signed in.
    pub token: Option<String>,
}

impl PersistedSession {
    /// A record holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

/// On-disk layout: `{"state": {"token": ...}, "version": 0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub state: PersistedSession,
    pub version: u32,
}

impl StoredRecord {
    pub(crate) fn encode(session: &PersistedSession) -> Result<Vec<u8>, StorageError> {
        let record = StoredRecord {
            state: session.clone(),
            version: RECORD_VERSION,
        };
        serde_json::to_vec(&record).map_err(StorageError::Serialize)
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<PersistedSession, StorageError> {
        let record: StoredRecord = serde_json::from_slice(bytes)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        if record.version != RECORD_VERSION {
            return Err(StorageError::Corrupt(format!(
                "unsupported record version {}",
                record.version
            )));
        }
        Ok(record.state)
    }
}
