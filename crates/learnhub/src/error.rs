//! Unified error type for the Learnhub client.

use learnhub_gateway::GatewayError;
use learnhub_session::SessionError;
use learnhub_storage::StorageError;
use learnhub_token::DecodeError;

use crate::forms::ValidationError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum LearnhubError {
    /// A form failed local validation. Nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A session action failed (bad token, service error).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The auth service could not be set up or reached.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The session record could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A token could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl LearnhubError {
    /// Text suitable for a toast or inline message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Session(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
