//! Error types for the session layer.

use learnhub_gateway::GatewayError;
use learnhub_token::DecodeError;

use crate::messages;

/// Errors returned by [`SessionStore`](crate::SessionStore) actions.
///
/// Every error an action returns has also been recorded in the session's
/// `error` field, unless a newer action superseded it first. The field is
/// for whoever is watching the session. The return value is for the view
/// that started the action and wants to show a one-off toast.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token couldn't be decoded. The session was left as it was.
    #[error("invalid token: {0}")]
    Decode(#[from] DecodeError),

    /// The token decoded but has already expired.
    #[error("token has expired")]
    TokenExpired,

    /// The auth service call failed.
    ///
    /// `message` is the text recorded in the session (the most specific
    /// wording available, or the action's fallback). `source` keeps the
    /// full gateway error for logging.
    #[error("{message}")]
    Gateway {
        message: String,
        #[source]
        source: GatewayError,
    },

    /// [`SessionStore::hydrate`](crate::SessionStore::hydrate) was called
    /// more than once.
    #[error("session store has already been hydrated")]
    AlreadyHydrated,
}

impl SessionError {
    /// The message recorded in the session for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode(_) => messages::INVALID_TOKEN.to_string(),
            Self::TokenExpired => messages::SESSION_EXPIRED.to_string(),
            Self::Gateway { message, .. } => message.clone(),
            Self::AlreadyHydrated => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_decode_is_invalid_token() {
        let err = SessionError::from(DecodeError::Malformed("expected three segments"));
        assert_eq!(err.user_message(), "Invalid token received");
    }

    #[test]
    fn test_user_message_gateway_uses_recorded_message() {
        let err = SessionError::Gateway {
            message: "Email already registered".into(),
            source: GatewayError::Status {
                status: 400,
                detail: Some("Email already registered".into()),
                message: None,
            },
        };
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(err.to_string(), "Email already registered");
    }
}
