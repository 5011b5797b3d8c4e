//! Error types for token decoding.

/// Errors that can occur while decoding a bearer token.
///
/// Every variant describes a *structural* problem with the token. None of
/// them are retried: a token that fails to decode once will fail forever,
/// so the session layer drops it.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The token is not shaped like `header.payload.signature`.
    #[error("malformed token: {0}")]
    Malformed(&'static str),

    /// The payload segment is not valid base64url.
    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload decoded to bytes that are not a JSON claims object.
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A claim the client needs is absent.
    #[error("token is missing the `{0}` claim")]
    MissingClaim(&'static str),

    /// A claim is present but its value can't be used.
    #[error("token claim `{claim}` is invalid: {reason}")]
    InvalidClaim {
        claim: &'static str,
        reason: String,
    },
}
