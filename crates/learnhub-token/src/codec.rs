//! Codec trait and the JWT implementation.
//!
//! The session layer doesn't care what format the auth service uses for
//! its tokens; it only needs something that implements [`TokenCodec`].
//! Today that is always [`JwtCodec`], but tests and alternative backends
//! can plug in their own.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::claims::RawClaims;
use crate::{Claims, DecodeError};

/// Turns a bearer token into [`Claims`].
///
/// ## Trait bounds
///
/// - `Send + Sync` → the session store is shared across tasks and holds
///   its codec by value.
/// - `'static` → the codec owns everything it needs.
pub trait TokenCodec: Send + Sync + 'static {
    /// Decodes `token` into claims.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] if the token is structurally invalid or
    /// lacks a required claim. Never panics on malformed input.
    fn decode(&self, token: &str) -> Result<Claims, DecodeError>;
}

// ---------------------------------------------------------------------------
// JwtCodec
// ---------------------------------------------------------------------------

/// A [`TokenCodec`] for JSON Web Tokens.
///
/// Only the payload segment is read. The header is required to be present
/// but is not inspected, and the signature is never checked: the token is
/// trusted because it came from the auth service over TLS, and the service
/// re-verifies it on every API call anyway.
///
/// ## Example
///
/// ```rust
/// use learnhub_token::{JwtCodec, TokenCodec, DecodeError};
///
/// let err = JwtCodec.decode("not-a-jwt").unwrap_err();
/// assert!(matches!(err, DecodeError::Malformed(_)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtCodec;

impl TokenCodec for JwtCodec {
    fn decode(&self, token: &str) -> Result<Claims, DecodeError> {
        let payload = payload_segment(token.trim())?;

        // Some issuers pad their segments even though RFC 7515 says not
        // to. Stripping the padding lets one engine handle both.
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let raw: RawClaims = serde_json::from_slice(&bytes)?;

        Claims::try_from(raw)
    }
}

/// Decodes `token` with the default [`JwtCodec`].
///
/// # Errors
/// See [`TokenCodec::decode`].
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    JwtCodec.decode(token)
}

/// Splits `header.payload.signature` and returns the payload.
fn payload_segment(token: &str) -> Result<&str, DecodeError> {
    if token.is_empty() {
        return Err(DecodeError::Malformed("token is empty"));
    }

    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DecodeError::Malformed(
            "expected three dot-separated segments",
        ));
    };

    if header.is_empty() {
        return Err(DecodeError::Malformed("header segment is empty"));
    }
    if payload.is_empty() {
        return Err(DecodeError::Malformed("payload segment is empty"));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Role;
    use crate::testing::forge_token;

    #[test]
    fn test_decode_valid_token_returns_user() {
        let token = forge_token(&json!({
            "sub": "ada@example.com",
            "id": "17",
            "role": "instructor",
            "exp": 4_000_000_000u64,
        }));

        let claims = JwtCodec.decode(&token).expect("should decode");

        assert_eq!(claims.user.id, "17");
        assert_eq!(claims.user.email, "ada@example.com");
        assert_eq!(claims.user.role, Role::Instructor);
        assert_eq!(claims.expires_at, Some(4_000_000_000));
    }

    #[test]
    fn test_decode_padded_payload_is_accepted() {
        let token = forge_token(&json!({
            "sub": "a@example.com", "id": "1", "role": "student"
        }));
        let mut parts: Vec<String> =
            token.split('.').map(str::to_owned).collect();
        parts[1].push_str("==");

        let claims = JwtCodec.decode(&parts.join(".")).expect("should decode");

        assert_eq!(claims.user.email, "a@example.com");
    }

    #[test]
    fn test_decode_empty_string_returns_malformed() {
        assert!(matches!(
            JwtCodec.decode(""),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_two_segments_returns_malformed() {
        assert!(matches!(
            JwtCodec.decode("aGVhZGVy.cGF5bG9hZA"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_four_segments_returns_malformed() {
        assert!(matches!(
            JwtCodec.decode("a.b.c.d"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_bad_base64_returns_base64_error() {
        assert!(matches!(
            JwtCodec.decode("eyJhbGciOiJIUzI1NiJ9.!!!.sig"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_non_json_payload_returns_json_error() {
        let payload = URL_SAFE_NO_PAD.encode(b"hello");
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig");

        assert!(matches!(
            JwtCodec.decode(&token),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_reset_token_missing_role_returns_missing_claim() {
        // Password-reset tokens carry only `sub` and `type`.
        let token = forge_token(&json!({ "sub": "a@example.com", "type": "reset" }));

        assert!(matches!(
            JwtCodec.decode(&token),
            Err(DecodeError::MissingClaim("id"))
        ));
    }

    #[test]
    fn test_free_decode_matches_codec() {
        let token = forge_token(&json!({
            "sub": "a@example.com", "id": "1", "role": "admin"
        }));

        assert_eq!(decode(&token).unwrap(), JwtCodec.decode(&token).unwrap());
    }
}
