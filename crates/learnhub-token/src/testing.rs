//! Helpers for building tokens in tests.
//!
//! Only compiled with the `testing` feature. Nothing here signs anything;
//! the tokens are exactly as trustworthy as the decoder assumes.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Builds an unsigned `header.payload.signature` token around `claims`.
pub fn forge_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Builds a token for a student account that expires far in the future.
pub fn student_token(id: &str, email: &str) -> String {
    forge_token(&serde_json::json!({
        "sub": email,
        "id": id,
        "role": "student",
        "exp": 4_000_000_000u64,
    }))
}
