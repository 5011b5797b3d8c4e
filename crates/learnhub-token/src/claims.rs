//! Claim types: what a decoded token says about the signed-in user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DecodeError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The account role carried in the token's `role` claim.
///
/// The auth service only ever issues these three. They travel lowercase on
/// the wire (`"student"`, `"instructor"`, `"admin"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl FromStr for Role {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            other => Err(DecodeError::InvalidClaim {
                claim: "role",
                reason: format!("unknown role {other:?}"),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Instructor => write!(f, "instructor"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The identity derived from a token: `{id, email, role}`.
///
/// A `User` only ever exists alongside the token it was decoded from. The
/// session layer never builds one by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account ID as issued by the backend (taken from the `id` claim).
    pub id: String,

    /// Account email (taken from the standard `sub` claim).
    pub email: String,

    /// Account role.
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// Everything the client reads out of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The display identity.
    pub user: User,

    /// `exp`: Unix timestamp (seconds) after which the token is dead.
    /// Tokens without `exp` never expire client-side.
    pub expires_at: Option<u64>,

    /// `iat`: Unix timestamp (seconds) the token was issued.
    pub issued_at: Option<u64>,

    /// `type`: set by the backend on special-purpose tokens (e.g. `"reset"`).
    pub token_type: Option<String>,
}

impl Claims {
    /// Returns `true` if the token has expired at `now` (Unix seconds),
    /// allowing `leeway` seconds of clock skew.
    pub fn is_expired_at(&self, now: u64, leeway: u64) -> bool {
        match self.expires_at {
            Some(exp) => now >= exp.saturating_add(leeway),
            None => false,
        }
    }
}

/// The `id` claim comes out of the backend as a string, but older tokens
/// carry a bare integer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClaimId {
    Text(String),
    Number(u64),
}

/// The claims object exactly as it appears in the token payload.
///
/// Everything is optional here so that a missing claim surfaces as
/// [`DecodeError::MissingClaim`] instead of an opaque serde message.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    sub: Option<String>,
    id: Option<ClaimId>,
    role: Option<String>,
    exp: Option<u64>,
    iat: Option<u64>,
    #[serde(rename = "type")]
    token_type: Option<String>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = DecodeError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let id = match raw.id.ok_or(DecodeError::MissingClaim("id"))? {
            ClaimId::Text(id) => id,
            ClaimId::Number(id) => id.to_string(),
        };
        let email = raw.sub.ok_or(DecodeError::MissingClaim("sub"))?;
        let role: Role = raw.role.ok_or(DecodeError::MissingClaim("role"))?.parse()?;

        non_empty("id", &id)?;
        non_empty("sub", &email)?;

        Ok(Self {
            user: User { id, email, role },
            expires_at: raw.exp,
            issued_at: raw.iat,
            token_type: raw.token_type,
        })
    }
}

fn non_empty(claim: &'static str, value: &str) -> Result<(), DecodeError> {
    if value.trim().is_empty() {
        return Err(DecodeError::InvalidClaim {
            claim,
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}
