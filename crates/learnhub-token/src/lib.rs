//! Bearer token decoding for Learnhub.
//!
//! The auth service hands the client an opaque bearer token (a JWT). The
//! client never verifies it; it only needs the display claims inside:
//!
//! - **Claims** ([`Claims`], [`User`], [`Role`]): what a token says about
//!   the signed-in user.
//! - **Codec** ([`TokenCodec`] trait, [`JwtCodec`]): how a token string is
//!   turned into claims.
//! - **Errors** ([`DecodeError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! ```text
//! Gateway (token string) → Token (Claims) → Session (user identity)
//! ```
//!
//! Decoding is pure: no I/O, no clock, no signature checks. Expiry is
//! reported through [`Claims::is_expired_at`] and judged by the caller.

mod claims;
mod codec;
mod error;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use claims::{Claims, Role, User};
pub use codec::{JwtCodec, TokenCodec, decode};
pub use error::DecodeError;
