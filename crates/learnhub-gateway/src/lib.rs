//! Remote auth service client for Learnhub.
//!
//! The auth service issues tokens, checks passwords, and sends emails. The
//! client does none of that; it just calls the service and reports what
//! happened. This crate defines:
//!
//! - [`AuthGateway`]: the calls the session store needs, as a trait so the
//!   store can be driven by a scripted gateway in tests.
//! - [`HttpGateway`]: the real implementation over `reqwest` (behind the
//!   default `http` feature).
//! - [`GatewayConfig`]: where the service lives.
//! - [`GatewayError`]: what went wrong, keeping the server's own wording so
//!   the UI can show it.

#![allow(async_fn_in_trait)]

mod config;
mod error;
#[cfg(feature = "http")]
mod http;
mod types;

pub use config::GatewayConfig;
pub use error::GatewayError;
#[cfg(feature = "http")]
pub use http::HttpGateway;
pub use types::{LoginResponse, RegisterRequest, RegisteredUser, VerifyEmailResponse};

use std::future::Future;

/// The operations the remote auth service exposes.
///
/// Methods return `impl Future + Send` rather than using `async fn` so
/// the session store can call them from tasks spawned on a multi-threaded
/// runtime.
pub trait AuthGateway: Send + Sync + 'static {
    /// `POST /auth/login`: exchanges credentials for an access token.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send;

    /// `POST /auth/register`: creates an account. Does not sign in.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<RegisteredUser, GatewayError>> + Send;

    /// `GET /auth/verify-email?token=...`: confirms an email address.
    ///
    /// A `200` whose body says `success: false` is reported as
    /// [`GatewayError::Rejected`].
    fn verify_email(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<VerifyEmailResponse, GatewayError>> + Send;

    /// `POST /auth/forgot-password`: asks the service to email a reset link.
    fn forgot_password(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// `POST /auth/reset-password`: sets a new password using a reset token.
    fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// `POST /auth/refresh`: trades a refresh token for a new access token.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<LoginResponse, GatewayError>> + Send;
}
