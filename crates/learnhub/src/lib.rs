//! # Learnhub
//!
//! Client authentication and session layer for the Learnhub learning
//! platform.
//!
//! The pieces live in their own crates and are re-exported here:
//!
//! - `learnhub-token`: decodes the bearer token into a [`User`]
//! - `learnhub-storage`: persists the token between runs
//! - `learnhub-gateway`: talks to the remote auth service
//! - `learnhub-session`: the [`SessionStore`], which owns the session
//! - `learnhub-guard`: the [`RouteGuard`] for protected views
//!
//! [`LearnhubClient`] wires them together the way a UI needs them, with
//! the form checks from [`forms`] in front of each action.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use learnhub::prelude::*;
//!
//! # async fn run() -> Result<(), LearnhubError> {
//! learnhub::logging::init();
//!
//! let client = LearnhubClient::builder()
//!     .config(ClientConfig::from_env()?)
//!     .navigator(|route: &str| println!("navigate to {route}"))
//!     .build()?;
//!
//! client.hydrate()?;
//! let guard = client.guard();
//!
//! let form = LoginForm {
//!     email: "ada@example.com".into(),
//!     password: "hunter22".into(),
//! };
//! client.sign_in(&form).await?;
//!
//! // The guard follows the session from its own task.
//! let mut states = guard.subscribe();
//! let signed_in = states
//!     .wait_for(|state| *state == GuardState::Authenticated)
//!     .await
//!     .is_ok();
//! assert!(signed_in);
//! assert_eq!(guard.render(|| "dashboard"), Rendered::Content("dashboard"));
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod forms;
pub mod logging;
pub mod routes;

pub use client::{ClientStore, LearnhubClient, LearnhubClientBuilder};
pub use config::{ClientConfig, ENV_API_PREFIX, ENV_API_URL, ENV_STORAGE_DIR};
pub use error::LearnhubError;

pub use learnhub_gateway::{
    AuthGateway, GatewayConfig, GatewayError, HttpGateway, LoginResponse, RegisterRequest,
    RegisteredUser, VerifyEmailResponse,
};
pub use learnhub_guard::{GuardHandle, GuardState, Rendered, RouteGuard, Transition};
pub use learnhub_session::{
    HydrationOutcome, Navigator, Session, SessionConfig, SessionError, SessionStore, messages,
};
pub use learnhub_storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use learnhub_token::{Claims, DecodeError, JwtCodec, Role, TokenCodec, User};

/// Everything an application usually needs.
pub mod prelude {
    pub use crate::forms::{
        ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm, ValidationError,
    };
    pub use crate::{
        ClientConfig, GuardState, HydrationOutcome, LearnhubClient, LearnhubError, Navigator,
        Rendered, Role, Session, User,
    };
}
