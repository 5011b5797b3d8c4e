//! Route guard for Learnhub.
//!
//! A protected view must not render before the session has been
//! hydrated, and must send the user to the login page once there is no
//! session. This crate turns session snapshots into that decision.
//!
//! # Key types
//!
//! - [`GuardState`]: pending, unauthenticated or authenticated
//! - [`RouteGuard`]: follows sessions and redirects on sign-out
//! - [`GuardHandle`]: a guard running as a Tokio task
//! - [`Rendered`]: what a protected view should show

mod guard;
mod state;

pub use guard::{GuardHandle, Rendered, RouteGuard};
pub use state::{GuardState, Transition};
