//! Client session management for Learnhub.
//!
//! This crate owns the one piece of client state that matters: who is
//! signed in.
//!
//! 1. **Session** ([`Session`]): token, derived user, loading/error flags,
//!    and the hydration flag.
//! 2. **Store** ([`SessionStore`]): the only way to change a session.
//!    Decodes tokens, calls the auth service, persists the token, and
//!    rehydrates it at startup.
//! 3. **Navigation** ([`Navigator`]): how the store (and the route guard)
//!    ask the UI to move to another route.
//!
//! # How it fits in the stack
//!
//! ```text
//! Route guard (above)  ← watches sessions to decide what may render
//!     ↕
//! Session layer (this crate)  ← owns the session and its lifecycle
//!     ↕
//! Token / Storage / Gateway (below)  ← decode, persist, talk to the service
//! ```

mod error;
mod navigator;
mod session;
mod store;

pub use error::SessionError;
pub use navigator::Navigator;
pub use session::{Session, SessionConfig};
pub use store::{HydrationOutcome, SessionStore, messages};

pub use learnhub_gateway::{RegisterRequest, RegisteredUser, VerifyEmailResponse};
pub use learnhub_token::{Role, User};
