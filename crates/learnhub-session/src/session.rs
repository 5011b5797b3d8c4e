//! Session types: the client's record of who is signed in.
//!
//! The transitions here are pure: they change fields and nothing else.
//! Persisting the token and navigating are the store's job, done after a
//! transition has been applied.

use learnhub_token::User;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Route the UI is sent to on logout and when a protected view loses
    /// its session.
    ///
    /// Default: `/login`.
    pub login_route: String,

    /// Drop the result of an auth action when a newer action has started
    /// since.
    ///
    /// With this off, whichever response arrives last wins, even if it
    /// belongs to an action the user has already moved past (e.g. a slow
    /// refresh landing after a logout and signing the user back in).
    ///
    /// Default: `true`.
    pub discard_stale_responses: bool,

    /// Seconds of clock skew tolerated when checking a token's `exp`.
    ///
    /// Default: 0.
    pub expiry_leeway_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            discard_stale_responses: true,
            expiry_leeway_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of the client session.
///
/// `user` is `Some` exactly when `token` is `Some` and decoded cleanly;
/// the only transition that sets one sets both.
///
/// ```text
///                   sign_in
///   [signed out] ───────────→ [signed in]
///        ↑                        │
///        └──── sign_out ──────────┘
/// ```
///
/// Independently, `has_hydrated` flips from `false` to `true` once, when
/// the persisted token has been read back at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The bearer token. Source of truth for "signed in".
    pub token: Option<String>,

    /// Identity decoded from `token`.
    pub user: Option<User>,

    /// An auth action is waiting on the service.
    pub is_loading: bool,

    /// The last auth action's failure, worded for the user.
    pub error: Option<String>,

    /// Persisted state has been loaded.
    pub has_hydrated: bool,
}

impl Session {
    /// Returns `true` if a token (and therefore a user) is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Installs a decoded token and clears any previous error.
    pub(crate) fn sign_in(&mut self, token: String, user: User) {
        self.token = Some(token);
        self.user = Some(user);
        self.error = None;
    }

    /// Forgets the token, the user and any error.
    pub(crate) fn sign_out(&mut self) {
        self.token = None;
        self.user = None;
        self.error = None;
    }

    /// An action has started waiting on the service.
    pub(crate) fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// The pending action finished without error.
    pub(crate) fn succeed(&mut self) {
        self.is_loading = false;
    }

    /// The pending action failed with `message`.
    pub(crate) fn fail(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    /// Records an error without touching the token.
    pub(crate) fn record_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }
}
