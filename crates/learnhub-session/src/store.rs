//! The session store: the only way to change a session.
//!
//! Every mutation goes through the watch channel's `send_modify` (or
//! `send_if_modified`), so a subscriber sees each action's changes at
//! once or not at all. Storage and navigation happen after the new state
//! has been published.
//!
//! # Request generations
//!
//! Each action bumps a generation counter as it starts. An async action
//! remembers the generation it started with and, when the gateway
//! answers, commits only if nothing newer has started in the meantime
//! (see [`SessionConfig::discard_stale_responses`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use learnhub_gateway::{
    AuthGateway, GatewayError, RegisterRequest, RegisteredUser, VerifyEmailResponse,
};
use learnhub_storage::{PersistedSession, SessionStorage};
use learnhub_token::{JwtCodec, TokenCodec, User};
use tokio::sync::watch;

use crate::{Navigator, Session, SessionConfig, SessionError};

/// Messages recorded in [`Session::error`] when the service gave nothing
/// more specific.
pub mod messages {
    pub const INVALID_TOKEN: &str = "Invalid token received";
    pub const SESSION_EXPIRED: &str = "Session expired";
    pub const LOGIN_FAILED: &str = "Login failed";
    pub const REGISTRATION_FAILED: &str = "Registration failed";
    pub const FORGOT_PASSWORD_FAILED: &str = "Failed to send reset link";
    pub const RESET_PASSWORD_FAILED: &str = "Failed to reset password";
    pub const VERIFICATION_FAILED: &str = "Verification failed";
    pub const REFRESH_FAILED: &str = "Failed to refresh session";
}

/// What [`SessionStore::hydrate`] found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// A valid token was restored and the user is signed in.
    Restored(User),
    /// Nothing was stored.
    Empty,
    /// The stored token had expired. It was removed from storage.
    Expired,
    /// The stored token could not be decoded. It was removed from storage.
    Discarded,
    /// A login completed before hydration; the stored token was not
    /// consulted.
    AlreadySignedIn,
    /// Storage could not be read. The session starts signed out.
    Unreadable,
}

/// How an async action words its failure.
#[derive(Debug, Clone, Copy)]
enum MessagePolicy {
    /// The server's `detail`, else the action's fallback.
    DetailOnly(&'static str),
    /// The server's `detail`, then its `message`, then the transport
    /// error, then "Verification failed".
    MostSpecific,
}

impl MessagePolicy {
    fn message_for(self, error: &GatewayError) -> String {
        match self {
            Self::DetailOnly(fallback) => error.detail().unwrap_or(fallback).to_string(),
            Self::MostSpecific => {
                if let Some(text) = error.detail().or(error.server_message()) {
                    return text.to_string();
                }
                error
                    .transport_message()
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| messages::VERIFICATION_FAILED.to_string())
            }
        }
    }
}

/// Owns the client session.
///
/// One store exists per client, shared through an `Arc`. Its lifecycle is
/// `new → hydrate → actions* → drop`.
///
/// ```text
/// hydrate() ──→ [hydrated] ──→ login() / login_with_credentials()
///                   │                      │
///                   │                      ▼
///                   │                [signed in] ──→ refresh()
///                   │                      │
///                   ▼                      ▼
///             [signed out] ←── logout() / expire_if_invalid()
/// ```
pub struct SessionStore<G, S, C = JwtCodec> {
    state: watch::Sender<Session>,
    gateway: G,
    storage: S,
    codec: C,
    navigator: Option<Arc<dyn Navigator>>,
    config: SessionConfig,

    /// Bumped by every action as it starts.
    generation: AtomicU64,

    /// Set by the first call to `hydrate`.
    hydration_started: AtomicBool,
}

impl<G, S> SessionStore<G, S>
where
    G: AuthGateway,
    S: SessionStorage,
{
    /// Creates a store that decodes tokens as JWTs.
    pub fn new(gateway: G, storage: S, config: SessionConfig) -> Self {
        Self::with_codec(gateway, storage, JwtCodec, config)
    }
}

impl<G, S, C> SessionStore<G, S, C>
where
    G: AuthGateway,
    S: SessionStorage,
    C: TokenCodec,
{
    /// Creates a store with a custom token codec.
    pub fn with_codec(gateway: G, storage: S, codec: C, config: SessionConfig) -> Self {
        Self {
            state: watch::Sender::new(Session::default()),
            gateway,
            storage,
            codec,
            navigator: None,
            config,
            generation: AtomicU64::new(0),
            hydration_started: AtomicBool::new(false),
        }
    }

    /// Sets the navigator used on logout.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// A receiver that sees every published session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn has_hydrated(&self) -> bool {
        self.state.borrow().has_hydrated
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The `Authorization` header value for API calls, if signed in.
    pub fn authorization_header(&self) -> Option<String> {
        self.state
            .borrow()
            .token
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    }

    // -----------------------------------------------------------------------
    // Synchronous actions
    // -----------------------------------------------------------------------

    /// Signs in with a token the service issued.
    ///
    /// On success the token and decoded user replace whatever was there,
    /// and the token is persisted. On failure the error is recorded and
    /// the previous token and user are left as they were.
    ///
    /// # Errors
    /// [`SessionError::Decode`] if the token is malformed,
    /// [`SessionError::TokenExpired`] if its `exp` has passed.
    pub fn login(&self, token: impl Into<String>) -> Result<User, SessionError> {
        let token = token.into();

        let user = match self.decode_current(&token) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, "rejected token on login");
                let message = err.user_message();
                self.state.send_modify(|session| session.record_error(&message));
                return Err(err);
            }
        };

        self.state.send_modify(|session| {
            self.supersede(session);
            session.sign_in(token.clone(), user.clone());
        });
        self.persist(&token);

        tracing::info!(user_id = %user.id, role = %user.role, "signed in");
        Ok(user)
    }

    /// Signs out: clears the session, removes the persisted token, and
    /// navigates to the login route.
    ///
    /// Calling it again on a signed-out session changes nothing.
    pub fn logout(&self) {
        self.state.send_modify(|session| {
            self.supersede(session);
            session.sign_out();
        });

        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }

        tracing::info!("signed out");

        if let Some(navigator) = &self.navigator {
            navigator.navigate(&self.config.login_route);
        }
    }

    /// Marks the session as hydrated.
    ///
    /// The flag only ever goes from `false` to `true`. Asking to set it
    /// back to `false` is ignored.
    pub fn set_has_hydrated(&self, flag: bool) {
        let changed = self.state.send_if_modified(|session| {
            match (session.has_hydrated, flag) {
                (false, true) => {
                    session.has_hydrated = true;
                    true
                }
                (true, false) => {
                    tracing::warn!("ignoring request to mark session as not hydrated");
                    false
                }
                _ => false,
            }
        });

        if changed {
            let authenticated = self.state.borrow().is_authenticated();
            tracing::info!(authenticated, "session hydrated");
        }
    }

    /// Loads the persisted token and marks the session hydrated.
    ///
    /// A stored token that is malformed or expired is removed from storage
    /// and the session starts signed out. Unreadable storage is logged and
    /// treated as empty. In every case the session ends up hydrated.
    ///
    /// # Errors
    /// [`SessionError::AlreadyHydrated`] if called more than once. The
    /// session is not touched.
    pub fn hydrate(&self) -> Result<HydrationOutcome, SessionError> {
        if self.hydration_started.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyHydrated);
        }

        let outcome = match self.storage.load() {
            Ok(Some(PersistedSession { token: Some(token) })) => self.restore(token),
            Ok(_) => HydrationOutcome::Empty,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted session");
                HydrationOutcome::Unreadable
            }
        };

        tracing::debug!(?outcome, "hydration finished");
        self.set_has_hydrated(true);
        Ok(outcome)
    }

    /// Signs out if the current token is no longer usable.
    ///
    /// Returns `true` if the session was cleared. Does not navigate; a
    /// route guard watching the session does that.
    pub fn expire_if_invalid(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };
        let Err(reason) = self.decode_current(&token) else {
            return false;
        };

        let expired = self.state.send_if_modified(|session| {
            // Someone else replaced the token since we looked.
            if session.token.as_deref() != Some(token.as_str()) {
                return false;
            }
            self.supersede(session);
            session.sign_out();
            session.record_error(messages::SESSION_EXPIRED);
            true
        });

        if expired {
            if let Err(e) = self.storage.clear() {
                tracing::warn!(error = %e, "failed to clear persisted session");
            }
            tracing::info!(reason = %reason, "session expired");
        }
        expired
    }

    // -----------------------------------------------------------------------
    // Asynchronous actions
    // -----------------------------------------------------------------------

    /// Exchanges credentials for a token and signs in with it.
    ///
    /// # Errors
    /// [`SessionError::Gateway`] with the server's detail or "Login
    /// failed"; [`SessionError::Decode`] or [`SessionError::TokenExpired`]
    /// if the service returned an unusable token.
    pub async fn login_with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let generation = self.begin();

        let response = self
            .gateway
            .login(username, password)
            .await
            .map_err(|e| {
                let policy = MessagePolicy::DetailOnly(messages::LOGIN_FAILED);
                self.fail(generation, "login", policy, e)
            })?;

        self.sign_in_from_service(generation, "login", response.access_token)
    }

    /// Creates an account. Does not sign in.
    ///
    /// # Errors
    /// [`SessionError::Gateway`] with the server's detail or "Registration
    /// failed".
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisteredUser, SessionError> {
        let generation = self.begin();

        let registered = self.gateway.register(request).await.map_err(|e| {
            let policy = MessagePolicy::DetailOnly(messages::REGISTRATION_FAILED);
            self.fail(generation, "register", policy, e)
        })?;

        self.succeed(generation);
        tracing::info!(user_id = %registered.id, "account registered");
        Ok(registered)
    }

    /// Asks the service to email a password reset link.
    ///
    /// # Errors
    /// [`SessionError::Gateway`] with the server's detail or "Failed to
    /// send reset link".
    pub async fn forgot_password(&self, email: &str) -> Result<(), SessionError> {
        let generation = self.begin();

        self.gateway.forgot_password(email).await.map_err(|e| {
            self.fail(
                generation,
                "forgot_password",
                MessagePolicy::DetailOnly(messages::FORGOT_PASSWORD_FAILED),
                e,
            )
        })?;

        self.succeed(generation);
        tracing::info!("password reset link requested");
        Ok(())
    }

    /// Sets a new password using the token from a reset link.
    ///
    /// # Errors
    /// [`SessionError::Gateway`] with the server's detail or "Failed to
    /// reset password".
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        let generation = self.begin();

        self.gateway
            .reset_password(token, new_password)
            .await
            .map_err(|e| {
                self.fail(
                    generation,
                    "reset_password",
                    MessagePolicy::DetailOnly(messages::RESET_PASSWORD_FAILED),
                    e,
                )
            })?;

        self.succeed(generation);
        tracing::info!("password reset");
        Ok(())
    }

    /// Confirms an email address with the token from a verification link.
    ///
    /// # Errors
    /// [`SessionError::Gateway`] carrying the most specific wording the
    /// service gave, or "Verification failed".
    pub async fn verify_email(&self, token: &str) -> Result<VerifyEmailResponse, SessionError> {
        let generation = self.begin();

        let response = self
            .gateway
            .verify_email(token)
            .await
            .map_err(|e| self.fail(generation, "verify_email", MessagePolicy::MostSpecific, e))?;

        self.succeed(generation);
        tracing::info!("email verified");
        Ok(response)
    }

    /// Trades a refresh token for a new access token and signs in with it.
    ///
    /// A 401 means the refresh token is no longer accepted: the session is
    /// cleared along with the persisted token.
    ///
    /// # Errors
    /// [`SessionError::Gateway`] with "Session expired" on a 401, otherwise
    /// the server's detail or "Failed to refresh session".
    pub async fn refresh(&self, refresh_token: &str) -> Result<User, SessionError> {
        let generation = self.begin();

        let response = match self.gateway.refresh(refresh_token).await {
            Ok(response) => response,
            Err(e) if e.is_unauthorized() => {
                let cleared = self.commit(generation, |session| {
                    session.sign_out();
                    session.fail(messages::SESSION_EXPIRED.to_string());
                });
                if cleared {
                    if let Err(err) = self.storage.clear() {
                        tracing::warn!(error = %err, "failed to clear persisted session");
                    }
                }
                tracing::info!("refresh token rejected, session cleared");
                return Err(SessionError::Gateway {
                    message: messages::SESSION_EXPIRED.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                return Err(self.fail(
                    generation,
                    "refresh",
                    MessagePolicy::DetailOnly(messages::REFRESH_FAILED),
                    e,
                ));
            }
        };

        self.sign_in_from_service(generation, "refresh", response.access_token)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Decodes `token` and checks it hasn't expired.
    fn decode_current(&self, token: &str) -> Result<User, SessionError> {
        let claims = self.codec.decode(token)?;
        if claims.is_expired_at(now_unix(), self.config.expiry_leeway_secs) {
            return Err(SessionError::TokenExpired);
        }
        Ok(claims.user)
    }

    /// Starts a new generation from inside a synchronous action.
    ///
    /// Any pending async action loses the session, so it no longer owns
    /// `is_loading` either.
    fn supersede(&self, session: &mut Session) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.config.discard_stale_responses {
            session.is_loading = false;
        }
    }

    /// Starts an async action. Returns its generation.
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|session| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            session.begin();
        });
        generation
    }

    /// Applies `apply` if `generation` is still current (or stale
    /// responses are accepted). Returns whether it was applied.
    fn commit(&self, generation: u64, apply: impl FnOnce(&mut Session)) -> bool {
        let applied = self.state.send_if_modified(|session| {
            if self.config.discard_stale_responses
                && self.generation.load(Ordering::SeqCst) != generation
            {
                return false;
            }
            apply(session);
            true
        });

        if !applied {
            tracing::debug!(generation, "discarding stale response");
        }
        applied
    }

    fn succeed(&self, generation: u64) {
        self.commit(generation, Session::succeed);
    }

    /// Records a gateway failure and builds the error for the caller.
    fn fail(
        &self,
        generation: u64,
        action: &'static str,
        policy: MessagePolicy,
        error: GatewayError,
    ) -> SessionError {
        let message = policy.message_for(&error);
        tracing::warn!(action, error = %error, status = ?error.status(), "auth action failed");

        self.commit(generation, |session| session.fail(message.clone()));
        SessionError::Gateway {
            message,
            source: error,
        }
    }

    /// Installs a token the service just issued.
    fn sign_in_from_service(
        &self,
        generation: u64,
        action: &'static str,
        token: String,
    ) -> Result<User, SessionError> {
        let user = match self.decode_current(&token) {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(action, error = %err, "service returned an unusable token");
                let message = err.user_message();
                self.commit(generation, |session| session.fail(message));
                return Err(err);
            }
        };

        let committed = self.commit(generation, |session| {
            session.sign_in(token.clone(), user.clone());
            session.succeed();
        });
        if committed {
            self.persist(&token);
            tracing::info!(action, user_id = %user.id, role = %user.role, "signed in");
        }
        Ok(user)
    }

    /// Restores a stored token during hydration.
    fn restore(&self, token: String) -> HydrationOutcome {
        let user = match self.decode_current(&token) {
            Ok(user) => user,
            Err(err) => {
                tracing::info!(reason = %err, "discarding persisted token");
                if let Err(e) = self.storage.clear() {
                    tracing::warn!(error = %e, "failed to clear persisted session");
                }
                return match err {
                    SessionError::TokenExpired => HydrationOutcome::Expired,
                    _ => HydrationOutcome::Discarded,
                };
            }
        };

        let restored = self.state.send_if_modified(|session| {
            if session.token.is_some() {
                return false;
            }
            session.sign_in(token, user.clone());
            true
        });

        if restored {
            tracing::info!(user_id = %user.id, role = %user.role, "session restored");
            HydrationOutcome::Restored(user)
        } else {
            HydrationOutcome::AlreadySignedIn
        }
    }

    fn persist(&self, token: &str) {
        if let Err(e) = self.storage.save(&PersistedSession::with_token(token)) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, detail: Option<&str>, message: Option<&str>) -> GatewayError {
        GatewayError::Status {
            status,
            detail: detail.map(String::from),
            message: message.map(String::from),
        }
    }

    #[test]
    fn test_detail_only_prefers_detail() {
        let policy = MessagePolicy::DetailOnly(messages::FORGOT_PASSWORD_FAILED);
        let err = status(404, Some("User not found"), Some("ignored"));

        assert_eq!(policy.message_for(&err), "User not found");
    }

    #[test]
    fn test_detail_only_without_detail_uses_fallback() {
        let policy = MessagePolicy::DetailOnly(messages::FORGOT_PASSWORD_FAILED);

        assert_eq!(policy.message_for(&status(500, None, None)), "Failed to send reset link");
        assert_eq!(
            policy.message_for(&status(500, None, Some("server said"))),
            "Failed to send reset link"
        );
    }

    #[test]
    fn test_most_specific_falls_back_through_sources() {
        let policy = MessagePolicy::MostSpecific;

        assert_eq!(policy.message_for(&status(400, Some("bad token"), Some("m"))), "bad token");
        assert_eq!(policy.message_for(&status(400, None, Some("expired"))), "expired");
        assert_eq!(
            policy.message_for(&GatewayError::Rejected { message: Some("expired".into()) }),
            "expired"
        );
        assert_eq!(
            policy.message_for(&status(502, None, None)),
            "request failed with status code 502"
        );
        assert_eq!(
            policy.message_for(&GatewayError::Transport(String::new())),
            "Verification failed"
        );
    }

    #[test]
    fn test_most_specific_rejected_without_message_uses_fallback() {
        let policy = MessagePolicy::MostSpecific;

        assert_eq!(
            policy.message_for(&GatewayError::Rejected { message: None }),
            "Verification failed"
        );
    }

    #[test]
    fn test_now_unix_is_after_2020() {
        assert!(now_unix() > 1_577_836_800);
    }
}
