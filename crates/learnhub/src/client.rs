//! `LearnhubClient` builder and form-level actions.
//!
//! Ties the layers together: form validation → session store → auth
//! service, with the route guard following the store.

use std::sync::Arc;

use learnhub_gateway::{HttpGateway, RegisteredUser, VerifyEmailResponse};
use learnhub_guard::{GuardHandle, RouteGuard};
use learnhub_session::{HydrationOutcome, Navigator, Session, SessionStore};
use learnhub_storage::FileStorage;
use learnhub_token::User;

use crate::forms::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm, ValidationError};
use crate::{ClientConfig, LearnhubError, routes};

/// The session store as the client builds it.
pub type ClientStore = SessionStore<HttpGateway, FileStorage>;

fn log_navigation(route: &str) {
    tracing::info!(route, "navigation requested");
}

/// Builder for a [`LearnhubClient`].
///
/// # Example
///
/// ```rust,no_run
/// use learnhub::prelude::*;
///
/// # fn build() -> Result<LearnhubClient, LearnhubError> {
/// let client = LearnhubClient::builder()
///     .config(ClientConfig::default().storage_dir("/tmp/learnhub"))
///     .navigator(|route: &str| println!("go to {route}"))
///     .build()?;
/// # Ok(client)
/// # }
/// ```
pub struct LearnhubClientBuilder {
    config: ClientConfig,
    navigator: Option<Arc<dyn Navigator>>,
}

impl LearnhubClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            navigator: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how the client moves the UI between routes. Without one,
    /// navigation requests are only logged.
    pub fn navigator(mut self, navigator: impl Navigator) -> Self {
        self.navigator = Some(Arc::new(navigator));
        self
    }

    /// Builds the client: the HTTP gateway, file storage and session
    /// store. The session is not hydrated yet.
    ///
    /// # Errors
    /// [`LearnhubError::Gateway`] if the HTTP client can't be built,
    /// [`LearnhubError::Storage`] if the storage directory can't be
    /// created or located.
    pub fn build(self) -> Result<LearnhubClient, LearnhubError> {
        let gateway = HttpGateway::new(self.config.gateway.clone())?;
        let storage = match &self.config.storage_dir {
            Some(dir) => FileStorage::new(dir)?,
            None => FileStorage::in_data_dir()?,
        };
        tracing::info!(
            api_url = %self.config.gateway.base_url,
            storage = %storage.path().display(),
            "learnhub client ready"
        );

        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(log_navigation) as Arc<dyn Navigator>);
        let store = SessionStore::new(gateway, storage, self.config.session)
            .with_navigator(Arc::clone(&navigator));

        Ok(LearnhubClient {
            store: Arc::new(store),
            navigator,
            dashboard_route: self.config.dashboard_route,
        })
    }
}

impl Default for LearnhubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured client: one session store plus the navigation the forms
/// trigger on success.
pub struct LearnhubClient {
    store: Arc<ClientStore>,
    navigator: Arc<dyn Navigator>,
    dashboard_route: String,
}

impl LearnhubClient {
    pub fn builder() -> LearnhubClientBuilder {
        LearnhubClientBuilder::new()
    }

    /// The underlying store, for views that watch the session directly.
    pub fn store(&self) -> &Arc<ClientStore> {
        &self.store
    }

    pub fn session(&self) -> Session {
        self.store.snapshot()
    }

    /// Loads the persisted session. Call once at startup.
    pub fn hydrate(&self) -> Result<HydrationOutcome, LearnhubError> {
        Ok(self.store.hydrate()?)
    }

    /// Spawns a route guard following this client's session. The guard
    /// runs until the returned handle is dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn guard(&self) -> GuardHandle {
        RouteGuard::new(
            Arc::clone(&self.navigator),
            self.store.config().login_route.clone(),
        )
        .spawn(self.store.subscribe())
    }

    /// A guard for the view at `route`, or `None` if the route renders
    /// without a session.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn guard_for(&self, route: &str) -> Option<GuardHandle> {
        if !routes::is_protected(route) {
            tracing::debug!(route, "public route, no guard");
            return None;
        }
        Some(self.guard())
    }

    /// `Bearer <token>` for API calls, if signed in.
    pub fn authorization_header(&self) -> Option<String> {
        self.store.authorization_header()
    }

    /// The login page: validates, signs in, and goes to the dashboard.
    pub async fn sign_in(&self, form: &LoginForm) -> Result<User, LearnhubError> {
        form.validate()?;

        let user = self
            .store
            .login_with_credentials(form.email.trim(), &form.password)
            .await?;

        // A logout that raced this login wins; stay where we are.
        if self.store.user().as_ref() == Some(&user) {
            self.navigator.navigate(&self.dashboard_route);
        }
        Ok(user)
    }

    /// The registration page: validates, creates the account, and goes to
    /// the login page.
    pub async fn register(&self, form: &RegisterForm) -> Result<RegisteredUser, LearnhubError> {
        form.validate()?;

        let registered = self.store.register(&form.to_request()).await?;

        self.navigator.navigate(&self.store.config().login_route);
        Ok(registered)
    }

    /// The forgot-password page.
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<(), LearnhubError> {
        form.validate()?;
        self.store.forgot_password(form.email.trim()).await?;
        Ok(())
    }

    /// The reset-password page: validates, resets, and goes to the login
    /// page.
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<(), LearnhubError> {
        form.validate()?;
        let Some(token) = form.token.as_deref() else {
            return Err(ValidationError::MissingResetToken.into());
        };

        self.store.reset_password(token, &form.password).await?;

        self.navigator.navigate(&self.store.config().login_route);
        Ok(())
    }

    /// The verify-email page.
    pub async fn verify_email(&self, token: &str) -> Result<VerifyEmailResponse, LearnhubError> {
        Ok(self.store.verify_email(token).await?)
    }

    /// Signs out and returns to the login page.
    pub fn sign_out(&self) {
        self.store.logout();
    }
}
