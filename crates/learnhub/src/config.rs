//! Client configuration.

use std::path::PathBuf;

use learnhub_gateway::GatewayConfig;
use learnhub_session::SessionConfig;

use crate::{LearnhubError, routes};

/// Environment variable holding the auth service base URL.
pub const ENV_API_URL: &str = "LEARNHUB_API_URL";
/// Environment variable holding the API path prefix (e.g. `/api/v1`).
pub const ENV_API_PREFIX: &str = "LEARNHUB_API_PREFIX";
/// Environment variable holding the directory for the session record.
pub const ENV_STORAGE_DIR: &str = "LEARNHUB_STORAGE_DIR";

/// Everything needed to build a [`LearnhubClient`](crate::LearnhubClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub gateway: GatewayConfig,
    pub session: SessionConfig,

    /// Directory holding the session record. `None` means the platform
    /// data directory (`<data_dir>/learnhub`).
    pub storage_dir: Option<PathBuf>,

    /// Where a successful login navigates.
    pub dashboard_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            session: SessionConfig {
                login_route: routes::LOGIN.to_string(),
                ..SessionConfig::default()
            },
            storage_dir: None,
            dashboard_route: routes::STUDENT_DASHBOARD.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `LEARNHUB_API_URL`, `LEARNHUB_API_PREFIX`
    /// and `LEARNHUB_STORAGE_DIR` where set.
    ///
    /// # Errors
    /// Returns [`LearnhubError::Gateway`] if `LEARNHUB_API_URL` isn't a
    /// valid URL.
    pub fn from_env() -> Result<Self, LearnhubError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LearnhubError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config = config.api_url(url.trim())?;
        }
        if let Some(prefix) = lookup(ENV_API_PREFIX) {
            config = config.api_prefix(&prefix);
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.trim().is_empty()) {
            config = config.storage_dir(dir);
        }

        tracing::debug!(
            api_url = %config.gateway.base_url,
            api_prefix = %config.gateway.api_prefix,
            "client config loaded"
        );
        Ok(config)
    }

    /// Points the gateway at `url`, keeping the prefix and timeout.
    ///
    /// # Errors
    /// Returns [`LearnhubError::Gateway`] if `url` doesn't parse.
    pub fn api_url(mut self, url: &str) -> Result<Self, LearnhubError> {
        let parsed = GatewayConfig::with_base_url(url)?;
        self.gateway.base_url = parsed.base_url;
        Ok(self)
    }

    pub fn api_prefix(mut self, prefix: &str) -> Self {
        self.gateway = self.gateway.api_prefix(prefix);
        self
    }

    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.session.login_route = route.into();
        self
    }

    pub fn dashboard_route(mut self, route: impl Into<String>) -> Self {
        self.dashboard_route = route.into();
        self
    }

    /// See [`SessionConfig::discard_stale_responses`].
    pub fn discard_stale_responses(mut self, discard: bool) -> Self {
        self.session.discard_stale_responses = discard;
        self
    }
}
