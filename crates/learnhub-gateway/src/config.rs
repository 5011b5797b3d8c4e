//! Where the auth service lives.

use std::time::Duration;

use url::Url;

use crate::GatewayError;

/// Default base URL of the auth service during development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the auth service.
///
/// The service has been deployed both at the root (`/auth/login`) and under
/// a versioned prefix (`/api/v1/auth/login`). Neither is assumed: set
/// `api_prefix` to match the deployment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Scheme, host and port of the service.
    pub base_url: Url,

    /// Path inserted between the base URL and `/auth/...`, e.g. `/api/v1`.
    /// Empty by default.
    pub api_prefix: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
            api_prefix: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl GatewayConfig {
    /// Config pointing at `base_url`, other settings default.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidConfig`] if `base_url` doesn't parse.
    pub fn with_base_url(base_url: &str) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::InvalidConfig(format!("{base_url}: {e}")))?;
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    /// Sets the path prefix (leading/trailing slashes are normalized).
    pub fn api_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        self.api_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of `path` (which starts with `/`).
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidConfig`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = format!("{base}{}{path}", self.api_prefix);
        Url::parse(&joined)
            .map_err(|e| GatewayError::InvalidConfig(format!("{joined}: {e}")))
    }
}
