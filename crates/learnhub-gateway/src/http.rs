//! [`AuthGateway`] over HTTP.

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    AuthGateway, GatewayConfig, GatewayError, LoginResponse, RegisterRequest,
    RegisteredUser, VerifyEmailResponse,
};

/// Talks to the auth service with `reqwest`.
///
/// Cheap to clone: `reqwest::Client` is an `Arc` around a connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Builds a gateway with its own connection pool.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidConfig`] if the HTTP client can't be
    /// built (e.g. the TLS backend fails to initialize).
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::InvalidConfig(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// The settings this gateway was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends `request` and turns non-2xx answers into [`GatewayError::Status`].
    async fn send(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        tracing::debug!(endpoint, "auth service request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "auth service unreachable");
            GatewayError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The error body is best-effort: an HTML error page from a proxy
        // still yields a Status error, just without server wording.
        let body = response.bytes().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
        tracing::warn!(endpoint, status = status.as_u16(), "auth service returned an error");

        Err(GatewayError::Status {
            status: status.as_u16(),
            detail: body.detail.and_then(detail_text),
            message: body.message,
        })
    }
}

impl AuthGateway for HttpGateway {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, GatewayError> {
        // The service uses the OAuth2 password form: url-encoded, and the
        // email goes in the `username` field.
        let url = self.config.endpoint("/auth/login")?;
        let request = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)]);
        read_json(self.send("login", request).await?).await
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisteredUser, GatewayError> {
        let url = self.config.endpoint("/auth/register")?;
        let request = self.client.post(url).json(request);
        read_json(self.send("register", request).await?).await
    }

    async fn verify_email(
        &self,
        token: &str,
    ) -> Result<VerifyEmailResponse, GatewayError> {
        let url = self.config.endpoint("/auth/verify-email")?;
        let request = self.client.get(url).query(&[("token", token)]);
        let body: VerifyEmailResponse =
            read_json(self.send("verify-email", request).await?).await?;

        if !body.is_success() {
            tracing::info!("email verification rejected by the auth service");
            return Err(GatewayError::Rejected {
                message: body.message,
            });
        }
        Ok(body)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), GatewayError> {
        let url = self.config.endpoint("/auth/forgot-password")?;
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "email": email }));
        self.send("forgot-password", request).await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        let url = self.config.endpoint("/auth/reset-password")?;
        let request = self.client.post(url).json(&serde_json::json!({
            "token": token,
            "new_password": new_password,
        }));
        self.send("reset-password", request).await?;
        Ok(())
    }

    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<LoginResponse, GatewayError> {
        let url = self.config.endpoint("/auth/refresh")?;
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }));
        read_json(self.send("refresh", request).await?).await
    }
}

/// Error body shape: FastAPI puts its wording in `detail`, some
/// handlers use `message`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Flattens `detail` into one line.
///
/// Usually a string. Request-validation failures send a list of
/// `{loc, msg, type}` objects instead.
fn detail_text(detail: serde_json::Value) -> Option<String> {
    match detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}
