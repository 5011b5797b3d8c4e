//! Error types for the gateway.

/// Errors returned by an [`AuthGateway`](crate::AuthGateway).
///
/// The variants keep whatever wording the server supplied. The session
/// store picks the most specific one to show the user, so nothing here is
/// pre-formatted into a single string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The service answered with a non-2xx status.
    ///
    /// `detail` is FastAPI's error field; `message` is the looser field
    /// some endpoints use instead.
    #[error("request failed with status code {status}")]
    Status {
        status: u16,
        detail: Option<String>,
        message: Option<String>,
    },

    /// The service answered 2xx but said no (`success: false`).
    #[error("{}", .message.as_deref().unwrap_or("request rejected by the auth service"))]
    Rejected { message: Option<String> },

    /// The request never got an HTTP answer (DNS, refused, timeout, TLS...).
    #[error("{0}")]
    Transport(String),

    /// The service answered 2xx with a body the client can't read.
    #[error("invalid response from the auth service: {0}")]
    InvalidResponse(String),

    /// The gateway was configured with an unusable URL.
    #[error("invalid gateway configuration: {0}")]
    InvalidConfig(String),
}

impl GatewayError {
    /// The server's `detail` field, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The server's `message` field, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::Rejected { message } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// The client-side description of the failure (what a transport
    /// library would print).
    ///
    /// `None` for [`Rejected`](Self::Rejected): the service answered, so
    /// anything worth showing is in [`server_message`](Self::server_message).
    pub fn transport_message(&self) -> Option<String> {
        match self {
            Self::Rejected { .. } => None,
            _ => Some(self.to_string()),
        }
    }

    /// HTTP status, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for a 401: the credential presented is no longer accepted.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
