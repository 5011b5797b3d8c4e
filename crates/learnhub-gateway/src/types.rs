//! Request and response bodies of the auth service.

use serde::{Deserialize, Serialize};

/// Body of a successful `/auth/login` or `/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Usually `"bearer"`. Informational only.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body of `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: String,
}

/// The account the service created in response to a [`RegisterRequest`].
///
/// The service returns more than this; only what the client displays is
/// kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

/// Body of `/auth/verify-email`.
///
/// A missing `success` counts as success: the service only sets it when
/// it wants to say no.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyEmailResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl VerifyEmailResponse {
    /// `false` only when the service explicitly said `success: false`.
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
    }
}

/// Accepts both `"id": "42"` and `"id": 42`.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(id) => id,
        Id::Number(id) => id.to_string(),
    })
}
