use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use learnhub::prelude::*;
use learnhub::{
    AuthGateway, GatewayError, LoginResponse, MemoryStorage, RegisterRequest, RegisteredUser,
    RouteGuard, SessionConfig, SessionStore, VerifyEmailResponse,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// An in-process auth service
// ---------------------------------------------------------------------------

/// Accepts one account and issues unsigned tokens for it. Good enough to
/// drive the session layer without a backend.
struct DemoAuthService;

const EMAIL: &str = "ada@example.com";
const PASSWORD: &str = "hunter22";

fn issue_token(id: u64, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = json!({
        "sub": email,
        "id": id.to_string(),
        "role": "student",
        "exp": 4_000_000_000u64,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.demo")
}

fn bad_request(detail: &str) -> GatewayError {
    GatewayError::Status {
        status: 400,
        detail: Some(detail.into()),
        message: None,
    }
}

impl AuthGateway for DemoAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, GatewayError> {
        if username != EMAIL || password != PASSWORD {
            return Err(GatewayError::Status {
                status: 401,
                detail: Some("Incorrect email or password".into()),
                message: None,
            });
        }
        Ok(LoginResponse {
            access_token: issue_token(1, username),
            token_type: Some("bearer".into()),
        })
    }

    async fn register(&self, _: &RegisterRequest) -> Result<RegisteredUser, GatewayError> {
        Err(bad_request("Registration is closed"))
    }

    async fn verify_email(&self, _: &str) -> Result<VerifyEmailResponse, GatewayError> {
        Err(GatewayError::Rejected {
            message: Some("expired".into()),
        })
    }

    async fn forgot_password(&self, _: &str) -> Result<(), GatewayError> {
        Err(GatewayError::Status {
            status: 500,
            detail: None,
            message: None,
        })
    }

    async fn reset_password(&self, _: &str, _: &str) -> Result<(), GatewayError> {
        Err(bad_request("Invalid or expired token"))
    }

    async fn refresh(&self, _: &str) -> Result<LoginResponse, GatewayError> {
        Ok(LoginResponse {
            access_token: issue_token(1, EMAIL),
            token_type: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

type DemoStore = SessionStore<DemoAuthService, MemoryStorage>;

fn navigator() -> Arc<dyn Navigator> {
    Arc::new(|route: &str| println!("  -> navigate to {route}"))
}

fn start(storage: &MemoryStorage) -> DemoStore {
    SessionStore::new(DemoAuthService, storage.clone(), SessionConfig::default())
        .with_navigator(navigator())
}

fn show(label: &str, store: &DemoStore) {
    let s = store.snapshot();
    let who = s
        .user
        .as_ref()
        .map_or("nobody".to_string(), |u| format!("{} ({})", u.email, u.role));
    println!(
        "{label}: hydrated={} signed_in_as={who} loading={} error={:?}",
        s.has_hydrated, s.is_loading, s.error
    );
}

async fn first_run(storage: &MemoryStorage) -> Result<(), LearnhubError> {
    println!("== first run ==");
    let store = start(storage);
    let mut guard = RouteGuard::new(navigator(), "/login").spawn(store.subscribe());

    store.hydrate()?;
    println!("guard: {:?}", guard.settled().await);

    if let Err(e) = store.login_with_credentials(EMAIL, "wrong").await {
        println!("login rejected: {}", e.user_message());
    }
    store.login_with_credentials(EMAIL, PASSWORD).await?;
    show("after login", &store);

    if let Err(e) = store.forgot_password(EMAIL).await {
        println!("forgot password failed: {}", e.user_message());
    }
    if let Err(e) = store.verify_email("stale-link").await {
        println!("verify email failed: {}", e.user_message());
    }
    show("after failures", &store);
    Ok(())
}

async fn second_run(storage: &MemoryStorage) -> Result<(), LearnhubError> {
    println!("== second run ==");
    let store = start(storage);
    let guard = RouteGuard::new(navigator(), "/login").spawn(store.subscribe());
    let mut states = guard.subscribe();

    let outcome = store.hydrate()?;
    println!("hydration: {outcome:?}");
    states.wait_for(|s| *s == GuardState::Authenticated).await.ok();
    println!("dashboard: {:?}", guard.render(|| "course list"));

    store.logout();
    states.wait_for(|s| *s == GuardState::Unauthenticated).await.ok();
    println!("dashboard: {:?}", guard.render(|| "course list"));
    show("after logout", &store);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), LearnhubError> {
    learnhub::logging::init_with_filter("warn");

    let storage = MemoryStorage::new();
    first_run(&storage).await?;
    second_run(&storage).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use learnhub::{JwtCodec, TokenCodec};

    use super::*;

    #[tokio::test]
    async fn test_demo_login_survives_restart() {
        let storage = MemoryStorage::new();
        start(&storage).login_with_credentials(EMAIL, PASSWORD).await.unwrap();

        let store = start(&storage);
        let outcome = store.hydrate().unwrap();

        assert!(matches!(outcome, HydrationOutcome::Restored(ref u) if u.email == EMAIL));
    }

    #[test]
    fn test_issued_token_decodes() {
        let claims = JwtCodec.decode(&issue_token(7, EMAIL)).unwrap();
        assert_eq!(claims.user.id, "7");
        assert_eq!(claims.user.role, Role::Student);
    }
}
