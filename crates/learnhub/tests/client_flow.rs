//! End-to-end tests: a real client against a mock auth service, with the
//! session record in a temp directory.

use std::sync::{Arc, Mutex};

use learnhub::prelude::*;
use learnhub::{FileStorage, SessionStorage};
use learnhub_token::testing::student_token;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =========================================================================
// Helpers
// =========================================================================

struct Harness {
    server: MockServer,
    dir: TempDir,
    routes: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().expect("temp dir"),
            routes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn client(&self) -> LearnhubClient {
        let config = ClientConfig::default()
            .api_url(&self.server.uri())
            .unwrap()
            .storage_dir(self.dir.path());
        let routes = Arc::clone(&self.routes);
        LearnhubClient::builder()
            .config(config)
            .navigator(move |route: &str| routes.lock().unwrap().push(route.to_string()))
            .build()
            .expect("client builds")
    }

    fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }

    fn stored_token(&self) -> Option<String> {
        FileStorage::new(self.dir.path())
            .unwrap()
            .load()
            .unwrap()
            .and_then(|record| record.token)
    }
}

fn login_form() -> LoginForm {
    LoginForm {
        email: "ada@example.com".into(),
        password: "hunter22".into(),
    }
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
        })))
        .mount(server)
        .await;
}

// =========================================================================
// Sign in / restart / sign out
// =========================================================================

#[tokio::test]
async fn test_sign_in_persists_and_next_run_restores() {
    let harness = Harness::start().await;
    let token = student_token("12", "ada@example.com");
    mount_login(&harness.server, &token).await;

    let client = harness.client();
    assert_eq!(client.hydrate().unwrap(), HydrationOutcome::Empty);
    let user = client.sign_in(&login_form()).await.unwrap();

    assert_eq!(user.id, "12");
    assert_eq!(harness.routes(), vec!["/dashboard/student".to_string()]);
    assert_eq!(harness.stored_token(), Some(token.clone()));
    assert_eq!(client.authorization_header(), Some(format!("Bearer {token}")));
    drop(client);

    let restarted = harness.client();
    assert!(!restarted.session().has_hydrated);
    let outcome = restarted.hydrate().unwrap();

    assert!(matches!(outcome, HydrationOutcome::Restored(ref u) if u.email == "ada@example.com"));
    let session = restarted.session();
    assert!(session.has_hydrated);
    assert_eq!(session.token, Some(token));
}

#[tokio::test]
async fn test_restored_session_guard_renders_without_redirect() {
    let harness = Harness::start().await;
    mount_login(&harness.server, &student_token("1", "ada@example.com")).await;
    harness.client().sign_in(&login_form()).await.unwrap();
    harness.routes.lock().unwrap().clear();

    let client = harness.client();
    let mut guard = client.guard();
    assert_eq!(guard.render(|| "courses"), Rendered::Loading);

    client.hydrate().unwrap();

    assert_eq!(guard.settled().await, Some(GuardState::Authenticated));
    assert_eq!(guard.render(|| "courses"), Rendered::Content("courses"));
    assert!(harness.routes().is_empty());
}

#[tokio::test]
async fn test_guard_for_only_guards_protected_routes() {
    let harness = Harness::start().await;
    let client = harness.client();

    assert!(client.guard_for("/").is_none());
    assert!(client.guard_for("/login").is_none());
    assert!(client.guard_for("/reset-password?token=abc").is_none());

    let mut guard = client.guard_for("/dashboard/student").expect("dashboard is guarded");
    client.hydrate().unwrap();

    assert_eq!(guard.settled().await, Some(GuardState::Unauthenticated));
    assert_eq!(harness.routes(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_sign_out_clears_record_and_redirects() {
    let harness = Harness::start().await;
    mount_login(&harness.server, &student_token("1", "ada@example.com")).await;
    let client = harness.client();
    client.hydrate().unwrap();
    client.sign_in(&login_form()).await.unwrap();
    let guard = client.guard();
    let mut states = guard.subscribe();
    states
        .wait_for(|state| *state == GuardState::Authenticated)
        .await
        .unwrap();

    client.sign_out();
    states
        .wait_for(|state| *state == GuardState::Unauthenticated)
        .await
        .unwrap();

    assert_eq!(harness.stored_token(), None);
    assert!(client.session().user.is_none());
    // Once from the store's logout, once from the guard's transition.
    assert_eq!(
        harness.routes(),
        vec!["/dashboard/student", "/login", "/login"]
    );
}

#[tokio::test]
async fn test_sign_in_invalid_form_never_calls_service() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;
    let client = harness.client();

    let err = client
        .sign_in(&LoginForm {
            email: "ada@example.com".into(),
            password: String::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LearnhubError::Validation(ValidationError::Required("Password"))));
    assert!(client.session().error.is_none(), "validation never reaches the store");
}

#[tokio::test]
async fn test_sign_in_wrong_password_shows_detail() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password",
        })))
        .mount(&harness.server)
        .await;
    let client = harness.client();

    let err = client.sign_in(&login_form()).await.unwrap_err();

    assert_eq!(err.user_message(), "Incorrect email or password");
    assert_eq!(client.session().error.as_deref(), Some("Incorrect email or password"));
    assert!(harness.routes().is_empty());
}

// =========================================================================
// Password and email flows
// =========================================================================

#[tokio::test]
async fn test_forgot_password_server_error() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.server)
        .await;
    let client = harness.client();

    let result = client
        .forgot_password(&ForgotPasswordForm {
            email: "user@example.com".into(),
        })
        .await;

    assert!(matches!(result, Err(LearnhubError::Session(_))));
    let session = client.session();
    assert!(!session.is_loading);
    assert_eq!(session.error.as_deref(), Some("Failed to send reset link"));
}

#[tokio::test]
async fn test_verify_email_expired_link() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/verify-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "expired",
        })))
        .mount(&harness.server)
        .await;
    let client = harness.client();

    let err = client.verify_email("old-link").await.unwrap_err();

    assert_eq!(err.user_message(), "expired");
    assert_eq!(client.session().error.as_deref(), Some("expired"));
    assert!(!client.session().is_loading);
}

#[tokio::test]
async fn test_register_goes_to_login() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 8,
            "email": "ada@example.com",
            "username": "ada",
            "full_name": "Ada Lovelace",
            "role": "student",
            "is_verified": false,
        })))
        .mount(&harness.server)
        .await;
    let client = harness.client();
    let form = RegisterForm {
        full_name: "Ada Lovelace".into(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        password: "hunter22".into(),
        confirm_password: "hunter22".into(),
    };

    let registered = client.register(&form).await.unwrap();

    assert_eq!(registered.id, "8");
    assert!(client.session().token.is_none());
    assert_eq!(harness.routes(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_reset_password_goes_to_login() {
    let harness = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/reset-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&harness.server)
        .await;
    let client = harness.client();

    client
        .reset_password(&ResetPasswordForm {
            token: Some("reset-tok".into()),
            password: "s3cret!".into(),
            confirm_password: "s3cret!".into(),
        })
        .await
        .unwrap();

    assert_eq!(harness.routes(), vec!["/login".to_string()]);
    assert!(!client.session().is_loading);
}
