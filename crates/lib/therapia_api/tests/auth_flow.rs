//! Integration tests: build the router over an in-memory credential store and
//! drive the full register → login → reset → authorize flow through HTTP.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use therapia_api::AppState;
use therapia_core::auth::clock::ManualClock;
use therapia_core::auth::memory::MemoryCredentialStore;
use therapia_core::auth::notifier::RecordingNotifier;
use therapia_core::auth::{AuthConfig, AuthService};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@x.com";
const ADMIN_PASSWORD: &str = "adminpass";

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
    clock: Arc<ManualClock>,
}

/// Router over an in-memory store with one seeded administrator.
async fn test_app() -> TestApp {
    let store = Arc::new(MemoryCredentialStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let clock = Arc::new(ManualClock::default());
    let auth = AuthService::new(
        store,
        notifier.clone(),
        clock.clone(),
        AuthConfig::with_secret("test-secret"),
    );
    auth.ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD, "Admin")
        .await
        .expect("seed admin");
    TestApp {
        router: therapia_api::router(AppState { auth }),
        notifier,
        clock,
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("parse JSON")
        };
        (status, json)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, None, body)).await
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    /// Public sign-up.
    async fn register(&self, email: &str, password: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/auth/register",
                json!({"email": email, "password": password, "name": "Test User"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body
    }

    /// Account created by the seeded administrator.
    async fn create_user(&self, email: &str, password: &str, role: &str) -> Value {
        let admin = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let body = json!({"email": email, "password": password, "name": "Test User", "role": role});
        let (status, body) = self
            .send(json_request("POST", "/api/users", Some(&admin), body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
        body
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                json!({"email": email, "password": password}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let app = test_app().await;
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storeConnected"], true);
    assert_eq!(body["version"], therapia_core::version());
}

#[tokio::test]
async fn register_login_reset_end_to_end() {
    let app = test_app().await;

    let user = app.register("a@x.com", "secret1").await;
    assert_eq!(user["email"], "a@x.com");
    assert_eq!(user["role"], "PARENT");
    assert!(user.get("passwordHash").is_none());

    let token = app.login("a@x.com", "secret1").await;
    let (status, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@x.com");
    assert_eq!(me["role"], "PARENT");

    let (status, body) = app
        .post(
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "wrongpw"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    let (status, _) = app
        .post("/api/auth/forgot-password", json!({"email": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let code = app.notifier.last_code_for("a@x.com").expect("code sent");

    let (status, body) = app
        .post(
            "/api/auth/verify-reset-code",
            json!({"email": "a@x.com", "code": code}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, _) = app
        .post(
            "/api/auth/reset-password",
            json!({"email": "a@x.com", "code": code, "newPassword": "brandnew1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/auth/reset-password",
            json!({"email": "a@x.com", "code": code, "newPassword": "brandnew2"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_or_expired_code");

    let (status, _) = app
        .post(
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    app.login("a@x.com", "brandnew1").await;
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_identical() {
    let app = test_app().await;
    app.register("a@x.com", "secret1").await;

    let wrong = app
        .post(
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "wrongpw"}),
        )
        .await;
    let unknown = app
        .post(
            "/api/auth/login",
            json!({"email": "nobody@x.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    app.register("a@x.com", "secret1").await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            json!({"email": "A@x.com", "password": "different", "name": "Other", "role": "ADMIN"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_exists");
}

#[tokio::test]
async fn forgot_password_does_not_reveal_unknown_email() {
    let app = test_app().await;
    app.register("a@x.com", "secret1").await;

    let known = app
        .post("/api/auth/forgot-password", json!({"email": "a@x.com"}))
        .await;
    let unknown = app
        .post("/api/auth/forgot-password", json!({"email": "ghost@x.com"}))
        .await;
    assert_eq!(known, unknown);
    assert_eq!(app.notifier.sent_count(), 1);
}

#[tokio::test]
async fn expired_reset_code_is_rejected() {
    let app = test_app().await;
    app.register("a@x.com", "secret1").await;
    app.post("/api/auth/forgot-password", json!({"email": "a@x.com"}))
        .await;
    let code = app.notifier.last_code_for("a@x.com").unwrap();

    app.clock.advance(Duration::minutes(16));
    let (status, body) = app
        .post(
            "/api/auth/verify-reset-code",
            json!({"email": "a@x.com", "code": code}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_or_expired_code");
}

#[tokio::test]
async fn missing_bad_and_expired_tokens_are_401() {
    let app = test_app().await;
    app.register("a@x.com", "secret1").await;
    let token = app.login("a@x.com", "secret1").await;

    let req = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Basic {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/auth/me", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.clock.advance(Duration::hours(9));
    let (status, body) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn remember_me_extends_session_to_seven_days() {
    let app = test_app().await;
    app.register("a@x.com", "secret1").await;
    let (status, body) = app
        .post(
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "secret1", "rememberMe": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expiresIn"], 7 * 24 * 60 * 60);
    let token = body["token"].as_str().unwrap().to_string();

    app.clock.advance(Duration::days(6));
    assert_eq!(app.get("/api/auth/me", &token).await.0, StatusCode::OK);
    app.clock.advance(Duration::days(2));
    assert_eq!(
        app.get("/api/auth/me", &token).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn admin_routes_forbid_non_admins() {
    let app = test_app().await;
    let therapist = app.create_user("t@x.com", "secret1", "THERAPIST").await;
    app.register("p@x.com", "secret1").await;

    let uri = format!("/api/therapists/{}/permissions", therapist["id"].as_str().unwrap());

    for email in ["t@x.com", "p@x.com"] {
        let token = app.login(email, "secret1").await;
        let (status, body) = app.get(&uri, &token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not permitted");
    }

    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = app.get(&uri, &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["therapistId"], therapist["id"]);
    assert!(
        body["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .all(|g| g["granted"] == false)
    );
}

#[tokio::test]
async fn revoked_permission_applies_on_next_request() {
    let app = test_app().await;
    let therapist = app.create_user("t@x.com", "secret1", "THERAPIST").await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let therapist_token = app.login("t@x.com", "secret1").await;
    let uri = format!("/api/therapists/{}/permissions", therapist["id"].as_str().unwrap());

    let (status, body) = app.get("/api/access/check/manage_students", &therapist_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);

    let grant = json!({"permissions": [{"permission": "manage_students", "granted": true}]});
    let (status, _) = app
        .send(json_request("PUT", &uri, Some(&admin), grant))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/access/check/manage_students", &therapist_token).await;
    assert_eq!(body["allowed"], true);
    let (_, me) = app.get("/api/auth/me", &therapist_token).await;
    assert_eq!(me["permissions"]["manage_students"], true);

    let revoke = json!({"permissions": [{"permission": "manage_students", "granted": false}]});
    app.send(json_request("PUT", &uri, Some(&admin), revoke))
        .await;

    let (_, body) = app.get("/api/access/check/manage_students", &therapist_token).await;
    assert_eq!(body["allowed"], false);
}

#[tokio::test]
async fn admin_passes_every_access_check() {
    let app = test_app().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = app.get("/api/access/check/export_data", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);

    let (status, body) = app.get("/api/access/check/not_a_permission", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn permissions_for_non_therapist_are_not_found() {
    let app = test_app().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, me) = app.get("/api/auth/me", &admin).await;

    let uri = format!("/api/therapists/{}/permissions", me["id"].as_str().unwrap());
    let (status, _) = app.get(&uri, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/therapists/not-a-uuid/permissions", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn public_sign_up_cannot_claim_a_privileged_role() {
    let app = test_app().await;

    for role in ["ADMIN", "THERAPIST"] {
        let (status, body) = app
            .post(
                "/api/auth/register",
                json!({"email": "mallory@x.com", "password": "secret1", "name": "M", "role": role}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }
    let (status, _) = app
        .post(
            "/api/auth/login",
            json!({"email": "mallory@x.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let parent = app.register("mallory@x.com", "secret1").await;
    assert_eq!(parent["role"], "PARENT");
    let therapist = app.create_user("t@x.com", "secret1", "THERAPIST").await;

    let token = app.login("mallory@x.com", "secret1").await;
    let uri = format!("/api/therapists/{}/permissions", therapist["id"].as_str().unwrap());
    let grant = json!({"permissions": [{"permission": "export_data", "granted": true}]});
    let (status, _) = app
        .send(json_request("PUT", &uri, Some(&token), grant))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let new_admin = json!({"email": "evil@x.com", "password": "secret1", "name": "E", "role": "ADMIN"});
    let (status, _) = app
        .send(json_request("POST", "/api/users", Some(&token), new_admin.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .send(json_request("POST", "/api/users", None, new_admin))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_creates_accounts_with_any_role() {
    let app = test_app().await;
    let therapist = app.create_user("t@x.com", "secret1", "THERAPIST").await;
    assert_eq!(therapist["role"], "THERAPIST");

    let token = app.login("t@x.com", "secret1").await;
    let (_, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(me["role"], "THERAPIST");
}

#[tokio::test]
async fn malformed_bodies_use_the_error_shape() {
    let app = test_app().await;

    let (status, body) = app
        .post("/api/auth/login", json!({"email": "a@x.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .body(Body::from(r#"{"email":"a@x.com","password":"secret1","name":"A"}"#))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
