//! Shared harness for HTTP-level integration tests.
//!
//! Each test binary gets the same router that `main.rs` serves, built via
//! [`suivi_api::router::build_app_router`], so the full middleware stack
//! (CORS, request ID, timeout, tracing, panic recovery) is exercised.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use suivi_api::auth::jwt::{generate_token, JwtConfig};
use suivi_api::auth::password::hash_password;
use suivi_api::config::ServerConfig;
use suivi_api::router::build_app_router;
use suivi_api::state::AppState;
use suivi_api::storage::AttachmentStore;
use suivi_db::models::user::{CreateUser, User};
use suivi_db::repositories::UserRepo;

/// Signing secret shared by the test config and the token helpers.
const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 24,
        },
    }
}

/// Build the application router on a throwaway upload directory.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_storage(pool, test_upload_dir())
}

/// Build the application router with an explicit upload directory, for
/// tests that need to look at the stored files afterwards.
pub fn build_test_app_with_storage(pool: PgPool, upload_dir: PathBuf) -> Router {
    std::fs::create_dir_all(&upload_dir).expect("upload dir should be creatable");

    let config = test_config(upload_dir.clone());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: AttachmentStore::new(upload_dir),
    };
    build_app_router(state, &config)
}

/// A fresh per-test directory under the OS temp dir.
pub fn test_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("suivi-test-uploads-{}", uuid::Uuid::new_v4().simple()))
}

// ---------------------------------------------------------------------------
// Test users and tokens
// ---------------------------------------------------------------------------

/// Plaintext password shared by all seeded test users.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Create a user directly in the database with [`TEST_PASSWORD`].
pub async fn seed_user(pool: &PgPool, login: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            login: login.to_string(),
            password_hash,
            display_name: format!("Test {login}"),
            email: Some(format!("{login}@test.com")),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Create a user and return a valid session token for it.
pub async fn seed_user_with_token(pool: &PgPool, login: &str, role: &str) -> (User, String) {
    let user = seed_user(pool, login, role).await;
    let token = token_for(&user);
    (user, token)
}

/// Sign a session token for an existing user with the test secret.
pub fn token_for(user: &User) -> String {
    let config = JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        expiry_hours: 24,
    };
    generate_token(user.id, &user.login, &user.role, &config)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body, no authentication.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PUT request with a JSON body and a bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request with a bearer token.
pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Expect `response` to have `status` and return its parsed JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
