//! HTTP-level integration tests for login and session handling.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, seed_user, seed_user_with_token, TEST_PASSWORD};
use sqlx::PgPool;
use suivi_api::seed::bootstrap_admin;
use suivi_db::models::user::UpdateUser;
use suivi_db::repositories::UserRepo;

/// Successful login returns 200 with a token and the safe user view.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_success(pool: PgPool) {
    let user = seed_user(&pool, "alice", "editor").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "login": "alice", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["token"].is_string(), "response must contain a token");
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["login"], "alice");
    assert_eq!(json["user"]["role"], "editor");
    assert!(
        json["user"].get("password_hash").is_none(),
        "password hash must never leave the server"
    );
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password(pool: PgPool) {
    seed_user(&pool, "bob", "reader").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "login": "bob", "password": "not-the-password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with a nonexistent login returns the same 401 as a wrong password.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_unknown_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "login": "ghost", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login to a deactivated account returns 401, indistinguishable from bad
/// credentials.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_deactivated_account(pool: PgPool) {
    let user = seed_user(&pool, "gone", "reader").await;
    UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .expect("deactivation should succeed");

    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "login": "gone", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// GET /auth/me returns the caller's own account.
#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_current_user(pool: PgPool) {
    let (user, token) = seed_user_with_token(&pool, "carol", "admin").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], user.id);
    assert_eq!(json["login"], "carol");
    assert_eq!(json["role"], "admin");
}

/// GET /auth/me without a token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn me_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A syntactically invalid token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-real-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// On an empty database the startup seeder creates an admin that can log
/// in with the default password; a second run is a no-op.
#[sqlx::test(migrations = "../db/migrations")]
async fn bootstrap_admin_seeds_first_account(pool: PgPool) {
    let created = bootstrap_admin(&pool).await.expect("seeding should succeed");
    assert!(created, "empty users table must get a bootstrap admin");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "login": "admin", "password": "admin123" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["login"], "admin");
    assert_eq!(json["user"]["role"], "admin");
    assert_eq!(json["user"]["is_active"], true);

    let created = bootstrap_admin(&pool).await.expect("seeding should succeed");
    assert!(!created, "seeder must not run twice");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .expect("count should succeed");
    assert_eq!(count, 1);
}

/// The seeder never touches a users table that already has accounts.
#[sqlx::test(migrations = "../db/migrations")]
async fn bootstrap_admin_skips_populated_table(pool: PgPool) {
    seed_user(&pool, "existing", "reader").await;

    let created = bootstrap_admin(&pool).await.expect("seeding should succeed");
    assert!(!created);

    let admin_row = UserRepo::find_by_login(&pool, "admin")
        .await
        .expect("lookup should succeed");
    assert!(admin_row.is_none(), "no bootstrap admin must be created");
}

/// Deactivating an account revokes tokens that were already issued.
#[sqlx::test(migrations = "../db/migrations")]
async fn deactivation_revokes_existing_token(pool: PgPool) {
    let (user, token) = seed_user_with_token(&pool, "dave", "editor").await;

    // Token works before deactivation.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    UserRepo::update(
        &pool,
        user.id,
        &UpdateUser {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .expect("deactivation should succeed");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
