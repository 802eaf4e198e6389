//! Handlers for the `/auth` resource (login, current user).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use suivi_core::error::CoreError;
use suivi_db::models::user::UserResponse;
use suivi_db::repositories::UserRepo;

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with login + password, returning a signed session token.
/// Unknown login, deactivated account, and wrong password all produce the
/// same 401 so the response does not reveal which part was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if input.login.is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Login and password are required".into(),
        )));
    }

    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid login or password".into()));

    let user = UserRepo::find_by_login(&state.pool, &input.login)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(invalid());
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let token = generate_token(user.id, &user.login, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, login = %user.login, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// GET /api/v1/auth/me
///
/// Return the authenticated user's own account details.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserResponse>> {
    let row = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    Ok(Json(UserResponse::from(&row)))
}
