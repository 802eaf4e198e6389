//! Handlers for the `/users` resource. Every route here is admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use suivi_core::error::CoreError;
use suivi_core::roles::Role;
use suivi_core::serde_util::double_option;
use suivi_core::types::DbId;
use suivi_db::models::user::{CreateUser, UpdateUser, UserResponse};
use suivi_db::repositories::UserRepo;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub login: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Defaults to `reader` when omitted.
    #[serde(default)]
    pub role: Option<String>,
}

/// Request body for `PUT /users/{id}`.
///
/// Omitted fields keep their prior value; an explicit `null` email clears
/// the address.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub login: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    if input.login.trim().is_empty() {
        return Err(validation("login must not be empty"));
    }
    if input.display_name.trim().is_empty() {
        return Err(validation("display_name must not be empty"));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    let role = parse_role(input.role.as_deref())?;

    // Friendly duplicate message; uq_users_login is the real guard.
    if UserRepo::find_by_login(&state.pool, &input.login)
        .await?
        .is_some()
    {
        return Err(duplicate_login(&input.login));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            login: input.login,
            password_hash,
            display_name: input.display_name,
            email: input.email,
            role: role.as_str().to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, login = %user.login, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PUT /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let existing = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if let Some(login) = &input.login {
        if login.trim().is_empty() {
            return Err(validation("login must not be empty"));
        }
        // Re-check uniqueness only when the login actually changes.
        if login != &existing.login
            && UserRepo::find_by_login(&state.pool, login).await?.is_some()
        {
            return Err(duplicate_login(login));
        }
    }
    if let Some(display_name) = &input.display_name {
        if display_name.trim().is_empty() {
            return Err(validation("display_name must not be empty"));
        }
    }

    let role = match input.role.as_deref() {
        Some(role) => Some(parse_role(Some(role))?.as_str().to_string()),
        None => None,
    };

    let password_hash = match &input.password {
        Some(password) => {
            validate_password_strength(password, MIN_PASSWORD_LENGTH)
                .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
            let hash = hash_password(password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
            Some(hash)
        }
        None => None,
    };

    let user = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            login: input.login,
            password_hash,
            display_name: input.display_name,
            email: input.email,
            role,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/users/{id}
///
/// Admins cannot delete their own account; a user that still owns records
/// is kept too (the foreign key surfaces as a client error).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if admin.user_id == id {
        return Err(validation("You cannot delete your own account"));
    }

    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validation(message: &str) -> AppError {
    AppError::Core(CoreError::Validation(message.to_string()))
}

fn duplicate_login(login: &str) -> AppError {
    AppError::Core(CoreError::DuplicateKey(format!(
        "A user with login '{login}' already exists"
    )))
}

/// Parse and validate a role name, defaulting to reader when absent.
fn parse_role(role: Option<&str>) -> AppResult<Role> {
    match role {
        None => Ok(Role::default()),
        Some(value) => value.parse::<Role>().map_err(|_| {
            AppError::Core(CoreError::Validation(format!("Unknown role '{value}'")))
        }),
    }
}
