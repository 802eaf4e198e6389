//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use suivi_core::error::CoreError;
use suivi_core::roles::Role;
use suivi_core::types::DbId;
use suivi_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Beyond signature/expiry validation, the user row is re-fetched so a
/// still-valid token for a deleted or deactivated account is rejected
/// (revocation on deactivation). The role comes from the database row, not
/// the token, so demotions take effect immediately too.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's login.
    pub login: String,
    /// The user's current role.
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
            })?;

        if !user.is_active {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Account is deactivated".into(),
            )));
        }

        let role: Role = user.role.parse().map_err(CoreError::Internal)?;

        Ok(AuthUser {
            user_id: user.id,
            login: user.login,
            role,
        })
    }
}
