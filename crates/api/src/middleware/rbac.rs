//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the required capability. Use these in route handlers to enforce
//! authorization at the type level; capabilities are derived once from the
//! role, never recomputed ad hoc.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use suivi_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the write capability (`editor` or `admin` role).
/// Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn editor_or_admin(RequireEditor(user): RequireEditor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_write() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Editor or Admin role required".into(),
            )));
        }
        Ok(RequireEditor(user))
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
