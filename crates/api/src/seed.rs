//! First-run bootstrap seeding.
//!
//! A fresh database has no accounts and therefore no way to log in; on
//! startup, if the users table is empty, a default admin is created. The
//! password comes from `BOOTSTRAP_ADMIN_PASSWORD` (default `admin123` --
//! change it in any real deployment).

use suivi_core::roles::ROLE_ADMIN;
use suivi_db::models::user::CreateUser;
use suivi_db::repositories::UserRepo;
use suivi_db::DbPool;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Login of the bootstrap admin account.
pub const BOOTSTRAP_ADMIN_LOGIN: &str = "admin";

/// Create the bootstrap admin if no account exists yet.
///
/// Returns `true` when an account was created.
pub async fn bootstrap_admin(pool: &DbPool) -> AppResult<bool> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(false);
    }

    let password =
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let admin = UserRepo::create(
        pool,
        &CreateUser {
            login: BOOTSTRAP_ADMIN_LOGIN.to_string(),
            password_hash,
            display_name: "Administrator".to_string(),
            email: None,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = admin.id, login = %admin.login, "Bootstrap admin account created");
    Ok(true)
}
