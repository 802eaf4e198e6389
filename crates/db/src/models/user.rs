//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use suivi_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub login: String,
    pub password_hash: String,
    pub display_name: String,
    pub email: Option<String>,
    /// Role name as stored (`reader`, `editor`, `admin`).
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub login: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            login: user.login.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// DTO for inserting a new user. The password is hashed by the caller.
#[derive(Debug)]
pub struct CreateUser {
    pub login: String,
    pub password_hash: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
}

/// DTO for updating an existing user. All fields are optional; `email` uses
/// a double `Option` so an explicit JSON `null` clears the address while an
/// omitted field leaves it untouched.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub login: Option<String>,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<Option<String>>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}
