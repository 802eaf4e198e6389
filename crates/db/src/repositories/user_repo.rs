//! Repository for the `users` table.

use sqlx::PgPool;
use suivi_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list for users queries.
const COLUMNS: &str =
    "id, login, password_hash, display_name, email, role, is_active, created_at";

/// Provides CRUD operations for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// The `uq_users_login` constraint is the real uniqueness guard; callers
    /// pre-check with [`UserRepo::find_by_login`] only for a friendly error.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (login, password_hash, display_name, email, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.login)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by login (case-sensitive exact match).
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE login = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    /// List all users, ordered by display name.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY display_name ASC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Count all users. Used by the bootstrap seeder.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    ///
    /// Fetch-then-merge so that an omitted email keeps the prior value while
    /// an explicit `null` clears it.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let login = input.login.as_ref().unwrap_or(&existing.login);
        let password_hash = input
            .password_hash
            .as_ref()
            .unwrap_or(&existing.password_hash);
        let display_name = input
            .display_name
            .as_ref()
            .unwrap_or(&existing.display_name);
        let email = match &input.email {
            Some(email) => email.clone(),
            None => existing.email.clone(),
        };
        let role = input.role.as_ref().unwrap_or(&existing.role);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        let query = format!(
            "UPDATE users SET
                login = $2,
                password_hash = $3,
                display_name = $4,
                email = $5,
                role = $6,
                is_active = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(login)
            .bind(password_hash)
            .bind(display_name)
            .bind(email)
            .bind(role)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user. Returns `false` when no row matched.
    ///
    /// Fails with a foreign-key violation if the user still owns records;
    /// the API layer maps that to a client error.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
