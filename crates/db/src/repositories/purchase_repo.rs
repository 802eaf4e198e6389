//! Repository for the `purchases` table.

use sqlx::PgPool;
use suivi_core::types::DbId;

use crate::models::purchase::{
    CreatePurchase, Purchase, UpdatePurchase, DEFAULT_PURCHASE_STATUS,
};

/// Column list for purchases queries.
const COLUMNS: &str = "id, record_id, designation, supplier, quantity, unit_price, \
    start_date, end_date, reason, status, created_at";

/// Provides CRUD operations for temporary-purchase entries.
pub struct PurchaseRepo;

impl PurchaseRepo {
    /// Insert a purchase entry under an existing record.
    pub async fn create(
        pool: &PgPool,
        record_id: DbId,
        input: &CreatePurchase,
    ) -> Result<Purchase, sqlx::Error> {
        let status = input.status.as_deref().unwrap_or(DEFAULT_PURCHASE_STATUS);
        let query = format!(
            "INSERT INTO purchases
                (record_id, designation, supplier, quantity, unit_price,
                 start_date, end_date, reason, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Purchase>(&query)
            .bind(record_id)
            .bind(&input.designation)
            .bind(&input.supplier)
            .bind(input.quantity)
            .bind(input.unit_price)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.reason)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// Find a purchase entry by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Purchase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM purchases WHERE id = $1");
        sqlx::query_as::<_, Purchase>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All purchase entries of one record, newest first.
    pub async fn list_by_record(
        pool: &PgPool,
        record_id: DbId,
    ) -> Result<Vec<Purchase>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM purchases WHERE record_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Purchase>(&query)
            .bind(record_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update, returning the updated row. Same fetch-merge
    /// semantics as the record update: absent keeps, explicit null clears.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePurchase,
    ) -> Result<Option<Purchase>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let designation = input.designation.as_ref().unwrap_or(&existing.designation);
        let supplier = merge(&input.supplier, &existing.supplier);
        let quantity = merge(&input.quantity, &existing.quantity);
        let unit_price = merge(&input.unit_price, &existing.unit_price);
        let start_date = merge(&input.start_date, &existing.start_date);
        let end_date = merge(&input.end_date, &existing.end_date);
        let reason = merge(&input.reason, &existing.reason);
        let status = input.status.as_ref().unwrap_or(&existing.status);

        let query = format!(
            "UPDATE purchases SET
                designation = $2, supplier = $3, quantity = $4, unit_price = $5,
                start_date = $6, end_date = $7, reason = $8, status = $9
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Purchase>(&query)
            .bind(id)
            .bind(designation)
            .bind(supplier)
            .bind(quantity)
            .bind(unit_price)
            .bind(start_date)
            .bind(end_date)
            .bind(reason)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete one purchase entry. Returns `false` when no row matched.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Merge one double-`Option` patch field with the existing column value.
fn merge<T: Clone>(patch: &Option<Option<T>>, existing: &Option<T>) -> Option<T> {
    match patch {
        Some(value) => value.clone(),
        None => existing.clone(),
    }
}
