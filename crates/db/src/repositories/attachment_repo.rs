//! Repository for the `attachments` table.
//!
//! Disk writes and unlinks live in the API layer's attachment store; this
//! repository only owns the rows, which are the source of truth for the
//! user-facing attachment list.

use sqlx::PgPool;
use suivi_core::types::DbId;

use crate::models::attachment::{Attachment, AttachmentSummary, CreateAttachment};

/// Column list for attachments queries.
const COLUMNS: &str = "id, record_id, original_name, stored_name, mime_type, size_bytes, created_at";

/// Provides CRUD operations for attachment rows.
pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Insert one attachment row after a successful disk write.
    pub async fn create(pool: &PgPool, input: &CreateAttachment) -> Result<Attachment, sqlx::Error> {
        let query = format!(
            "INSERT INTO attachments (record_id, original_name, stored_name, mime_type, size_bytes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(input.record_id)
            .bind(&input.original_name)
            .bind(&input.stored_name)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .fetch_one(pool)
            .await
    }

    /// Find an attachment row by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attachment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attachments WHERE id = $1");
        sqlx::query_as::<_, Attachment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All attachments of one record, newest first.
    pub async fn list_by_record(
        pool: &PgPool,
        record_id: DbId,
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM attachments WHERE record_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Attachment>(&query)
            .bind(record_id)
            .fetch_all(pool)
            .await
    }

    /// Slim summaries for a whole page of records in one round trip.
    pub async fn summaries_for_records(
        pool: &PgPool,
        record_ids: &[DbId],
    ) -> Result<Vec<AttachmentSummary>, sqlx::Error> {
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, AttachmentSummary>(
            "SELECT id, record_id, original_name, mime_type
             FROM attachments
             WHERE record_id = ANY($1)
             ORDER BY created_at DESC",
        )
        .bind(record_ids)
        .fetch_all(pool)
        .await
    }

    /// Delete one attachment row. Returns `false` when no row matched.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
