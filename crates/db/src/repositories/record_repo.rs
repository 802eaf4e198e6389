//! Repository for the `records` table: the query/filter/pagination surface
//! and role-gated mutations of change-notice records.

use sqlx::{FromRow, PgPool};
use suivi_core::pagination::{clamp_page, clamp_page_size, page_offset};
use suivi_core::types::DbId;

use crate::models::record::{
    ChangeRecord, CreateRecord, CreatorDetail, CreatorSummary, FilterValues, RecordDetail,
    RecordFilter, RecordListItem, UpdateRecord,
};
use crate::repositories::{AttachmentRepo, PurchaseRepo};

/// Column list for records queries.
const COLUMNS: &str = "id, reference, product_line, model, title, description, \
    affected_serials, supplier, subassembly, component, validated_on, \
    in_production_since, sheet_part_name, external_code, creator_id, \
    created_at, updated_at";

/// Column list qualified with the `r.` alias for joined queries.
const R_COLUMNS: &str = "r.id, r.reference, r.product_line, r.model, r.title, r.description, \
    r.affected_serials, r.supplier, r.subassembly, r.component, r.validated_on, \
    r.in_production_since, r.sheet_part_name, r.external_code, r.creator_id, \
    r.created_at, r.updated_at";

/// Shared WHERE clause for the list and count queries. Nullable binds let a
/// single prepared statement serve every filter combination.
const LIST_WHERE: &str = "($1::text IS NULL OR r.product_line = $1)
      AND ($2::text IS NULL OR r.model = $2)
      AND ($3::text IS NULL OR r.external_code = $3)
      AND ($4::text IS NULL
           OR r.reference ILIKE $4
           OR r.title ILIKE $4
           OR r.description ILIKE $4
           OR r.external_code ILIKE $4
           OR r.sheet_part_name ILIKE $4)";

/// Joined row used by the list query.
#[derive(Debug, FromRow)]
struct RecordWithCreatorRow {
    #[sqlx(flatten)]
    record: ChangeRecord,
    creator_display_name: String,
}

/// Provides query and CRUD operations for change-notice records.
pub struct RecordRepo;

impl RecordRepo {
    /// Paginated, filtered listing ordered by `updated_at DESC, id DESC`
    /// (the id tiebreak keeps pagination stable across pages).
    ///
    /// Returns the page of items plus the total number of matching rows.
    pub async fn list(
        pool: &PgPool,
        filter: &RecordFilter,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<(Vec<RecordListItem>, i64), sqlx::Error> {
        let page = clamp_page(page);
        let page_size = clamp_page_size(limit);
        let offset = page_offset(page, page_size);

        let search_pattern = filter
            .search
            .as_deref()
            .map(|term| format!("%{}%", escape_like(term)));

        let list_query = format!(
            "SELECT {R_COLUMNS}, u.display_name AS creator_display_name
             FROM records r
             JOIN users u ON u.id = r.creator_id
             WHERE {LIST_WHERE}
             ORDER BY r.updated_at DESC, r.id DESC
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, RecordWithCreatorRow>(&list_query)
            .bind(&filter.product_line)
            .bind(&filter.model)
            .bind(&filter.external_code)
            .bind(&search_pattern)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM records r WHERE {LIST_WHERE}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&filter.product_line)
            .bind(&filter.model)
            .bind(&filter.external_code)
            .bind(&search_pattern)
            .fetch_one(pool)
            .await?;

        // One query for the whole page's attachment summaries, grouped after.
        let record_ids: Vec<DbId> = rows.iter().map(|r| r.record.id).collect();
        let summaries = AttachmentRepo::summaries_for_records(pool, &record_ids).await?;
        let mut by_record: std::collections::HashMap<DbId, Vec<_>> = std::collections::HashMap::new();
        for summary in summaries {
            by_record.entry(summary.record_id).or_default().push(summary);
        }

        let items = rows
            .into_iter()
            .map(|row| {
                let attachments = by_record.remove(&row.record.id).unwrap_or_default();
                RecordListItem {
                    creator: CreatorSummary {
                        id: row.record.creator_id,
                        display_name: row.creator_display_name,
                    },
                    record: row.record,
                    attachments,
                }
            })
            .collect();

        Ok((items, total))
    }

    /// Distinct values for the filter dropdowns, each sorted ascending.
    /// NULL external codes are excluded.
    pub async fn distinct_filter_values(pool: &PgPool) -> Result<FilterValues, sqlx::Error> {
        let product_lines: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT product_line FROM records ORDER BY product_line")
                .fetch_all(pool)
                .await?;
        let models: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT model FROM records ORDER BY model")
                .fetch_all(pool)
                .await?;
        let external_codes: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT external_code FROM records
             WHERE external_code IS NOT NULL ORDER BY external_code",
        )
        .fetch_all(pool)
        .await?;

        Ok(FilterValues {
            product_lines,
            models,
            external_codes,
        })
    }

    /// Find a record row by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ChangeRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM records WHERE id = $1");
        sqlx::query_as::<_, ChangeRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a record row by its unique reference.
    pub async fn find_by_reference(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<ChangeRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM records WHERE reference = $1");
        sqlx::query_as::<_, ChangeRecord>(&query)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    /// Full detail view: creator, all attachments, purchases newest-first.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<RecordDetail>, sqlx::Error> {
        let Some(record) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let creator = sqlx::query_as::<_, CreatorDetail>(
            "SELECT id, display_name, email FROM users WHERE id = $1",
        )
        .bind(record.creator_id)
        .fetch_one(pool)
        .await?;

        let attachments = AttachmentRepo::list_by_record(pool, id).await?;
        let purchases = PurchaseRepo::list_by_record(pool, id).await?;

        Ok(Some(RecordDetail {
            record,
            creator,
            attachments,
            purchases,
        }))
    }

    /// Insert a new record owned by `creator_id`, returning the created row.
    ///
    /// Uniqueness of `reference` is ultimately guarded by
    /// `uq_records_reference`; the handler pre-checks only for the message.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateRecord,
    ) -> Result<ChangeRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO records
                (reference, product_line, model, title, description, affected_serials,
                 supplier, subassembly, component, validated_on, in_production_since,
                 sheet_part_name, external_code, creator_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRecord>(&query)
            .bind(&input.reference)
            .bind(&input.product_line)
            .bind(&input.model)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.affected_serials)
            .bind(&input.supplier)
            .bind(&input.subassembly)
            .bind(&input.component)
            .bind(input.validated_on)
            .bind(input.in_production_since)
            .bind(&input.sheet_part_name)
            .bind(&input.external_code)
            .bind(creator_id)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update and refresh `updated_at`, returning the
    /// updated row.
    ///
    /// Fetch-then-merge: required fields keep their prior value when absent;
    /// optional fields distinguish "absent" (keep) from explicit `null`
    /// (clear) via the double-`Option` DTO.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRecord,
    ) -> Result<Option<ChangeRecord>, sqlx::Error> {
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let reference = input.reference.as_ref().unwrap_or(&existing.reference);
        let product_line = input
            .product_line
            .as_ref()
            .unwrap_or(&existing.product_line);
        let model = input.model.as_ref().unwrap_or(&existing.model);
        let title = input.title.as_ref().unwrap_or(&existing.title);

        let description = merge(&input.description, &existing.description);
        let affected_serials = merge(&input.affected_serials, &existing.affected_serials);
        let supplier = merge(&input.supplier, &existing.supplier);
        let subassembly = merge(&input.subassembly, &existing.subassembly);
        let component = merge(&input.component, &existing.component);
        let validated_on = merge(&input.validated_on, &existing.validated_on);
        let in_production_since = merge(&input.in_production_since, &existing.in_production_since);
        let sheet_part_name = merge(&input.sheet_part_name, &existing.sheet_part_name);
        let external_code = merge(&input.external_code, &existing.external_code);

        let query = format!(
            "UPDATE records SET
                reference = $2, product_line = $3, model = $4, title = $5,
                description = $6, affected_serials = $7, supplier = $8,
                subassembly = $9, component = $10, validated_on = $11,
                in_production_since = $12, sheet_part_name = $13,
                external_code = $14, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRecord>(&query)
            .bind(id)
            .bind(reference)
            .bind(product_line)
            .bind(model)
            .bind(title)
            .bind(description)
            .bind(affected_serials)
            .bind(supplier)
            .bind(subassembly)
            .bind(component)
            .bind(validated_on)
            .bind(in_production_since)
            .bind(sheet_part_name)
            .bind(external_code)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record and all owned purchases and attachment rows in one
    /// transaction, so a partial failure can never leave orphaned children.
    ///
    /// Returns the stored names of the deleted attachments so the caller can
    /// unlink the disk files afterwards (an orphan file is acceptable; a
    /// dangling row is not). Returns `None` when the record does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let stored_names: Vec<String> =
            sqlx::query_scalar("SELECT stored_name FROM attachments WHERE record_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        // Children first, parent last.
        sqlx::query("DELETE FROM purchases WHERE record_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM attachments WHERE record_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM records WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(stored_names))
    }
}

/// Merge one double-`Option` patch field with the existing column value.
fn merge<T: Clone>(patch: &Option<Option<T>>, existing: &Option<T>) -> Option<T> {
    match patch {
        Some(value) => value.clone(),
        None => existing.clone(),
    }
}

/// Escape LIKE/ILIKE wildcards in a user-supplied search term so `%` and `_`
/// match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
