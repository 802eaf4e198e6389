//! Handlers for the `/records` resource: the filtered, paginated listing
//! and the role-gated record mutations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use suivi_core::error::CoreError;
use suivi_core::pagination::{clamp_page, clamp_page_size};
use suivi_core::types::DbId;
use suivi_db::models::record::{
    ChangeRecord, CreateRecord, FilterValues, RecordDetail, RecordFilter, RecordListItem,
    UpdateRecord,
};
use suivi_db::repositories::RecordRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::response::Paginated;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /records`.
#[derive(Debug, Deserialize)]
pub struct ListRecordsParams {
    pub product_line: Option<String>,
    pub model: Option<String>,
    pub external_code: Option<String>,
    pub search: Option<String>,
    /// 1-indexed page number.
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/records
///
/// Filtered, paginated listing ordered most-recently-touched first.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListRecordsParams>,
) -> AppResult<Json<Paginated<RecordListItem>>> {
    let filter = RecordFilter {
        product_line: none_if_empty(params.product_line),
        model: none_if_empty(params.model),
        external_code: none_if_empty(params.external_code),
        search: none_if_empty(params.search),
    };

    let (items, total) = RecordRepo::list(&state.pool, &filter, params.page, params.limit).await?;

    let page = clamp_page(params.page);
    let limit = clamp_page_size(params.limit);
    Ok(Json(Paginated::new(items, page, limit, total)))
}

/// GET /api/v1/records/filters
///
/// Distinct values for the list view's filter dropdowns.
pub async fn filter_values(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<FilterValues>> {
    let values = RecordRepo::distinct_filter_values(&state.pool).await?;
    Ok(Json(values))
}

/// GET /api/v1/records/{id}
///
/// Full record detail with creator, attachments, and purchase entries.
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<RecordDetail>> {
    let detail = RecordRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;
    Ok(Json(detail))
}

/// POST /api/v1/records
///
/// Create a record owned by the caller. Requires the write capability.
pub async fn create(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreateRecord>,
) -> AppResult<(StatusCode, Json<ChangeRecord>)> {
    validate_required(&[
        ("reference", &input.reference),
        ("product_line", &input.product_line),
        ("model", &input.model),
        ("title", &input.title),
    ])?;

    // Friendly duplicate message; uq_records_reference is the real guard.
    if RecordRepo::find_by_reference(&state.pool, &input.reference)
        .await?
        .is_some()
    {
        return Err(duplicate_reference(&input.reference));
    }

    let record = RecordRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(record_id = record.id, reference = %record.reference, "Record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/v1/records/{id}
///
/// Partial update: omitted fields keep their prior value, explicit `null`
/// clears optional fields. Refreshes `updated_at`.
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRecord>,
) -> AppResult<Json<ChangeRecord>> {
    let existing = RecordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;

    // Required fields may be omitted on update but never blanked.
    validate_required_patch(&[
        ("reference", &input.reference),
        ("product_line", &input.product_line),
        ("model", &input.model),
        ("title", &input.title),
    ])?;

    // Re-check uniqueness only when the reference actually changes.
    if let Some(reference) = &input.reference {
        if reference != &existing.reference
            && RecordRepo::find_by_reference(&state.pool, reference)
                .await?
                .is_some()
        {
            return Err(duplicate_reference(reference));
        }
    }

    let record = RecordRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;
    Ok(Json(record))
}

/// DELETE /api/v1/records/{id}
///
/// Delete the record and cascade to its purchase entries and attachments.
/// Child rows go with the parent in one transaction; disk files are
/// unlinked afterwards, best effort.
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let stored_names = RecordRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id,
        }))?;

    for stored_name in &stored_names {
        if let Err(e) = state.storage.remove(stored_name).await {
            // The rows are already gone; an orphaned file is acceptable.
            tracing::warn!(record_id = id, %stored_name, error = %e, "Failed to remove attachment file");
        }
    }

    tracing::info!(record_id = id, attachments = stored_names.len(), "Record deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Treat empty / whitespace-only query values as absent.
fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reject when any required field is empty or whitespace-only.
fn validate_required(fields: &[(&str, &str)]) -> AppResult<()> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{name} must not be empty"
            ))));
        }
    }
    Ok(())
}

/// Like [`validate_required`], but for patch bodies: an omitted field is
/// fine, a supplied one must be non-blank.
fn validate_required_patch(fields: &[(&str, &Option<String>)]) -> AppResult<()> {
    for (name, value) in fields {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{name} must not be empty"
            ))));
        }
    }
    Ok(())
}

fn duplicate_reference(reference: &str) -> AppError {
    AppError::Core(CoreError::DuplicateKey(format!(
        "A record with reference '{reference}' already exists"
    )))
}
