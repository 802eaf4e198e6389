//! Handlers for purchase entries, nested under records:
//! `/records/{record_id}/purchases[/{purchase_id}]`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use suivi_core::error::CoreError;
use suivi_core::types::DbId;
use suivi_db::models::purchase::{
    CreatePurchase, Purchase, UpdatePurchase, PURCHASE_STATUSES,
};
use suivi_db::repositories::{PurchaseRepo, RecordRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;

/// POST /api/v1/records/{record_id}/purchases
pub async fn create(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path(record_id): Path<DbId>,
    Json(input): Json<CreatePurchase>,
) -> AppResult<(StatusCode, Json<Purchase>)> {
    if input.designation.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "designation must not be empty".into(),
        )));
    }
    validate_amounts(input.quantity, input.unit_price)?;
    if let Some(status) = &input.status {
        validate_status(status)?;
    }

    // Purchases are always scoped under an existing record.
    if RecordRepo::find_by_id(&state.pool, record_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id: record_id,
        }));
    }

    let purchase = PurchaseRepo::create(&state.pool, record_id, &input).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

/// PUT /api/v1/records/{record_id}/purchases/{purchase_id}
pub async fn update(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path((record_id, purchase_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdatePurchase>,
) -> AppResult<Json<Purchase>> {
    if let Some(designation) = &input.designation {
        if designation.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "designation must not be empty".into(),
            )));
        }
    }
    validate_amounts(input.quantity.flatten(), input.unit_price.flatten())?;
    if let Some(status) = &input.status {
        validate_status(status)?;
    }

    scoped_purchase(&state, record_id, purchase_id).await?;

    let purchase = PurchaseRepo::update(&state.pool, purchase_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Purchase",
            id: purchase_id,
        }))?;
    Ok(Json(purchase))
}

/// DELETE /api/v1/records/{record_id}/purchases/{purchase_id}
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path((record_id, purchase_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    scoped_purchase(&state, record_id, purchase_id).await?;

    if PurchaseRepo::delete(&state.pool, purchase_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Purchase",
            id: purchase_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 404 unless the purchase exists and belongs to the record in the path.
async fn scoped_purchase(
    state: &AppState,
    record_id: DbId,
    purchase_id: DbId,
) -> AppResult<Purchase> {
    let purchase = PurchaseRepo::find_by_id(&state.pool, purchase_id)
        .await?
        .filter(|p| p.record_id == record_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Purchase",
            id: purchase_id,
        }))?;
    Ok(purchase)
}

/// Numeric fields must be non-negative; absent means NULL, never zero.
fn validate_amounts(quantity: Option<i32>, unit_price: Option<f64>) -> AppResult<()> {
    if quantity.is_some_and(|q| q < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "quantity must be non-negative".into(),
        )));
    }
    if unit_price.is_some_and(|p| p < 0.0) {
        return Err(AppError::Core(CoreError::Validation(
            "unit_price must be non-negative".into(),
        )));
    }
    Ok(())
}

fn validate_status(status: &str) -> AppResult<()> {
    if !PURCHASE_STATUSES.contains(&status) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "status must be one of: {}",
            PURCHASE_STATUSES.join(", ")
        ))));
    }
    Ok(())
}
