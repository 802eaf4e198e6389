//! Temporary-purchase sub-record model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use suivi_core::serde_util::double_option;
use suivi_core::types::{DbId, Timestamp};

/// Status values stored in `purchases.status`.
pub const PURCHASE_STATUSES: &[&str] = &["in_progress", "done", "cancelled"];

/// Default status for a newly created purchase entry.
pub const DEFAULT_PURCHASE_STATUS: &str = "in_progress";

/// A row from the `purchases` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Purchase {
    pub id: DbId,
    pub record_id: DbId,
    pub designation: String,
    pub supplier: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
}

/// DTO for creating a purchase entry. Absent numeric fields stay NULL,
/// never zero.
#[derive(Debug, Deserialize)]
pub struct CreatePurchase {
    pub designation: String,
    pub supplier: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub status: Option<String>,
}

/// DTO for partially updating a purchase entry. Optional columns use the
/// double-`Option` pattern via [`double_option`]: omitted keeps the prior
/// value, explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePurchase {
    pub designation: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub supplier: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub quantity: Option<Option<i32>>,
    #[serde(deserialize_with = "double_option")]
    pub unit_price: Option<Option<f64>>,
    #[serde(deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub reason: Option<Option<String>>,
    pub status: Option<String>,
}
