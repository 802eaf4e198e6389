//! Change-notice record model, DTOs, and list/detail projections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use suivi_core::serde_util::double_option;
use suivi_core::types::{DbId, Timestamp};

use crate::models::attachment::{Attachment, AttachmentSummary};
use crate::models::purchase::Purchase;

/// A row from the `records` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChangeRecord {
    pub id: DbId,
    pub reference: String,
    pub product_line: String,
    pub model: String,
    pub title: String,
    pub description: Option<String>,
    pub affected_serials: Option<String>,
    pub supplier: Option<String>,
    pub subassembly: Option<String>,
    pub component: Option<String>,
    pub validated_on: Option<NaiveDate>,
    pub in_production_since: Option<NaiveDate>,
    pub sheet_part_name: Option<String>,
    pub external_code: Option<String>,
    pub creator_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Creator identity embedded in list items.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CreatorSummary {
    pub id: DbId,
    pub display_name: String,
}

/// Creator identity embedded in the record detail view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CreatorDetail {
    pub id: DbId,
    pub display_name: String,
    pub email: Option<String>,
}

/// One entry of the paginated record listing: the record plus its creator
/// and attachment summaries (never full attachment bodies).
#[derive(Debug, Serialize)]
pub struct RecordListItem {
    #[serde(flatten)]
    pub record: ChangeRecord,
    pub creator: CreatorSummary,
    pub attachments: Vec<AttachmentSummary>,
}

/// Full record detail: creator, every attachment, every purchase entry.
#[derive(Debug, Serialize)]
pub struct RecordDetail {
    #[serde(flatten)]
    pub record: ChangeRecord,
    pub creator: CreatorDetail,
    pub attachments: Vec<Attachment>,
    pub purchases: Vec<Purchase>,
}

/// Distinct values offered to the list view's filter dropdowns.
#[derive(Debug, Serialize)]
pub struct FilterValues {
    pub product_lines: Vec<String>,
    pub models: Vec<String>,
    pub external_codes: Vec<String>,
}

/// Conjunctive filter over the record listing. Exact-match fields combine
/// with AND; `search` is an OR substring match (case-insensitive) across
/// reference, title, description, external code, and sheet part name.
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    pub product_line: Option<String>,
    pub model: Option<String>,
    pub external_code: Option<String>,
    pub search: Option<String>,
}

/// DTO for creating a record. Required fields are validated in the handler.
#[derive(Debug, Deserialize)]
pub struct CreateRecord {
    pub reference: String,
    pub product_line: String,
    pub model: String,
    pub title: String,
    pub description: Option<String>,
    pub affected_serials: Option<String>,
    pub supplier: Option<String>,
    pub subassembly: Option<String>,
    pub component: Option<String>,
    pub validated_on: Option<NaiveDate>,
    pub in_production_since: Option<NaiveDate>,
    pub sheet_part_name: Option<String>,
    pub external_code: Option<String>,
}

/// DTO for partially updating a record.
///
/// Required columns use a single `Option` (present or keep). Optional
/// columns use `Option<Option<T>>` via [`double_option`]: an omitted field
/// deserializes to `None` (keep the prior value) while an explicit JSON
/// `null` becomes `Some(None)` (clear the column).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRecord {
    pub reference: Option<String>,
    pub product_line: Option<String>,
    pub model: Option<String>,
    pub title: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub affected_serials: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub supplier: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub subassembly: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub component: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub validated_on: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub in_production_since: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    pub sheet_part_name: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub external_code: Option<Option<String>>,
}
