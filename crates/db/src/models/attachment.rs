//! Attachment entity model.

use serde::Serialize;
use sqlx::FromRow;
use suivi_core::types::{DbId, Timestamp};

/// A row from the `attachments` table.
///
/// `stored_name` is the opaque on-disk name; clients only ever see it through
/// the static file mount, never as part of the upload/delete contract.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attachment {
    pub id: DbId,
    pub record_id: DbId,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

/// Slim projection embedded in record list items.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttachmentSummary {
    pub id: DbId,
    #[serde(skip)]
    pub record_id: DbId,
    pub original_name: String,
    pub mime_type: String,
}

/// DTO for inserting an attachment row after a successful disk write.
#[derive(Debug)]
pub struct CreateAttachment {
    pub record_id: DbId,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
}
