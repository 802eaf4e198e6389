//! Handlers for the `/uploads` resource: attachment upload, deletion, and
//! download.
//!
//! Uploads are all-or-nothing per request: every file in the batch is
//! buffered and checked against the policy before a single byte reaches
//! disk, so a rejected batch leaves nothing behind.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use suivi_core::error::CoreError;
use suivi_core::types::DbId;
use suivi_core::upload::{check_file, generate_stored_name, MAX_FILES_PER_REQUEST};
use suivi_db::models::attachment::{Attachment, CreateAttachment};
use suivi_db::repositories::{AttachmentRepo, RecordRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;

/// One buffered upload before it is written anywhere.
struct PendingFile {
    original_name: String,
    mime_type: String,
    data: Vec<u8>,
}

/// POST /api/v1/uploads/{record_id}
///
/// Multipart upload (field `files`, up to 10 per request) bound to an
/// existing record. Any file failing the MIME/size policy rejects the whole
/// batch; a nonexistent record rejects it too, with nothing persisted.
pub async fn upload(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path(record_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Vec<Attachment>>)> {
    let mut pending: Vec<PendingFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("files") {
            continue; // ignore unknown fields
        }
        if pending.len() >= MAX_FILES_PER_REQUEST {
            return Err(AppError::BadRequest(format!(
                "At most {MAX_FILES_PER_REQUEST} files per request"
            )));
        }

        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let mime_type = field.content_type().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        pending.push(PendingFile {
            original_name,
            mime_type,
            data: data.to_vec(),
        });
    }

    if pending.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No files provided".into(),
        )));
    }

    // Upload to a nonexistent record is rejected before any disk write.
    if RecordRepo::find_by_id(&state.pool, record_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Record",
            id: record_id,
        }));
    }

    // Whole-batch policy check: one bad file fails the request.
    for file in &pending {
        check_file(&file.original_name, &file.mime_type, file.data.len())?;
    }

    // Write every file, then create the rows. On a mid-batch failure,
    // remove the files that have no row yet before surfacing the error.
    let mut written: Vec<(String, PendingFile)> = Vec::with_capacity(pending.len());
    for file in pending {
        let stored_name = generate_stored_name(&file.original_name);
        if let Err(e) = state.storage.save(&stored_name, &file.data).await {
            purge_files(&state, written.iter().map(|(name, _)| name.as_str())).await;
            return Err(AppError::InternalError(format!(
                "Failed to store uploaded file: {e}"
            )));
        }
        written.push((stored_name, file));
    }

    let mut attachments = Vec::with_capacity(written.len());
    for (index, (stored_name, file)) in written.iter().enumerate() {
        let input = CreateAttachment {
            record_id,
            original_name: file.original_name.clone(),
            stored_name: stored_name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.data.len() as i64,
        };
        match AttachmentRepo::create(&state.pool, &input).await {
            Ok(attachment) => attachments.push(attachment),
            Err(e) => {
                purge_files(
                    &state,
                    written[index..].iter().map(|(name, _)| name.as_str()),
                )
                .await;
                return Err(AppError::Database(e));
            }
        }
    }

    tracing::info!(record_id, count = attachments.len(), "Attachments uploaded");
    Ok((StatusCode::CREATED, Json(attachments)))
}

/// DELETE /api/v1/uploads/{id}
///
/// Remove the attachment row, then the disk file (missing file tolerated:
/// the row is the source of truth for the user-facing list).
pub async fn delete(
    State(state): State<AppState>,
    RequireEditor(_user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let attachment = AttachmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id,
        }))?;

    AttachmentRepo::delete(&state.pool, id).await?;

    if let Err(e) = state.storage.remove(&attachment.stored_name).await {
        tracing::warn!(attachment_id = id, error = %e, "Failed to remove attachment file");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/uploads/{id}/download
///
/// Stream the attachment bytes back with the original filename.
pub async fn download(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let attachment = AttachmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id,
        }))?;

    let path = state.storage.path_for(&attachment.stored_name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Attachment",
                id,
            }));
        }
        Err(e) => {
            return Err(AppError::InternalError(format!(
                "Failed to read attachment file: {e}"
            )));
        }
    };

    // Quotes stripped from the filename so the header stays well-formed.
    let filename = attachment.original_name.replace('"', "");
    let disposition = format!("attachment; filename=\"{filename}\"");

    Ok((
        [
            (header::CONTENT_TYPE, attachment.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Best-effort removal of files that never got a row.
async fn purge_files(state: &AppState, stored_names: impl Iterator<Item = &str>) {
    for stored_name in stored_names {
        if let Err(e) = state.storage.remove(stored_name).await {
            tracing::warn!(%stored_name, error = %e, "Failed to purge file from rejected batch");
        }
    }
}
