//! Route definitions for the `/uploads` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use suivi_core::upload::{MAX_FILES_PER_REQUEST, MAX_FILE_SIZE_BYTES};

use crate::handlers::uploads;
use crate::state::AppState;

/// Routes mounted at `/uploads`.
///
/// ```text
/// POST   /{record_id}     upload attachments (multipart, editor)
/// DELETE /{id}            delete attachment (editor)
/// GET    /{id}/download   download attachment bytes
/// ```
pub fn router() -> Router<AppState> {
    // A full batch is 10 files of 10 MiB each; the extra megabyte covers
    // multipart framing overhead.
    let body_limit = MAX_FILES_PER_REQUEST * MAX_FILE_SIZE_BYTES + 1024 * 1024;

    Router::new()
        .route("/{id}", post(uploads::upload).delete(uploads::delete))
        .route("/{id}/download", get(uploads::download))
        .layer(DefaultBodyLimit::max(body_limit))
}
