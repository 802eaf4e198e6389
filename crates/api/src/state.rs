use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::AttachmentStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: suivi_db::DbPool,
    /// Server configuration (JWT secret, upload directory, CORS origins).
    pub config: Arc<ServerConfig>,
    /// Disk store for attachment files.
    pub storage: AttachmentStore,
}
