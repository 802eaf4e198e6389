//! Disk store for attachment files.
//!
//! File writes are not transactional with row creation; deletions tolerate
//! a missing file so an orphaned file (never an orphaned row) is the worst
//! outcome of a partial failure.

use std::path::{Path, PathBuf};

/// Handle on the upload directory. Cheap to clone; lives in [`AppState`].
///
/// [`AppState`]: crate::state::AppState
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AttachmentStore { root: root.into() }
    }

    /// The upload directory itself (also mounted read-only at `/files`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Absolute-ish path of a stored file. `stored_name` is always a
    /// server-generated single component, never client input.
    pub fn path_for(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }

    /// Write one uploaded file under its generated name.
    pub async fn save(&self, stored_name: &str, data: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.path_for(stored_name), data).await
    }

    /// Remove a stored file, tolerating its absence: the row is the source
    /// of truth for the user-facing list, a missing file is not a failure.
    pub async fn remove(&self, stored_name: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path_for(stored_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Whether the stored file currently exists on disk.
    pub async fn exists(&self, stored_name: &str) -> bool {
        tokio::fs::try_exists(self.path_for(stored_name))
            .await
            .unwrap_or(false)
    }
}
