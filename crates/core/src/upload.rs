//! Upload policy: MIME allowlist, size cap, and stored-name generation.
//!
//! The name a file is stored under on disk is an internal detail, generated
//! here and never derived from (or exposed as) the client-supplied filename.
//! Only the extension survives, after sanitization, so previews keep working.

use uuid::Uuid;

/// Maximum size of a single uploaded file (10 MiB).
pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum number of files accepted in a single upload request.
pub const MAX_FILES_PER_REQUEST: usize = 10;

/// MIME types accepted for attachments: common images, PDF, Word, Excel.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// A single file rejected by the upload policy.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadPolicyError {
    #[error("Unsupported file type '{mime_type}' for '{filename}'")]
    UnsupportedFileType { filename: String, mime_type: String },

    #[error("File '{filename}' exceeds the {max} byte limit")]
    FileTooLarge { filename: String, max: usize },
}

/// Check one file against the allowlist and size cap.
pub fn check_file(
    filename: &str,
    mime_type: &str,
    size_bytes: usize,
) -> Result<(), UploadPolicyError> {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(UploadPolicyError::UnsupportedFileType {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
        });
    }
    if size_bytes > MAX_FILE_SIZE_BYTES {
        return Err(UploadPolicyError::FileTooLarge {
            filename: filename.to_string(),
            max: MAX_FILE_SIZE_BYTES,
        });
    }
    Ok(())
}

/// Generate a collision-resistant on-disk name for an uploaded file.
///
/// Combines a millisecond timestamp with a random UUID so two files uploaded
/// in the same request never collide. The original filename contributes only
/// its (sanitized) extension.
pub fn generate_stored_name(original_name: &str) -> String {
    let stamp = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple();
    match sanitized_extension(original_name) {
        Some(ext) => format!("{stamp}-{suffix}.{ext}"),
        None => format!("{stamp}-{suffix}"),
    }
}

/// Extract a safe lowercase extension from a client filename.
///
/// Rejects anything that is not short plain alphanumeric, which also rules
/// out path traversal via crafted "extensions".
fn sanitized_extension(original_name: &str) -> Option<String> {
    let (stem, ext) = original_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_types_within_cap() {
        assert!(check_file("photo.jpg", "image/jpeg", 1024).is_ok());
        assert!(check_file("doc.pdf", "application/pdf", MAX_FILE_SIZE_BYTES).is_ok());
    }

    #[test]
    fn rejects_disallowed_mime() {
        let err = check_file("run.exe", "application/x-msdownload", 10).unwrap_err();
        assert!(matches!(err, UploadPolicyError::UnsupportedFileType { .. }));
    }

    #[test]
    fn rejects_oversized_file() {
        let err = check_file("big.png", "image/png", MAX_FILE_SIZE_BYTES + 1).unwrap_err();
        assert!(matches!(err, UploadPolicyError::FileTooLarge { .. }));
    }

    #[test]
    fn stored_names_are_unique_and_keep_extension() {
        let a = generate_stored_name("report.PDF");
        let b = generate_stored_name("report.PDF");
        assert_ne!(a, b);
        assert!(a.ends_with(".pdf"));
        assert!(!a.contains("report"));
    }

    #[test]
    fn hostile_extensions_are_dropped() {
        assert!(generate_stored_name("noext").ends_with(|c: char| c.is_ascii_alphanumeric()));
        assert!(!generate_stored_name("evil.p/df").contains('/'));
        assert!(!generate_stored_name("dots...").ends_with('.'));
        assert!(!generate_stored_name(".bashrc").ends_with(".bashrc"));
    }
}
