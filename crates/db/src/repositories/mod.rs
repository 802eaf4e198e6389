//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod attachment_repo;
pub mod purchase_repo;
pub mod record_repo;
pub mod user_repo;

pub use attachment_repo::AttachmentRepo;
pub use purchase_repo::PurchaseRepo;
pub use record_repo::RecordRepo;
pub use user_repo::UserRepo;
