//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (optional fields) for patches

pub mod attachment;
pub mod purchase;
pub mod record;
pub mod user;
