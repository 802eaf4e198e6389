//! Domain primitives shared by the database and API layers.
//!
//! This crate carries no sqlx or axum dependency so the error taxonomy,
//! role model, pagination rules, and upload policy can be unit tested in
//! isolation and reused by any future CLI tooling.

pub mod error;
pub mod pagination;
pub mod roles;
pub mod serde_util;
pub mod types;
pub mod upload;
