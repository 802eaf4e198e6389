//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireEditor`] -- Requires the write capability (editor or admin).
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.

pub mod auth;
pub mod rbac;
