//! Request handlers, one module per resource.

pub mod auth;
pub mod purchases;
pub mod records;
pub mod uploads;
pub mod users;
