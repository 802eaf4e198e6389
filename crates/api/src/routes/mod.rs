pub mod auth;
pub mod health;
pub mod records;
pub mod uploads;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                    login (public)
/// /auth/me                                       current user
///
/// /records                                       list, create
/// /records/filters                               distinct filter values
/// /records/{id}                                  get, update, delete
/// /records/{record_id}/purchases                 create purchase
/// /records/{record_id}/purchases/{purchase_id}   update, delete purchase
///
/// /uploads/{record_id}                           upload attachments (multipart)
/// /uploads/{id}                                  delete attachment
/// /uploads/{id}/download                         download attachment
///
/// /users                                         list, create (admin only)
/// /users/{id}                                    get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/records", records::router())
        .nest("/uploads", uploads::router())
        .nest("/users", users::router())
}
