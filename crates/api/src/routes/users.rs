//! Route definitions for the `/users` resource (admin only).

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`. Every handler checks the admin role.
///
/// ```text
/// GET    /       list users
/// POST   /       create user
/// GET    /{id}   get user
/// PUT    /{id}   update user
/// DELETE /{id}   delete user (not self)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
}
