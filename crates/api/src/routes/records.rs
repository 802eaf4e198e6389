//! Route definitions for the `/records` resource, including the nested
//! purchase entries.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{purchases, records};
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// ```text
/// GET    /                                      list (filters + pagination)
/// GET    /filters                               distinct filter values
/// POST   /                                      create (editor)
/// GET    /{id}                                  detail
/// PUT    /{id}                                  update (editor)
/// DELETE /{id}                                  delete + cascade (editor)
///
/// POST   /{record_id}/purchases                 create purchase (editor)
/// PUT    /{record_id}/purchases/{purchase_id}   update purchase (editor)
/// DELETE /{record_id}/purchases/{purchase_id}   delete purchase (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list).post(records::create))
        .route("/filters", get(records::filter_values))
        .route(
            "/{id}",
            get(records::get)
                .put(records::update)
                .delete(records::delete),
        )
        .route("/{record_id}/purchases", post(purchases::create))
        .route(
            "/{record_id}/purchases/{purchase_id}",
            put(purchases::update).delete(purchases::delete),
        )
}
