//! Route definitions for reviews.

use axum::routing::get;
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// ```text
/// GET  /review/new/{id} -> new_form
/// POST /review/new/{id} -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/review/new/{id}",
        get(review::new_form).post(review::create),
    )
}
