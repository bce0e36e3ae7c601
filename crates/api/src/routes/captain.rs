//! Route definitions for the captain directory.

use axum::routing::get;
use axum::Router;

use crate::handlers::{captain, options};
use crate::state::AppState;

/// ```text
/// GET  /                          -> index (search, ?q=)
/// GET  /captains/{id}             -> get_by_id
/// GET  /captains/{id}/assignments -> list_assignments
/// GET  /captain/new               -> roster options
/// POST /captain/new               -> create
/// GET  /top                       -> top (?base=&fleet=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(captain::index))
        .route("/captains/{id}", get(captain::get_by_id))
        .route("/captains/{id}/assignments", get(captain::list_assignments))
        .route("/captain/new", get(options::roster).post(captain::create))
        .route("/top", get(captain::top))
}
