//! Route definitions for edit suggestions.

use axum::routing::get;
use axum::Router;

use crate::handlers::suggestion;
use crate::state::AppState;

/// ```text
/// GET  /captain/{id}/suggest -> form
/// POST /captain/{id}/suggest -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/captain/{id}/suggest",
        get(suggestion::form).post(suggestion::create),
    )
}
