pub mod auth;
pub mod captain;
pub mod health;
pub mod review;
pub mod suggestion;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree (everything except `/health`).
///
/// Route hierarchy:
///
/// ```text
/// /login                          access status, exchange invite code
/// /logout                         clear session
/// /options                        bases, fleets, rating categories (public)
///
/// /                               captain search (public or gated)
/// /captains/{id}                  captain profile with aggregated scores
/// /captains/{id}/assignments      assignment history
/// /captain/new                    roster options, add captain
/// /captain/{id}/suggest           pending suggestions, suggest base/fleet
/// /review/new/{id}                rating form, submit review
/// /top                            top-rated captains
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/options", get(handlers::options::list))
        .merge(auth::router())
        .merge(captain::router())
        .merge(review::router())
        .merge(suggestion::router())
}
