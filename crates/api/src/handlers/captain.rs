//! Handlers for the captain directory: search, profile, creation, history
//! and the top-rated list.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use rmc_core::error::CoreError;
use rmc_core::rating::{summarize, RatingSummary, Scores};
use rmc_core::roster::{normalize_name, validate_base, validate_fleet};
use rmc_core::types::DbId;
use rmc_db::models::assignment::CaptainAssignment;
use rmc_db::models::captain::{Captain, CreateCaptain};
use rmc_db::models::review::Review;
use rmc_db::repositories::{AssignmentRepo, CaptainRepo, ReviewRepo, SuggestionRepo};
use rmc_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::access::{LandingAccess, RequireAccess};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Maximum rows on the top-rated list.
pub const TOP_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub base: Option<String>,
    pub fleet: Option<String>,
}

/// Request body for `POST /captain/new`.
///
/// The name length limit applies after whitespace is collapsed.
#[derive(Debug, Deserialize)]
pub struct CreateCaptainRequest {
    pub name: String,
    pub base: String,
    pub fleet: String,
}

/// A captain in a list, with its headline score when one may be shown.
#[derive(Debug, Serialize)]
pub struct CaptainListItem {
    #[serde(flatten)]
    pub captain: Captain,
    pub review_count: usize,
    /// `None` until the captain has enough reviews.
    pub overall: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CaptainIndex {
    pub query: String,
    pub min_display_reviews: usize,
    pub captains: Vec<CaptainListItem>,
    /// Every captain name, for autocomplete.
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CaptainDetail {
    pub captain: Captain,
    pub ratings: RatingSummary,
    pub min_display_reviews: usize,
    pub last_updated: NaiveDate,
    pub pending_suggestions: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatedCaptain {
    pub captain: Captain,
    /// `false` when an existing captain matched and nothing was inserted.
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct TopList {
    pub base: Option<String>,
    pub fleet: Option<String>,
    pub min_reviews: usize,
    pub captains: Vec<CaptainListItem>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /?q=
///
/// Search captains by name, base or fleet. Open to everyone unless the
/// landing page is gated.
pub async fn index(
    _access: LandingAccess,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<CaptainIndex>>> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let term = (!query.is_empty()).then_some(query.as_str());

    let captains = CaptainRepo::search(&state.pool, term).await?;
    let min_display = state.config.min_display_reviews;
    let captains = with_scores(&state.pool, captains, min_display).await?;
    let names = CaptainRepo::list_names(&state.pool).await?;

    Ok(Json(DataResponse {
        data: CaptainIndex {
            query,
            min_display_reviews: min_display,
            captains,
            names,
        },
    }))
}

/// GET /captains/{id}
pub async fn get_by_id(
    _access: RequireAccess,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CaptainDetail>>> {
    let captain = find_captain(&state.pool, id).await?;

    let scores: Vec<Scores> = ReviewRepo::list_for_captain(&state.pool, id)
        .await?
        .iter()
        .map(Review::scores)
        .collect();
    let min_display = state.config.min_display_reviews;
    let ratings = summarize(&scores, min_display);
    let pending_suggestions = SuggestionRepo::count_pending_for_captain(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: CaptainDetail {
            last_updated: captain.updated_at.date_naive(),
            captain,
            ratings,
            min_display_reviews: min_display,
            pending_suggestions,
        },
    }))
}

/// GET /captains/{id}/assignments
///
/// Assignment history, most recent first.
pub async fn list_assignments(
    _access: RequireAccess,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CaptainAssignment>>>> {
    find_captain(&state.pool, id).await?;
    let history = AssignmentRepo::list_for_captain(&state.pool, id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// POST /captain/new
///
/// Returns 201 with the new captain, or 200 with the existing one when the
/// normalized name, base and fleet already match a captain.
pub async fn create(
    _access: RequireAccess,
    State(state): State<AppState>,
    Json(input): Json<CreateCaptainRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse<CreatedCaptain>>)> {
    let name = normalize_name(&input.name)?;
    let base = validate_base(&input.base)?;
    let fleet = validate_fleet(&input.fleet)?;

    if let Some(existing) = CaptainRepo::find_by_identity(&state.pool, &name, &base, &fleet).await?
    {
        return Ok((
            StatusCode::OK,
            Json(MessageResponse {
                data: CreatedCaptain {
                    captain: existing,
                    created: false,
                },
                message: "Captain already exists.".to_string(),
            }),
        ));
    }

    let (captain, _assignment) = CaptainRepo::create_with_assignment(
        &state.pool,
        &CreateCaptain { name, base, fleet },
        Utc::now(),
    )
    .await?;

    tracing::info!(
        captain_id = captain.id,
        employee_id = %captain.employee_id,
        base = %captain.base,
        fleet = %captain.fleet,
        "Captain added",
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            data: CreatedCaptain {
                captain,
                created: true,
            },
            message: "Captain added!".to_string(),
        }),
    ))
}

/// GET /top?base=&fleet=
///
/// Best overall scores first, ties broken by review count. Only captains
/// with enough reviews to display a score are ranked.
pub async fn top(
    _access: RequireAccess,
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> AppResult<Json<DataResponse<TopList>>> {
    let base = filter_value(params.base.as_deref());
    let fleet = filter_value(params.fleet.as_deref());
    let min_reviews = state.config.min_display_reviews;

    let captains =
        CaptainRepo::list_filtered(&state.pool, base.as_deref(), fleet.as_deref()).await?;
    let items = with_scores(&state.pool, captains, min_reviews).await?;

    Ok(Json(DataResponse {
        data: TopList {
            base,
            fleet,
            min_reviews,
            captains: rank_top(items, TOP_LIMIT),
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a captain or fail with 404.
pub(crate) async fn find_captain(pool: &DbPool, id: DbId) -> AppResult<Captain> {
    CaptainRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Captain",
            id,
        }))
}

/// Attach review counts and display-gated overall scores to captains.
async fn with_scores(
    pool: &DbPool,
    captains: Vec<Captain>,
    min_display: usize,
) -> AppResult<Vec<CaptainListItem>> {
    let ids: Vec<DbId> = captains.iter().map(|c| c.id).collect();
    let reviews = ReviewRepo::list_for_captains(pool, &ids).await?;
    Ok(score_captains(captains, reviews, min_display))
}

fn score_captains(
    captains: Vec<Captain>,
    mut reviews: HashMap<DbId, Vec<Review>>,
    min_display: usize,
) -> Vec<CaptainListItem> {
    captains
        .into_iter()
        .map(|captain| {
            let scores: Vec<Scores> = reviews
                .remove(&captain.id)
                .unwrap_or_default()
                .iter()
                .map(Review::scores)
                .collect();
            let summary = summarize(&scores, min_display);
            CaptainListItem {
                review_count: summary.count(),
                overall: summary.overall(),
                captain,
            }
        })
        .collect()
}

/// Keep captains with a visible score, best first, then by review count.
fn rank_top(items: Vec<CaptainListItem>, limit: usize) -> Vec<CaptainListItem> {
    let mut ranked: Vec<CaptainListItem> =
        items.into_iter().filter(|item| item.overall.is_some()).collect();
    ranked.sort_by(|a, b| {
        let by_score = b.overall.unwrap_or_default().total_cmp(&a.overall.unwrap_or_default());
        by_score.then_with(|| b.review_count.cmp(&a.review_count))
    });
    ranked.truncate(limit);
    ranked
}

/// Normalize an optional base/fleet filter. Blank means no filter.
fn filter_value(raw: Option<&str>) -> Option<String> {
    raw.map(|v| v.trim().to_uppercase()).filter(|v| !v.is_empty())
}
