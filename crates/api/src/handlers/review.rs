//! Handlers for submitting captain reviews.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use rmc_core::error::CoreError;
use rmc_core::rating::{overall_for_review, round2, Scores};
use rmc_core::types::DbId;
use rmc_db::models::captain::Captain;
use rmc_db::models::review::{CreateReview, Review, ReviewOutcome};
use rmc_db::repositories::ReviewRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::captain::find_captain;
use crate::handlers::options::RatingScale;
use crate::identity::ReviewerIdentity;
use crate::middleware::access::RequireAccess;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReviewForm {
    pub captain: Captain,
    pub rating: RatingScale,
}

#[derive(Debug, Serialize)]
pub struct CreatedReview {
    pub review: Review,
    /// This review's own overall score, rounded to two decimals.
    pub overall: f64,
}

/// GET /review/new/{id}
pub async fn new_form(
    _access: RequireAccess,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReviewForm>>> {
    let captain = find_captain(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ReviewForm {
            captain,
            rating: RatingScale::standard(),
        },
    }))
}

/// POST /review/new/{id}
///
/// Sub-scores left out of the body count as neutral (3). A reviewer may rate
/// the same captain again only after the cooldown, otherwise 409.
pub async fn create(
    _access: RequireAccess,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    reviewer: ReviewerIdentity,
    Json(scores): Json<Scores>,
) -> AppResult<(StatusCode, CookieJar, Json<MessageResponse<CreatedReview>>)> {
    scores.check()?;

    let now = Utc::now();
    let cooldown = state.config.review_cooldown;
    let input = CreateReview {
        captain_id: id,
        reviewer_hash: Some(reviewer.hash),
        scores,
    };

    let outcome =
        match ReviewRepo::create_unless_recent(&state.pool, &input, now - cooldown, now).await {
            Err(sqlx::Error::RowNotFound) => {
                return Err(AppError::Core(CoreError::NotFound {
                    entity: "Captain",
                    id,
                }))
            }
            other => other?,
        };

    match outcome {
        ReviewOutcome::Created(review) => {
            tracing::info!(
                captain_id = id,
                review_id = review.id,
                new_reviewer = reviewer.minted,
                "Review submitted",
            );
            let overall = round2(overall_for_review(&review.scores()));
            Ok((
                StatusCode::CREATED,
                reviewer.jar,
                Json(MessageResponse {
                    data: CreatedReview { review, overall },
                    message: "Thanks! Your review was recorded anonymously.".to_string(),
                }),
            ))
        }
        ReviewOutcome::CoolingDown { last_reviewed_at } => {
            let retry_at = last_reviewed_at + cooldown;
            tracing::info!(captain_id = id, %retry_at, "Review rejected: cooldown active");
            Err(AppError::Core(CoreError::Conflict(format!(
                "You've already reviewed this captain recently. Try again after {}.",
                retry_at.format("%Y-%m-%d %H:%M UTC")
            ))))
        }
    }
}
