//! Handlers for base/fleet edit suggestions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use rmc_core::error::CoreError;
use rmc_core::roster::{validate_base, validate_fleet};
use rmc_core::types::DbId;
use rmc_db::models::assignment::CaptainAssignment;
use rmc_db::models::captain::Captain;
use rmc_db::models::suggestion::{CreateSuggestion, EditSuggestion, SuggestionOutcome};
use rmc_db::repositories::SuggestionRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::captain::find_captain;
use crate::handlers::options::RosterOptions;
use crate::identity::ReviewerIdentity;
use crate::middleware::access::RequireAccess;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /captain/{id}/suggest`.
#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub base: String,
    pub fleet: String,
}

/// How a change gets applied.
#[derive(Debug, Serialize)]
pub struct ConsensusRules {
    pub window_days: i64,
    pub threshold: usize,
    pub expire_days: i64,
}

#[derive(Debug, Serialize)]
pub struct SuggestForm {
    pub captain: Captain,
    #[serde(flatten)]
    pub roster: RosterOptions,
    pub rules: ConsensusRules,
    /// Pending suggestions, newest first.
    pub pending: Vec<EditSuggestion>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SuggestResult {
    Recorded {
        suggestion: EditSuggestion,
        supporters: usize,
        threshold: usize,
    },
    Approved {
        suggestion: EditSuggestion,
        captain: Captain,
        assignment: CaptainAssignment,
        approved_count: usize,
    },
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /captain/{id}/suggest
///
/// Expires stale pending suggestions before listing the rest.
pub async fn form(
    _access: RequireAccess,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuggestForm>>> {
    let captain = find_captain(&state.pool, id).await?;
    let policy = state.config.consensus;

    let now = Utc::now();
    let expired = SuggestionRepo::expire_stale(&state.pool, id, policy.expiry_cutoff(now), now)
        .await?;
    if expired > 0 {
        tracing::info!(captain_id = id, expired, "Expired stale edit suggestions");
    }

    let pending = SuggestionRepo::list_pending_for_captain(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: SuggestForm {
            captain,
            roster: RosterOptions::allowed(),
            rules: ConsensusRules {
                window_days: policy.window.num_days(),
                threshold: policy.threshold,
                expire_days: policy.expiry.num_days(),
            },
            pending,
        },
    }))
}

/// POST /captain/{id}/suggest
///
/// Records the suggestion and applies it once enough distinct reviewers
/// agree. 409 if this reviewer already has a pending suggestion here.
pub async fn create(
    _access: RequireAccess,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    reviewer: ReviewerIdentity,
    Json(input): Json<SuggestRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<MessageResponse<SuggestResult>>)> {
    let new_base = validate_base(&input.base)?;
    let new_fleet = validate_fleet(&input.fleet)?;
    let policy = state.config.consensus;

    let submission = CreateSuggestion {
        captain_id: id,
        new_base,
        new_fleet,
        creator_hash: reviewer.hash,
    };

    let outcome = match SuggestionRepo::submit(&state.pool, &submission, &policy, Utc::now()).await
    {
        Err(sqlx::Error::RowNotFound) => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Captain",
                id,
            }))
        }
        other => other?,
    };

    let (result, message) = match outcome {
        SuggestionOutcome::DuplicatePending { existing } => {
            tracing::info!(
                captain_id = id,
                suggestion_id = existing.id,
                "Suggestion rejected: creator already has one pending",
            );
            return Err(AppError::Core(CoreError::Conflict(
                "You already have a pending suggestion for this captain.".into(),
            )));
        }
        SuggestionOutcome::Recorded {
            suggestion,
            supporters,
        } => {
            tracing::info!(
                captain_id = id,
                suggestion_id = suggestion.id,
                supporters,
                new_reviewer = reviewer.minted,
                "Suggestion recorded",
            );
            let message = format!(
                "Suggestion recorded. When {} FOs suggest the same change within {} days, \
                 it auto-applies.",
                policy.threshold,
                policy.window.num_days()
            );
            (
                SuggestResult::Recorded {
                    suggestion,
                    supporters,
                    threshold: policy.threshold,
                },
                message,
            )
        }
        SuggestionOutcome::Approved {
            suggestion,
            captain,
            assignment,
            approved_count,
        } => {
            let message = format!(
                "Consensus reached: Updated to {} / {}.",
                captain.base, captain.fleet
            );
            (
                SuggestResult::Approved {
                    suggestion,
                    captain,
                    assignment,
                    approved_count,
                },
                message,
            )
        }
    };

    Ok((
        StatusCode::CREATED,
        reviewer.jar,
        Json(MessageResponse {
            data: result,
            message,
        }),
    ))
}
