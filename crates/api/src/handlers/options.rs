//! Static form metadata: allowed bases/fleets and the rating categories.

use axum::Json;
use rmc_core::rating::{RatingCategory, CATEGORIES, MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};
use rmc_core::roster::{ALLOWED_BASES, ALLOWED_FLEETS};
use serde::Serialize;

use crate::middleware::access::RequireAccess;
use crate::response::DataResponse;

/// Values a captain's base and fleet may take.
#[derive(Debug, Serialize)]
pub struct RosterOptions {
    pub bases: &'static [&'static str],
    pub fleets: &'static [&'static str],
}

impl RosterOptions {
    pub fn allowed() -> Self {
        Self {
            bases: ALLOWED_BASES,
            fleets: ALLOWED_FLEETS,
        }
    }
}

/// The rating scale and its categories in form order.
#[derive(Debug, Serialize)]
pub struct RatingScale {
    pub min_score: i16,
    pub max_score: i16,
    /// Value assumed for any sub-score left out of a submission.
    pub default_score: i16,
    pub categories: &'static [RatingCategory],
}

impl RatingScale {
    pub fn standard() -> Self {
        Self {
            min_score: MIN_SCORE,
            max_score: MAX_SCORE,
            default_score: NEUTRAL_SCORE,
            categories: &CATEGORIES,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Options {
    #[serde(flatten)]
    pub roster: RosterOptions,
    pub rating: RatingScale,
}

/// GET /options
pub async fn list() -> Json<DataResponse<Options>> {
    Json(DataResponse {
        data: Options {
            roster: RosterOptions::allowed(),
            rating: RatingScale::standard(),
        },
    })
}

/// GET /captain/new
pub async fn roster(_access: RequireAccess) -> Json<DataResponse<RosterOptions>> {
    Json(DataResponse {
        data: RosterOptions::allowed(),
    })
}
