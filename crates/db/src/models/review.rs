//! Captain review model.

use rmc_core::rating::Scores;
use rmc_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reviews` table.
///
/// The reviewer hash is kept for cooldown checks only and is never
/// serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub captain_id: DbId,
    pub created_at: Timestamp,
    #[serde(skip_serializing)]
    pub reviewer_hash: Option<String>,
    pub crm_inclusion: i16,
    pub communication: i16,
    pub easy_to_fly: i16,
    pub micromanage: i16,
    pub workload_share: i16,
    pub helps_box: i16,
    pub helps_walk: i16,
    pub skill_sop: i16,
    pub temperament: i16,
    pub respectfulness: i16,
    pub boundaries: i16,
    pub cabin_respect: i16,
    pub would_fly_again: i16,
    pub chattiness: i16,
    pub mentorship: i16,
    pub humor_vibe: i16,
}

impl Review {
    /// The sixteen raw sub-scores.
    pub fn scores(&self) -> Scores {
        Scores {
            crm_inclusion: self.crm_inclusion,
            communication: self.communication,
            easy_to_fly: self.easy_to_fly,
            micromanage: self.micromanage,
            workload_share: self.workload_share,
            helps_box: self.helps_box,
            helps_walk: self.helps_walk,
            skill_sop: self.skill_sop,
            temperament: self.temperament,
            respectfulness: self.respectfulness,
            boundaries: self.boundaries,
            cabin_respect: self.cabin_respect,
            would_fly_again: self.would_fly_again,
            chattiness: self.chattiness,
            mentorship: self.mentorship,
            humor_vibe: self.humor_vibe,
        }
    }
}

/// DTO for inserting a review. Scores must already be range-checked.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub captain_id: DbId,
    pub reviewer_hash: Option<String>,
    pub scores: Scores,
}

/// Result of a review submission.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    Created(Review),
    /// The same reviewer already rated this captain inside the cooldown.
    CoolingDown { last_reviewed_at: Timestamp },
}
