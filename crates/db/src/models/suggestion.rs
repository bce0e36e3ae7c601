//! Edit suggestion model and consensus outcomes.

use rmc_core::suggestion::SuggestionStatus;
use rmc_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::assignment::CaptainAssignment;
use crate::models::captain::Captain;

/// A row from the `edit_suggestions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditSuggestion {
    pub id: DbId,
    pub captain_id: DbId,
    pub new_base: String,
    pub new_fleet: String,
    #[sqlx(try_from = "String")]
    pub status: SuggestionStatus,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    #[serde(skip_serializing)]
    pub creator_hash: String,
}

/// DTO for submitting a suggestion. Base and fleet must already be
/// validated.
#[derive(Debug, Clone)]
pub struct CreateSuggestion {
    pub captain_id: DbId,
    pub new_base: String,
    pub new_fleet: String,
    pub creator_hash: String,
}

/// Result of running a submission through the consensus engine.
#[derive(Debug, Clone)]
pub enum SuggestionOutcome {
    /// The creator already has a pending suggestion for this captain.
    DuplicatePending { existing: EditSuggestion },
    /// Recorded as pending; not enough corroboration yet.
    Recorded {
        suggestion: EditSuggestion,
        /// Distinct creators currently backing this exact change.
        supporters: usize,
    },
    /// Consensus reached and the captain was reassigned.
    Approved {
        suggestion: EditSuggestion,
        captain: Captain,
        assignment: CaptainAssignment,
        approved_count: usize,
    },
}
