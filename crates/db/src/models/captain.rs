//! Captain profile model.

use rmc_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `captains` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Captain {
    pub id: DbId,
    pub employee_id: String,
    pub name: String,
    pub base: String,
    pub fleet: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a captain.
///
/// Handlers normalize the name and validate base/fleet before this reaches
/// the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCaptain {
    pub name: String,
    pub base: String,
    pub fleet: String,
}
