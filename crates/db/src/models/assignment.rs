//! Captain assignment ledger model.

use rmc_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `captain_assignments` table.
///
/// `end_date` is `None` while the assignment is current.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CaptainAssignment {
    pub id: DbId,
    pub captain_id: DbId,
    pub base: String,
    pub fleet: String,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub changed_at: Timestamp,
}

impl CaptainAssignment {
    pub fn is_current(&self) -> bool {
        self.end_date.is_none()
    }
}
