//! Repository for the `captain_assignments` ledger.
//!
//! The ledger is append-only: rows are inserted when a captain is created or
//! reassigned, and the only update ever made is closing the open row.

use rmc_core::types::{DbId, Timestamp};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;

use crate::models::assignment::CaptainAssignment;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, captain_id, base, fleet, start_date, end_date, changed_at";

/// Provides reads and the two ledger writes for captain assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Full history for a captain, newest first.
    pub async fn list_for_captain(
        pool: &PgPool,
        captain_id: DbId,
    ) -> Result<Vec<CaptainAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captain_assignments
             WHERE captain_id = $1
             ORDER BY start_date DESC, id DESC"
        );
        sqlx::query_as::<_, CaptainAssignment>(&query)
            .bind(captain_id)
            .fetch_all(pool)
            .await
    }

    /// The open assignment for a captain, if any.
    pub async fn find_current(
        pool: &PgPool,
        captain_id: DbId,
    ) -> Result<Option<CaptainAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captain_assignments
             WHERE captain_id = $1 AND end_date IS NULL"
        );
        sqlx::query_as::<_, CaptainAssignment>(&query)
            .bind(captain_id)
            .fetch_optional(pool)
            .await
    }

    /// Open a new assignment starting at `now`.
    ///
    /// Fails with a `uq_captain_assignments_open` violation if the captain
    /// still has an open row; callers close it first in the same
    /// transaction.
    pub async fn open<'e, E>(
        executor: E,
        captain_id: DbId,
        base: &str,
        fleet: &str,
        now: Timestamp,
    ) -> Result<CaptainAssignment, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO captain_assignments (captain_id, base, fleet, start_date, changed_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CaptainAssignment>(&query)
            .bind(captain_id)
            .bind(base)
            .bind(fleet)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Close the captain's open assignment at `now`, returning it.
    pub async fn close_current<'e, E>(
        executor: E,
        captain_id: DbId,
        now: Timestamp,
    ) -> Result<Option<CaptainAssignment>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE captain_assignments SET end_date = $2, changed_at = $2
             WHERE captain_id = $1 AND end_date IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CaptainAssignment>(&query)
            .bind(captain_id)
            .bind(now)
            .fetch_optional(executor)
            .await
    }
}
