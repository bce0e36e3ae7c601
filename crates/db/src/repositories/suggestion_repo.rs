//! Repository for the `edit_suggestions` table and the consensus engine.

use rmc_core::suggestion::{ConsensusPolicy, SuggestionStatus};
use rmc_core::types::{DbId, Timestamp};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;

use crate::models::suggestion::{CreateSuggestion, EditSuggestion, SuggestionOutcome};
use crate::repositories::{AssignmentRepo, CaptainRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, captain_id, new_base, new_fleet, status, created_at, resolved_at, creator_hash";

/// Provides suggestion reads, the lazy expiry sweep, and consensus
/// submission.
pub struct SuggestionRepo;

impl SuggestionRepo {
    /// Pending suggestions for a captain, newest first.
    pub async fn list_pending_for_captain(
        pool: &PgPool,
        captain_id: DbId,
    ) -> Result<Vec<EditSuggestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edit_suggestions
             WHERE captain_id = $1 AND status = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, EditSuggestion>(&query)
            .bind(captain_id)
            .bind(SuggestionStatus::Pending.as_str())
            .fetch_all(pool)
            .await
    }

    /// Number of pending suggestions for a captain.
    pub async fn count_pending_for_captain(
        pool: &PgPool,
        captain_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM edit_suggestions WHERE captain_id = $1 AND status = $2",
        )
        .bind(captain_id)
        .bind(SuggestionStatus::Pending.as_str())
        .fetch_one(pool)
        .await
    }

    /// Find a suggestion by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EditSuggestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM edit_suggestions WHERE id = $1");
        sqlx::query_as::<_, EditSuggestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a captain's pending suggestions created before `cutoff` as
    /// expired. Returns the number of rows swept.
    pub async fn expire_stale<'e, E>(
        executor: E,
        captain_id: DbId,
        cutoff: Timestamp,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE edit_suggestions SET status = $4, resolved_at = $3
             WHERE captain_id = $1 AND status = $5 AND created_at < $2",
        )
        .bind(captain_id)
        .bind(cutoff)
        .bind(now)
        .bind(SuggestionStatus::Expired.as_str())
        .bind(SuggestionStatus::Pending.as_str())
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Submit a suggestion and apply it if it completes a consensus.
    ///
    /// Everything happens in one transaction holding the captain's row lock:
    ///
    /// 1. Sweep this captain's stale pending suggestions to `expired`.
    /// 2. Refuse if the creator already has a pending suggestion here.
    /// 3. Insert the new suggestion as pending.
    /// 4. Collect pending suggestions with the exact same base and fleet
    ///    created inside the consensus window.
    /// 5. If their distinct creators meet the threshold, approve them all,
    ///    close the open assignment, open a new one and update the captain.
    ///
    /// Returns `sqlx::Error::RowNotFound` if the captain does not exist.
    pub async fn submit(
        pool: &PgPool,
        input: &CreateSuggestion,
        policy: &ConsensusPolicy,
        now: Timestamp,
    ) -> Result<SuggestionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        CaptainRepo::lock_for_update(&mut *tx, input.captain_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let expired =
            Self::expire_stale(&mut *tx, input.captain_id, policy.expiry_cutoff(now), now).await?;
        if expired > 0 {
            tracing::info!(
                captain_id = input.captain_id,
                expired,
                "Expired stale edit suggestions",
            );
        }

        let query = format!(
            "SELECT {COLUMNS} FROM edit_suggestions
             WHERE captain_id = $1 AND creator_hash = $2 AND status = $3
             LIMIT 1"
        );
        let existing = sqlx::query_as::<_, EditSuggestion>(&query)
            .bind(input.captain_id)
            .bind(&input.creator_hash)
            .bind(SuggestionStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(existing) = existing {
            // Keep the expiry sweep even though nothing else changes.
            tx.commit().await?;
            return Ok(SuggestionOutcome::DuplicatePending { existing });
        }

        let query = format!(
            "INSERT INTO edit_suggestions (captain_id, new_base, new_fleet, status, created_at, creator_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let suggestion = sqlx::query_as::<_, EditSuggestion>(&query)
            .bind(input.captain_id)
            .bind(&input.new_base)
            .bind(&input.new_fleet)
            .bind(SuggestionStatus::Pending.as_str())
            .bind(now)
            .bind(&input.creator_hash)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM edit_suggestions
             WHERE captain_id = $1 AND new_base = $2 AND new_fleet = $3
               AND status = $4 AND created_at >= $5
             ORDER BY created_at ASC, id ASC"
        );
        let matches = sqlx::query_as::<_, EditSuggestion>(&query)
            .bind(input.captain_id)
            .bind(&input.new_base)
            .bind(&input.new_fleet)
            .bind(SuggestionStatus::Pending.as_str())
            .bind(policy.window_start(now))
            .fetch_all(&mut *tx)
            .await?;

        let creators = matches.iter().map(|m| m.creator_hash.as_str());
        if !policy.reaches_consensus(creators.clone()) {
            let supporters = rmc_core::suggestion::distinct_creators(creators);
            tx.commit().await?;
            return Ok(SuggestionOutcome::Recorded {
                suggestion,
                supporters,
            });
        }

        // Consensus: approve every corroborating suggestion and reassign.
        for m in &matches {
            m.status
                .transition(SuggestionStatus::Approved)
                .map_err(|e| sqlx::Error::Protocol(format!("suggestion {}: {e}", m.id)))?;
        }
        let ids: Vec<DbId> = matches.iter().map(|m| m.id).collect();
        let query = format!(
            "UPDATE edit_suggestions SET status = $2, resolved_at = $3
             WHERE id = ANY($1) AND status = $4
             RETURNING {COLUMNS}"
        );
        let approved = sqlx::query_as::<_, EditSuggestion>(&query)
            .bind(&ids)
            .bind(SuggestionStatus::Approved.as_str())
            .bind(now)
            .bind(SuggestionStatus::Pending.as_str())
            .fetch_all(&mut *tx)
            .await?;

        AssignmentRepo::close_current(&mut *tx, input.captain_id, now).await?;
        let assignment = AssignmentRepo::open(
            &mut *tx,
            input.captain_id,
            &input.new_base,
            &input.new_fleet,
            now,
        )
        .await?;
        let captain = CaptainRepo::apply_assignment(
            &mut *tx,
            input.captain_id,
            &input.new_base,
            &input.new_fleet,
            now,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            captain_id = captain.id,
            base = %captain.base,
            fleet = %captain.fleet,
            approved = approved.len(),
            "Edit suggestion consensus reached, captain reassigned",
        );

        let suggestion = approved
            .iter()
            .find(|s| s.id == suggestion.id)
            .cloned()
            .unwrap_or(suggestion);

        Ok(SuggestionOutcome::Approved {
            suggestion,
            captain,
            assignment,
            approved_count: approved.len(),
        })
    }
}
