//! Repository for the `reviews` table.

use std::collections::HashMap;

use rmc_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review, ReviewOutcome};
use crate::repositories::CaptainRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, captain_id, created_at, reviewer_hash, \
    crm_inclusion, communication, easy_to_fly, micromanage, workload_share, \
    helps_box, helps_walk, skill_sop, temperament, respectfulness, boundaries, \
    cabin_respect, would_fly_again, chattiness, mentorship, humor_vibe";

/// Provides inserts and reads for reviews. Reviews are never updated.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review unless the same reviewer rated this captain at or
    /// after `cooldown_start`.
    ///
    /// Runs under the captain's row lock so two concurrent submissions from
    /// one reviewer cannot both pass the cooldown check. Returns
    /// `sqlx::Error::RowNotFound` if the captain does not exist.
    pub async fn create_unless_recent(
        pool: &PgPool,
        input: &CreateReview,
        cooldown_start: Timestamp,
        now: Timestamp,
    ) -> Result<ReviewOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        CaptainRepo::lock_for_update(&mut *tx, input.captain_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        if let Some(reviewer_hash) = &input.reviewer_hash {
            let last: Option<Timestamp> = sqlx::query_scalar(
                "SELECT MAX(created_at) FROM reviews
                 WHERE captain_id = $1 AND reviewer_hash = $2 AND created_at >= $3",
            )
            .bind(input.captain_id)
            .bind(reviewer_hash)
            .bind(cooldown_start)
            .fetch_one(&mut *tx)
            .await?;

            if let Some(last_reviewed_at) = last {
                tx.rollback().await?;
                return Ok(ReviewOutcome::CoolingDown { last_reviewed_at });
            }
        }

        let s = &input.scores;
        let query = format!(
            "INSERT INTO reviews (captain_id, created_at, reviewer_hash,
                crm_inclusion, communication, easy_to_fly, micromanage, workload_share,
                helps_box, helps_walk, skill_sop, temperament, respectfulness, boundaries,
                cabin_respect, would_fly_again, chattiness, mentorship, humor_vibe)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19)
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(input.captain_id)
            .bind(now)
            .bind(&input.reviewer_hash)
            .bind(s.crm_inclusion)
            .bind(s.communication)
            .bind(s.easy_to_fly)
            .bind(s.micromanage)
            .bind(s.workload_share)
            .bind(s.helps_box)
            .bind(s.helps_walk)
            .bind(s.skill_sop)
            .bind(s.temperament)
            .bind(s.respectfulness)
            .bind(s.boundaries)
            .bind(s.cabin_respect)
            .bind(s.would_fly_again)
            .bind(s.chattiness)
            .bind(s.mentorship)
            .bind(s.humor_vibe)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ReviewOutcome::Created(review))
    }

    /// All reviews for one captain, oldest first.
    pub async fn list_for_captain(
        pool: &PgPool,
        captain_id: DbId,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews WHERE captain_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(captain_id)
            .fetch_all(pool)
            .await
    }

    /// Reviews for many captains in one query, grouped by captain ID.
    ///
    /// Captains without reviews are absent from the map.
    pub async fn list_for_captains(
        pool: &PgPool,
        captain_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<Review>>, sqlx::Error> {
        if captain_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = format!(
            "SELECT {COLUMNS} FROM reviews WHERE captain_id = ANY($1) ORDER BY created_at ASC, id ASC"
        );
        let reviews = sqlx::query_as::<_, Review>(&query)
            .bind(captain_ids)
            .fetch_all(pool)
            .await?;

        let mut grouped: HashMap<DbId, Vec<Review>> = HashMap::new();
        for review in reviews {
            grouped.entry(review.captain_id).or_default().push(review);
        }
        Ok(grouped)
    }
}
