//! Integration tests for the suggestion consensus engine.

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use rmc_core::suggestion::{ConsensusPolicy, SuggestionStatus};
use rmc_core::types::{DbId, Timestamp};
use rmc_db::models::captain::CreateCaptain;
use rmc_db::models::suggestion::{CreateSuggestion, SuggestionOutcome};
use rmc_db::repositories::{AssignmentRepo, CaptainRepo, SuggestionRepo};
use sqlx::PgPool;

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

async fn seed_captain(pool: &PgPool) -> DbId {
    let input = CreateCaptain {
        name: "John Smith".to_string(),
        base: "ORD".to_string(),
        fleet: "737".to_string(),
    };
    let (captain, _) = CaptainRepo::create_with_assignment(pool, &input, t0())
        .await
        .unwrap();
    captain.id
}

fn proposal(captain_id: DbId, base: &str, fleet: &str, creator: &str) -> CreateSuggestion {
    CreateSuggestion {
        captain_id,
        new_base: base.to_string(),
        new_fleet: fleet.to_string(),
        creator_hash: creator.to_string(),
    }
}

async fn submit(
    pool: &PgPool,
    input: &CreateSuggestion,
    now: Timestamp,
) -> SuggestionOutcome {
    SuggestionRepo::submit(pool, input, &ConsensusPolicy::default(), now)
        .await
        .unwrap()
}

async fn open_assignment_count(pool: &PgPool, captain_id: DbId) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM captain_assignments WHERE captain_id = $1 AND end_date IS NULL",
    )
    .bind(captain_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Consensus
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_single_suggestion_stays_pending(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let now = t0() + Duration::days(1);

    let outcome = submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), now).await;
    let suggestion = assert_matches!(
        outcome,
        SuggestionOutcome::Recorded { suggestion, supporters: 1 } => suggestion
    );
    assert_eq!(suggestion.status, SuggestionStatus::Pending);
    assert!(suggestion.resolved_at.is_none());

    let captain = CaptainRepo::find_by_id(&pool, captain_id).await.unwrap().unwrap();
    assert_eq!((captain.base.as_str(), captain.fleet.as_str()), ("ORD", "737"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_two_distinct_creators_trigger_reassignment(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let first_at = t0() + Duration::days(1);
    let second_at = first_at + Duration::days(3);

    submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), first_at).await;
    let outcome = submit(&pool, &proposal(captain_id, "DEN", "A320", "k2"), second_at).await;

    let (suggestion, captain, assignment, approved_count) = assert_matches!(
        outcome,
        SuggestionOutcome::Approved { suggestion, captain, assignment, approved_count } =>
            (suggestion, captain, assignment, approved_count)
    );
    assert_eq!(approved_count, 2);
    assert_eq!(suggestion.status, SuggestionStatus::Approved);
    assert_eq!(suggestion.resolved_at, Some(second_at));
    assert_eq!(captain.base, "DEN");
    assert_eq!(captain.fleet, "A320");
    assert_eq!(captain.updated_at, second_at);
    assert_eq!(assignment.start_date, second_at);
    assert!(assignment.is_current());

    // Exactly one open assignment, reflecting the new base/fleet.
    assert_eq!(open_assignment_count(&pool, captain_id).await, 1);
    let current = AssignmentRepo::find_current(&pool, captain_id).await.unwrap().unwrap();
    assert_eq!((current.base.as_str(), current.fleet.as_str()), ("DEN", "A320"));

    let history = AssignmentRepo::list_for_captain(&pool, captain_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].base, "ORD");
    assert_eq!(history[1].end_date, Some(second_at));

    assert!(SuggestionRepo::list_pending_for_captain(&pool, captain_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_creator_resubmission_is_duplicate(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let now = t0() + Duration::days(1);

    submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), now).await;
    let outcome = submit(
        &pool,
        &proposal(captain_id, "DEN", "A320", "k1"),
        now + Duration::hours(1),
    )
    .await;
    assert_matches!(outcome, SuggestionOutcome::DuplicatePending { .. });

    // Any proposed values count as a duplicate.
    let outcome = submit(
        &pool,
        &proposal(captain_id, "SFO", "777", "k1"),
        now + Duration::hours(2),
    )
    .await;
    assert_matches!(outcome, SuggestionOutcome::DuplicatePending { existing } if existing.new_base == "DEN");

    let captain = CaptainRepo::find_by_id(&pool, captain_id).await.unwrap().unwrap();
    assert_eq!(captain.base, "ORD");
    assert_eq!(
        SuggestionRepo::count_pending_for_captain(&pool, captain_id)
            .await
            .unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_corroboration_outside_window_does_not_count(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let first_at = t0() + Duration::days(1);
    let second_at = first_at + Duration::days(15);

    submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), first_at).await;
    let outcome = submit(&pool, &proposal(captain_id, "DEN", "A320", "k2"), second_at).await;

    assert_matches!(outcome, SuggestionOutcome::Recorded { supporters: 1, .. });
    let captain = CaptainRepo::find_by_id(&pool, captain_id).await.unwrap().unwrap();
    assert_eq!(captain.base, "ORD");
    assert_eq!(open_assignment_count(&pool, captain_id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_different_proposals_do_not_combine(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let now = t0() + Duration::days(1);

    submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), now).await;
    let outcome = submit(&pool, &proposal(captain_id, "DEN", "A321", "k2"), now).await;
    assert_matches!(outcome, SuggestionOutcome::Recorded { supporters: 1, .. });

    let outcome = submit(&pool, &proposal(captain_id, "DEN", "A321", "k3"), now).await;
    assert_matches!(outcome, SuggestionOutcome::Approved { approved_count: 2, .. });

    // The unrelated DEN/A320 proposal stays pending.
    let pending = SuggestionRepo::list_pending_for_captain(&pool, captain_id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].new_fleet, "A320");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_higher_threshold_needs_more_creators(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let policy = ConsensusPolicy::from_days(14, 3, 60).unwrap();
    let now = t0() + Duration::days(1);

    for creator in ["k1", "k2"] {
        let outcome = SuggestionRepo::submit(
            &pool,
            &proposal(captain_id, "LAX", "787", creator),
            &policy,
            now,
        )
        .await
        .unwrap();
        assert_matches!(outcome, SuggestionOutcome::Recorded { .. });
    }

    let outcome = SuggestionRepo::submit(
        &pool,
        &proposal(captain_id, "LAX", "787", "k3"),
        &policy,
        now,
    )
    .await
    .unwrap();
    assert_matches!(outcome, SuggestionOutcome::Approved { approved_count: 3, .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_captain_is_row_not_found(pool: PgPool) {
    let err = SuggestionRepo::submit(
        &pool,
        &proposal(999_999, "DEN", "A320", "k1"),
        &ConsensusPolicy::default(),
        t0(),
    )
    .await
    .unwrap_err();
    assert_matches!(err, sqlx::Error::RowNotFound);
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_pending_suggestion_expires_on_next_submission(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let first_at = t0() + Duration::days(1);
    let first = submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), first_at).await;
    let first_id = assert_matches!(first, SuggestionOutcome::Recorded { suggestion, .. } => suggestion.id);

    // After the expiry window the same creator may suggest again.
    let later = first_at + Duration::days(61);
    let outcome = submit(&pool, &proposal(captain_id, "SFO", "777", "k1"), later).await;
    assert_matches!(outcome, SuggestionOutcome::Recorded { .. });

    let expired = SuggestionRepo::find_by_id(&pool, first_id).await.unwrap().unwrap();
    assert_eq!(expired.status, SuggestionStatus::Expired);
    assert_eq!(expired.resolved_at, Some(later));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expire_stale_only_touches_old_pending_rows(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), t0()).await;
    submit(
        &pool,
        &proposal(captain_id, "DEN", "A321", "k2"),
        t0() + Duration::days(30),
    )
    .await;

    let now = t0() + Duration::days(61);
    let policy = ConsensusPolicy::default();
    let swept = SuggestionRepo::expire_stale(&pool, captain_id, policy.expiry_cutoff(now), now)
        .await
        .unwrap();
    assert_eq!(swept, 1);

    let pending = SuggestionRepo::list_pending_for_captain(&pool, captain_id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].creator_hash, "k2");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_corroborations_apply_once(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let now = t0() + Duration::days(1);
    submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), now).await;

    let policy = ConsensusPolicy::default();
    let second = proposal(captain_id, "DEN", "A320", "k2");
    let third = proposal(captain_id, "DEN", "A320", "k3");
    let (a, b) = tokio::join!(
        SuggestionRepo::submit(&pool, &second, &policy, now),
        SuggestionRepo::submit(&pool, &third, &policy, now),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let approvals = outcomes
        .iter()
        .filter(|o| matches!(o, SuggestionOutcome::Approved { .. }))
        .count();
    assert_eq!(approvals, 1, "consensus must be applied exactly once");
    assert_eq!(open_assignment_count(&pool, captain_id).await, 1);

    let history = AssignmentRepo::list_for_captain(&pool, captain_id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejected_suggestion_is_final(pool: PgPool) {
    let captain_id = seed_captain(&pool).await;
    let first_at = t0() + Duration::days(1);
    let first = submit(&pool, &proposal(captain_id, "DEN", "A320", "k1"), first_at).await;
    let first_id = assert_matches!(first, SuggestionOutcome::Recorded { suggestion, .. } => suggestion.id);

    // Moderation is the only way into `rejected`.
    sqlx::query("UPDATE edit_suggestions SET status = 'rejected', resolved_at = $2 WHERE id = $1")
        .bind(first_id)
        .bind(first_at)
        .execute(&pool)
        .await
        .unwrap();

    let outcome = submit(
        &pool,
        &proposal(captain_id, "DEN", "A320", "k2"),
        first_at + Duration::hours(1),
    )
    .await;
    assert_matches!(outcome, SuggestionOutcome::Recorded { supporters: 1, .. });

    let policy = ConsensusPolicy::default();
    let later = first_at + Duration::days(90);
    SuggestionRepo::expire_stale(&pool, captain_id, policy.expiry_cutoff(later), later)
        .await
        .unwrap();

    let rejected = SuggestionRepo::find_by_id(&pool, first_id).await.unwrap().unwrap();
    assert_eq!(rejected.status, SuggestionStatus::Rejected);
    assert_eq!(rejected.resolved_at, Some(first_at));

    let captain = CaptainRepo::find_by_id(&pool, captain_id).await.unwrap().unwrap();
    assert_eq!(captain.base, "ORD");
}
