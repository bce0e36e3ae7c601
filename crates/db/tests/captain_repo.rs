//! Integration tests for captain creation, lookup and search.

use chrono::{TimeZone, Utc};
use rmc_core::types::Timestamp;
use rmc_db::models::captain::CreateCaptain;
use rmc_db::repositories::{AssignmentRepo, CaptainRepo};
use sqlx::PgPool;

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

fn input(name: &str, base: &str, fleet: &str) -> CreateCaptain {
    CreateCaptain {
        name: name.to_string(),
        base: base.to_string(),
        fleet: fleet.to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bootstrap_health_check(pool: PgPool) {
    rmc_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_opens_initial_assignment(pool: PgPool) {
    let (captain, assignment) =
        CaptainRepo::create_with_assignment(&pool, &input("John Smith", "ORD", "737"), t0())
            .await
            .unwrap();

    assert!(captain.employee_id.starts_with("CA-"));
    assert_eq!(captain.updated_at, t0());
    assert_eq!(assignment.captain_id, captain.id);
    assert_eq!(assignment.base, "ORD");
    assert_eq!(assignment.fleet, "737");
    assert_eq!(assignment.start_date, t0());
    assert!(assignment.is_current());

    let current = AssignmentRepo::find_current(&pool, captain.id)
        .await
        .unwrap()
        .expect("open assignment");
    assert_eq!(current.id, assignment.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_by_identity_ignores_name_case(pool: PgPool) {
    let (captain, _) =
        CaptainRepo::create_with_assignment(&pool, &input("Alex Chen", "IAH", "787"), t0())
            .await
            .unwrap();

    let found = CaptainRepo::find_by_identity(&pool, "alex chen", "IAH", "787")
        .await
        .unwrap();
    assert_eq!(found.map(|c| c.id), Some(captain.id));

    let other_fleet = CaptainRepo::find_by_identity(&pool, "Alex Chen", "IAH", "777")
        .await
        .unwrap();
    assert!(other_fleet.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_base_rejected_by_schema(pool: PgPool) {
    let result =
        CaptainRepo::create_with_assignment(&pool, &input("Nope", "JFK", "737"), t0()).await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_matches_name_base_and_fleet(pool: PgPool) {
    for (name, base, fleet) in [
        ("Maria Lopez", "DEN", "A320"),
        ("John Smith", "ORD", "737"),
        ("Alex Chen", "IAH", "787"),
    ] {
        CaptainRepo::create_with_assignment(&pool, &input(name, base, fleet), t0())
            .await
            .unwrap();
    }

    let all = CaptainRepo::search(&pool, None).await.unwrap();
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Alex Chen", "John Smith", "Maria Lopez"]);

    let by_name = CaptainRepo::search(&pool, Some("smi")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "John Smith");

    let by_base = CaptainRepo::search(&pool, Some("den")).await.unwrap();
    assert_eq!(by_base[0].name, "Maria Lopez");

    let by_fleet = CaptainRepo::search(&pool, Some("78")).await.unwrap();
    assert_eq!(by_fleet[0].name, "Alex Chen");

    let blank = CaptainRepo::search(&pool, Some("   ")).await.unwrap();
    assert_eq!(blank.len(), 3);

    let wildcard = CaptainRepo::search(&pool, Some("%")).await.unwrap();
    assert!(wildcard.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filtered_by_base_and_fleet(pool: PgPool) {
    for (name, base, fleet) in [
        ("A One", "ORD", "737"),
        ("B Two", "ORD", "787"),
        ("C Three", "SFO", "737"),
    ] {
        CaptainRepo::create_with_assignment(&pool, &input(name, base, fleet), t0())
            .await
            .unwrap();
    }

    assert_eq!(CaptainRepo::list_filtered(&pool, None, None).await.unwrap().len(), 3);
    assert_eq!(
        CaptainRepo::list_filtered(&pool, Some("ORD"), None).await.unwrap().len(),
        2
    );
    let ord_737 = CaptainRepo::list_filtered(&pool, Some("ORD"), Some("737"))
        .await
        .unwrap();
    assert_eq!(ord_737.len(), 1);
    assert_eq!(ord_737[0].name, "A One");

    let names = CaptainRepo::list_names(&pool).await.unwrap();
    assert_eq!(names, ["A One", "B Two", "C Three"]);
}
