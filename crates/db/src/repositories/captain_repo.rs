//! Repository for the `captains` table.

use rmc_core::roster::generate_employee_id;
use rmc_core::types::{DbId, Timestamp};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;

use crate::models::assignment::CaptainAssignment;
use crate::models::captain::{Captain, CreateCaptain};
use crate::repositories::AssignmentRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, employee_id, name, base, fleet, created_at, updated_at";

/// Provides lookup, search and creation for captains.
///
/// Base/fleet changes go through [`crate::repositories::SuggestionRepo`]
/// only.
pub struct CaptainRepo;

impl CaptainRepo {
    /// Find a captain by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Captain>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM captains WHERE id = $1");
        sqlx::query_as::<_, Captain>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a captain by case-insensitive name plus exact base and fleet.
    pub async fn find_by_identity(
        pool: &PgPool,
        name: &str,
        base: &str,
        fleet: &str,
    ) -> Result<Option<Captain>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captains
             WHERE LOWER(name) = LOWER($1) AND base = $2 AND fleet = $3
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Captain>(&query)
            .bind(name)
            .bind(base)
            .bind(fleet)
            .fetch_optional(pool)
            .await
    }

    /// Insert a captain together with its first open assignment.
    ///
    /// Both rows share the `now` timestamp and are written in one
    /// transaction.
    pub async fn create_with_assignment(
        pool: &PgPool,
        input: &CreateCaptain,
        now: Timestamp,
    ) -> Result<(Captain, CaptainAssignment), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO captains (employee_id, name, base, fleet, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {COLUMNS}"
        );
        let captain = sqlx::query_as::<_, Captain>(&query)
            .bind(generate_employee_id())
            .bind(&input.name)
            .bind(&input.base)
            .bind(&input.fleet)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let assignment =
            AssignmentRepo::open(&mut *tx, captain.id, &captain.base, &captain.fleet, now).await?;

        tx.commit().await?;
        Ok((captain, assignment))
    }

    /// Search captains by name, base or fleet (case-insensitive substring).
    ///
    /// An empty or missing term lists every captain. Ordered by name.
    pub async fn search(pool: &PgPool, term: Option<&str>) -> Result<Vec<Captain>, sqlx::Error> {
        let pattern = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", escape_like(t)));

        let query = format!(
            "SELECT {COLUMNS} FROM captains
             WHERE $1::TEXT IS NULL
                OR name ILIKE $1 ESCAPE '\\'
                OR base ILIKE $1 ESCAPE '\\'
                OR fleet ILIKE $1 ESCAPE '\\'
             ORDER BY name ASC, id ASC"
        );
        sqlx::query_as::<_, Captain>(&query)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    /// All captain names, ordered, for client-side autocomplete.
    pub async fn list_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT name FROM captains ORDER BY name ASC, id ASC")
            .fetch_all(pool)
            .await
    }

    /// List captains, optionally restricted to a base and/or fleet.
    pub async fn list_filtered(
        pool: &PgPool,
        base: Option<&str>,
        fleet: Option<&str>,
    ) -> Result<Vec<Captain>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM captains
             WHERE ($1::TEXT IS NULL OR base = $1)
               AND ($2::TEXT IS NULL OR fleet = $2)
             ORDER BY name ASC, id ASC"
        );
        sqlx::query_as::<_, Captain>(&query)
            .bind(base)
            .bind(fleet)
            .fetch_all(pool)
            .await
    }

    /// Lock a captain row for the rest of the surrounding transaction.
    ///
    /// Every write that must observe a consistent view of one captain's
    /// reviews or suggestions takes this lock first.
    pub async fn lock_for_update<'e, E>(executor: E, id: DbId) -> Result<Option<Captain>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM captains WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Captain>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Set a captain's current base and fleet.
    pub async fn apply_assignment<'e, E>(
        executor: E,
        id: DbId,
        base: &str,
        fleet: &str,
        now: Timestamp,
    ) -> Result<Captain, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE captains SET base = $2, fleet = $3, updated_at = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Captain>(&query)
            .bind(id)
            .bind(base)
            .bind(fleet)
            .bind(now)
            .fetch_one(executor)
            .await
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
