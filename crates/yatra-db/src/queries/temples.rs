//! Database query functions for the `temples` table.
//!
//! Every listing is ordered by insertion sequence so repeated reads without
//! intervening writes return identical results.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Temple;

/// Maximum rows returned by [`list_temples`].
pub const LIST_LIMIT: i64 = 1000;

/// Maximum rows returned by [`search_temples`].
pub const SEARCH_LIMIT: i64 = 100;

/// Case-insensitive substring filters for [`search_temples`].
///
/// Empty or whitespace-only values are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TempleSearch<'a> {
    /// Matched against name, location and city.
    pub q: Option<&'a str>,
    pub state: Option<&'a str>,
    pub deity: Option<&'a str>,
}

/// Insert a temple. Returns `false` when a temple with the same id already
/// exists; the stored row is left untouched in that case.
pub async fn insert_temple(pool: &PgPool, temple: &Temple) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO temples (id, name, location, state, city, deity, image, description, \
         history, timings, prasadam, festivals, contact, booking_link, coordinates, \
         nearby_attractions) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(&temple.id)
    .bind(&temple.name)
    .bind(&temple.location)
    .bind(&temple.state)
    .bind(&temple.city)
    .bind(&temple.deity)
    .bind(&temple.image)
    .bind(&temple.description)
    .bind(&temple.history)
    .bind(&temple.timings)
    .bind(&temple.prasadam)
    .bind(&temple.festivals)
    .bind(&temple.contact)
    .bind(&temple.booking_link)
    .bind(&temple.coordinates)
    .bind(&temple.nearby_attractions)
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert temple {:?}", temple.id))?;

    Ok(result.rows_affected() == 1)
}

/// Fetch a temple by its id.
pub async fn get_temple(pool: &PgPool, id: &str) -> Result<Option<Temple>> {
    let temple = sqlx::query_as::<_, Temple>("SELECT * FROM temples WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("failed to fetch temple {id:?}"))?;

    Ok(temple)
}

/// List temples in insertion order, capped at [`LIST_LIMIT`].
pub async fn list_temples(pool: &PgPool) -> Result<Vec<Temple>> {
    let temples = sqlx::query_as::<_, Temple>("SELECT * FROM temples ORDER BY seq LIMIT $1")
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await
        .context("failed to list temples")?;

    Ok(temples)
}

/// Temples whose `state` equals any entry of `states`, in insertion order.
///
/// An empty `states` slice matches every temple.
pub async fn find_temples_in_states(
    pool: &PgPool,
    states: &[String],
    limit: i64,
) -> Result<Vec<Temple>> {
    let temples = sqlx::query_as::<_, Temple>(
        "SELECT * FROM temples \
         WHERE cardinality($1::text[]) = 0 OR state = ANY($1) \
         ORDER BY seq \
         LIMIT $2",
    )
    .bind(states)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to select temples by state")?;

    Ok(temples)
}

/// Filtered search, capped at [`SEARCH_LIMIT`].
pub async fn search_temples(pool: &PgPool, search: &TempleSearch<'_>) -> Result<Vec<Temple>> {
    let temples = sqlx::query_as::<_, Temple>(
        "SELECT * FROM temples \
         WHERE ($1::text IS NULL OR name ILIKE $1 OR location ILIKE $1 OR city ILIKE $1) \
           AND ($2::text IS NULL OR state ILIKE $2) \
           AND ($3::text IS NULL OR deity ILIKE $3) \
         ORDER BY seq \
         LIMIT $4",
    )
    .bind(contains_pattern(search.q))
    .bind(contains_pattern(search.state))
    .bind(contains_pattern(search.deity))
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await
    .context("failed to search temples")?;

    Ok(temples)
}

/// Total number of temples in the catalog.
pub async fn count_temples(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM temples")
        .fetch_one(pool)
        .await
        .context("failed to count temples")?;

    Ok(count)
}

/// `%term%` with LIKE metacharacters escaped, or `None` for a blank term.
fn contains_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
