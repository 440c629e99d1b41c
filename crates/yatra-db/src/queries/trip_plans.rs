//! Database query functions for the `trip_plans` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{DayPlan, ItineraryOrigin, TripPlan};

/// Parameters for inserting a trip plan. The caller assigns the id.
#[derive(Debug, Clone)]
pub struct NewTripPlan<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub duration: i32,
    pub daily_itinerary: &'a [DayPlan],
    pub total_temples: i32,
    pub estimated_cost: &'a str,
    pub best_travel_mode: &'a str,
    pub origin: ItineraryOrigin,
    pub starting_location: &'a str,
}

/// Insert a trip plan and return the stored row (with `created_at`).
pub async fn insert_trip_plan(pool: &PgPool, new: &NewTripPlan<'_>) -> Result<TripPlan> {
    let plan = sqlx::query_as::<_, TripPlan>(
        "INSERT INTO trip_plans (id, title, duration, daily_itinerary, total_temples, \
         estimated_cost, best_travel_mode, origin, starting_location) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING *",
    )
    .bind(new.id)
    .bind(new.title)
    .bind(new.duration)
    .bind(Json(new.daily_itinerary))
    .bind(new.total_temples)
    .bind(new.estimated_cost)
    .bind(new.best_travel_mode)
    .bind(new.origin)
    .bind(new.starting_location)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert trip plan {}", new.id))?;

    Ok(plan)
}

/// Fetch a trip plan by its id.
pub async fn get_trip_plan(pool: &PgPool, id: Uuid) -> Result<Option<TripPlan>> {
    let plan = sqlx::query_as::<_, TripPlan>("SELECT * FROM trip_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch trip plan")?;

    Ok(plan)
}

/// Number of stored trip plans.
pub async fn count_trip_plans(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trip_plans")
        .fetch_one(pool)
        .await
        .context("failed to count trip plans")?;

    Ok(count)
}
