//! CLI handlers for `yatra trip` subcommands.
//!
//! Implements:
//! - `yatra trip plan --from <loc> --days <n> [--state <s>]...`
//! - `yatra trip show <id>`
//!
//! Both print the plan as pretty JSON, the same shape the HTTP API returns.

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use yatra_core::planner::{TripPlanRequest, TripPlanner};
use yatra_db::models::TripPlan;
use yatra_db::queries::trip_plans as trip_plan_queries;

pub async fn cmd_plan(
    planner: &TripPlanner,
    from: String,
    days: i32,
    states: Vec<String>,
) -> Result<()> {
    let request = TripPlanRequest {
        starting_location: from,
        days,
        preferred_states: states,
        temples_of_interest: vec![],
    };
    let plan = planner.plan_trip(&request).await?;
    print_plan(&plan)
}

pub async fn cmd_show(pool: &PgPool, id: &str) -> Result<()> {
    let plan_id = Uuid::parse_str(id).with_context(|| format!("invalid trip plan ID: {id}"))?;
    let Some(plan) = trip_plan_queries::get_trip_plan(pool, plan_id).await? else {
        bail!("trip plan {id} not found");
    };
    print_plan(&plan)
}

fn print_plan(plan: &TripPlan) -> Result<()> {
    let json = serde_json::to_string_pretty(plan).context("failed to serialize trip plan")?;
    println!("{json}");
    Ok(())
}
