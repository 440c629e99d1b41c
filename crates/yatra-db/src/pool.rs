use std::time::Duration;

use anyhow::{Context, Result, bail};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DbConfig;

/// Schema for the temple catalog and trip plans, compiled in from `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    pool_options(config.max_connections)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("cannot reach yatra database at {}", config.database_url))
}

/// Apply the embedded migrations. Already-applied ones are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!("migrations applied successfully");
    Ok(())
}

/// `name` if it can be spliced into `CREATE DATABASE` unquoted.
fn plain_identifier(name: &str) -> Result<&str> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        bail!("refusing to create database {name:?}: use letters, digits and underscores");
    }
    Ok(name)
}

/// Create the configured database unless it already exists. Used by
/// `db-init`; the server and CLI expect the database to be there.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let name = config
        .database_name()
        .context("database URL has no database name")
        .and_then(plain_identifier)?;

    let admin_url = config.maintenance_url();
    let admin = pool_options(1)
        .connect(&admin_url)
        .await
        .with_context(|| format!("cannot reach maintenance database at {admin_url}"))?;

    let outcome = create_if_missing(&admin, name).await;
    admin.close().await;
    outcome
}

async fn create_if_missing(admin: &PgPool, name: &str) -> Result<()> {
    let present: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(admin)
            .await
            .context("failed to look up existing databases")?;
    if present {
        info!(db = name, "database already exists");
        return Ok(());
    }
    admin
        .execute(format!("CREATE DATABASE {name}").as_str())
        .await
        .with_context(|| format!("failed to create database {name}"))?;
    info!(db = name, "database created");
    Ok(())
}

/// Row counts for the application tables, for the `db-init` summary.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(String, i64)>> {
    let mut counts = Vec::new();
    for table in ["temples", "trip_plans"] {
        let query = format!("SELECT COUNT(*) FROM {table}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        counts.push((table.to_string(), count));
    }
    Ok(counts)
}
