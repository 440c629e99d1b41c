//! Built-in sample catalog.
//!
//! Six well-known temples, defined in `data/temples.toml` and embedded at
//! compile time. They are written to an empty `temples` table on startup so
//! a fresh deployment has something to list, search and plan around.

use anyhow::Result;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::models::Temple;
use crate::queries::temples as temple_queries;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    temples: Vec<Temple>,
}

static SAMPLE_CATALOG_TOML: &str = include_str!("../data/temples.toml");

/// Parse the embedded sample catalog.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. The file ships with the
/// binary, so a successful build with passing tests means it parses.
pub fn sample_temples() -> Vec<Temple> {
    let file: CatalogFile =
        toml::from_str(SAMPLE_CATALOG_TOML).expect("embedded temples.toml is invalid");
    file.temples
}

/// Insert the sample catalog when the `temples` table is empty.
///
/// Returns the number of temples inserted (zero when the catalog already
/// had rows).
pub async fn seed_sample_catalog(pool: &PgPool) -> Result<usize> {
    let existing = temple_queries::count_temples(pool).await?;
    if existing > 0 {
        info!(existing, "temple catalog already populated");
        return Ok(0);
    }

    let mut inserted = 0;
    for temple in sample_temples() {
        if temple_queries::insert_temple(pool, &temple).await? {
            inserted += 1;
        }
    }

    info!(inserted, "initialized database with sample temple data");
    Ok(inserted)
}
