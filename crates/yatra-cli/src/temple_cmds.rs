//! CLI handlers for `yatra temple` subcommands.
//!
//! Implements:
//! - `yatra temple list`         -- tabulate the catalog
//! - `yatra temple show <id>`    -- print one temple in full
//! - `yatra temple search [...]` -- filtered search, tabulated

use anyhow::{Result, bail};
use sqlx::PgPool;

use yatra_db::models::Temple;
use yatra_db::queries::temples::{self as temple_queries, TempleSearch};

use crate::TempleCommands;

/// Dispatch a `TempleCommands` variant to the appropriate handler.
pub async fn run_temple_command(command: TempleCommands, pool: &PgPool) -> Result<()> {
    match command {
        TempleCommands::List => {
            let temples = temple_queries::list_temples(pool).await?;
            print_table(&temples);
            Ok(())
        }
        TempleCommands::Show { id } => cmd_show(pool, &id).await,
        TempleCommands::Search { q, state, deity } => {
            let search = TempleSearch {
                q: q.as_deref(),
                state: state.as_deref(),
                deity: deity.as_deref(),
            };
            let temples = temple_queries::search_temples(pool, &search).await?;
            print_table(&temples);
            Ok(())
        }
    }
}

async fn cmd_show(pool: &PgPool, id: &str) -> Result<()> {
    let Some(temple) = temple_queries::get_temple(pool, id).await? else {
        bail!("temple {id} not found");
    };

    println!("{} ({})", temple.name, temple.id);
    println!("  Location:   {}", temple.location);
    println!("  State:      {}", temple.state);
    println!("  Deity:      {}", temple.deity);
    if !temple.timings.is_empty() {
        println!("  Timings:    {}", temple.timings);
    }
    if !temple.prasadam.is_empty() {
        println!("  Prasadam:   {}", temple.prasadam);
    }
    if !temple.festivals.is_empty() {
        println!("  Festivals:  {}", temple.festivals.join(", "));
    }
    if !temple.nearby_attractions.is_empty() {
        println!("  Nearby:     {}", temple.nearby_attractions.join(", "));
    }
    println!(
        "  Coordinates: {:.4}, {:.4}",
        temple.coordinates.lat, temple.coordinates.lng
    );
    if !temple.description.is_empty() {
        println!();
        println!("{}", temple.description);
    }
    Ok(())
}

fn print_table(temples: &[Temple]) {
    if temples.is_empty() {
        println!("No temples found.");
        return;
    }

    println!("{:<12} {:<36} {:<16} {}", "ID", "NAME", "STATE", "DEITY");
    println!("{}", "-".repeat(88));
    for t in temples {
        println!(
            "{:<12} {:<36} {:<16} {}",
            t.id,
            truncate(&t.name, 36),
            truncate(&t.state, 16),
            t.deity
        );
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("Somnath Temple", 36), "Somnath Temple");
    }

    #[test]
    fn truncate_shortens_long_names() {
        let out = truncate("Golden Temple (Harmandir Sahib)", 16);
        assert_eq!(out, "Golden Temple...");
        assert_eq!(out.chars().count(), 16);
    }
}
