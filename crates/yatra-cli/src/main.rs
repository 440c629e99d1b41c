mod config;
mod serve_cmd;
mod temple_cmds;
mod trip_cmds;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use yatra_core::model::build_chat_model;
use yatra_core::planner::TripPlanner;
use yatra_db::{catalog, pool};

use config::YatraConfig;

#[derive(Parser)]
#[command(name = "yatra", about = "Temple catalog and pilgrimage trip planner")]
struct Cli {
    /// Database URL (overrides YATRA_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a yatra config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/yatra")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create and migrate the database, seeding the sample catalog if empty
    DbInit,
    /// Start the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8001)]
        port: u16,
    },
    /// Browse the temple catalog
    Temple {
        #[command(subcommand)]
        command: TempleCommands,
    },
    /// Generate and inspect trip plans
    Trip {
        #[command(subcommand)]
        command: TripCommands,
    },
}

#[derive(Subcommand)]
pub enum TempleCommands {
    /// List every temple in catalog order
    List,
    /// Show one temple
    Show {
        /// Temple ID (e.g. temple_001)
        id: String,
    },
    /// Search by name/location, state, and deity
    Search {
        /// Matches name, location, or city
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        deity: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TripCommands {
    /// Plan a trip with the configured model and store it
    Plan {
        /// Starting location
        #[arg(long = "from")]
        from: String,
        /// Trip length in days (1-30)
        #[arg(long)]
        days: i32,
        /// Preferred state; repeat for several. Omit for all states.
        #[arg(long = "state")]
        states: Vec<String>,
    },
    /// Print a stored trip plan
    Show {
        /// Trip plan ID
        id: String,
    },
}

/// Execute the `yatra init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        llm: config::LlmSection::default(),
    };

    config::save_config_to(&cfg, &path)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  llm.model    = {}", cfg.llm.model);
    println!();
    println!("Set llm.api_key in the file or export {}.", config::ENV_LLM_API_KEY);
    println!("Next: run `yatra db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `yatra db-init` command: create database, run migrations, seed.
async fn cmd_db_init(resolved: &YatraConfig) -> anyhow::Result<()> {
    println!("Initializing yatra database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations and seed.
    let result = migrate_and_seed(&db_pool).await;
    if result.is_ok() {
        // 4. Print success with table counts.
        let counts = pool::table_counts(&db_pool).await?;
        println!("Database ready. Tables:");
        for (table, count) in &counts {
            println!("  {table}: {count} rows");
        }
    }

    // 5. Clean shutdown.
    db_pool.close().await;
    result?;

    println!("yatra db-init complete.");
    Ok(())
}

async fn migrate_and_seed(db_pool: &PgPool) -> anyhow::Result<()> {
    pool::run_migrations(db_pool).await?;
    catalog::seed_sample_catalog(db_pool).await?;
    Ok(())
}

fn build_planner(resolved: &YatraConfig, db_pool: PgPool) -> anyhow::Result<TripPlanner> {
    let model = build_chat_model(resolved.model_config.clone())?;
    Ok(TripPlanner::new(db_pool, Arc::new(model))
        .with_upstream_fallback(resolved.fallback_on_upstream_error))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            let resolved = YatraConfig::resolve(cli.database_url.as_deref())?;
            cmd_db_init(&resolved).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = YatraConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = async {
                migrate_and_seed(&db_pool).await?;
                let planner = build_planner(&resolved, db_pool.clone())?;
                serve_cmd::run_serve(serve_cmd::AppState::new(planner), &bind, port).await
            }
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Temple { command } => {
            let resolved = YatraConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = temple_cmds::run_temple_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Trip { command } => {
            let resolved = YatraConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = match command {
                TripCommands::Plan { from, days, states } => {
                    async {
                        let planner = build_planner(&resolved, db_pool.clone())?;
                        trip_cmds::cmd_plan(&planner, from, days, states).await
                    }
                    .await
                }
                TripCommands::Show { id } => trip_cmds::cmd_show(&db_pool, &id).await,
            };
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
