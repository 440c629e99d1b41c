//! Postgres fixtures and a scripted chat model for yatra integration tests.
//!
//! One PostgreSQL server is shared per test binary; every test gets its own
//! freshly migrated database inside it.
//!
//! - With **`YATRA_TEST_PG_URL`** set, that server is used as-is.
//! - Otherwise a container is started through testcontainers on first use
//!   and kept alive in a `OnceCell` until the binary exits.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use yatra_core::model::{ChatModel, ChatRequest};
use yatra_db::models::Temple;
use yatra_db::{catalog, pool};

struct SharedPg {
    base_url: String,
    /// Keeps the container alive. `None` for an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("YATRA_TEST_PG_URL") {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_string(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server root URL (no database name).
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

async fn maintenance_pool() -> PgPool {
    let maint_url = format!("{}/postgres", pg_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(&maint_url)
        .await
        .expect("failed to connect to maintenance database")
}

/// Create an empty, migrated database. Returns `(pool, db_name)`; pass the
/// name to [`drop_test_db`] when done.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("yatra_test_{}", Uuid::new_v4().simple());

    let maint_pool = maintenance_pool().await;
    let stmt = format!("CREATE DATABASE {db_name}");
    maint_pool
        .execute(stmt.as_str())
        .await
        .unwrap_or_else(|e| panic!("failed to create temp database {db_name}: {e}"));
    maint_pool.close().await;

    let temp_url = format!("{}/{db_name}", pg_url().await);
    let temp_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect(&temp_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to temp database {db_name}: {e}"));

    pool::run_migrations(&temp_pool)
        .await
        .expect("migrations should succeed");

    (temp_pool, db_name)
}

/// [`create_test_db`] plus the built-in six-temple sample catalog.
pub async fn create_seeded_test_db() -> (PgPool, String) {
    let (pool, db_name) = create_test_db().await;
    catalog::seed_sample_catalog(&pool)
        .await
        .expect("seeding the sample catalog should succeed");
    (pool, db_name)
}

/// Insert the given sample temples (by id) in the given order.
pub async fn insert_sample_temples(pool: &PgPool, ids: &[&str]) -> Vec<Temple> {
    let samples = catalog::sample_temples();
    let mut inserted = Vec::with_capacity(ids.len());
    for id in ids {
        let temple = samples
            .iter()
            .find(|t| t.id == *id)
            .unwrap_or_else(|| panic!("no sample temple with id {id}"))
            .clone();
        yatra_db::queries::temples::insert_temple(pool, &temple)
            .await
            .expect("insert_temple should succeed");
        inserted.push(temple);
    }
    inserted
}

/// Terminate connections to `db_name` and drop it. Safe to call twice.
pub async fn drop_test_db(db_name: &str) {
    let maint_pool = maintenance_pool().await;

    let terminate = format!(
        "SELECT pg_terminate_backend(pid) \
         FROM pg_stat_activity \
         WHERE datname = '{db_name}' AND pid <> pg_backend_pid()"
    );
    let _ = maint_pool.execute(terminate.as_str()).await;

    let stmt = format!("DROP DATABASE IF EXISTS {db_name}");
    let _ = maint_pool.execute(stmt.as_str()).await;
    maint_pool.close().await;
}

// ---------------------------------------------------------------------------
// Scripted chat model
// ---------------------------------------------------------------------------

/// A [`ChatModel`] that answers every request with the same canned outcome
/// and records what it was asked.
pub struct ScriptedModel {
    outcome: Result<String, String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    /// Always reply with `reply`.
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(reply.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Always fail with `message`, as an unreachable provider would.
    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<String> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request.clone());
        match &self.outcome {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
