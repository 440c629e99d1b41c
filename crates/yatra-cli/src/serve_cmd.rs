use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use yatra_core::planner::{PlannerError, TripPlanRequest, TripPlanner};
use yatra_db::models::{Temple, TripPlan};
use yatra_db::queries::temples::{self as temple_db, TempleSearch};
use yatra_db::queries::trip_plans as trip_plan_db;

pub const SERVICE_BANNER: &str = "Temple Search & Trip Planning API";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    /// A 500 whose body carries only `public`; the cause goes to the log.
    pub fn internal(public: &str, err: &anyhow::Error) -> Self {
        let detail = format!("{err:#}");
        tracing::error!(error = %detail, "{public}");
        Self::opaque(public)
    }

    fn opaque(public: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: public.to_string(),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::InvalidDays { .. } => Self::bad_request(err.to_string()),
            // Already logged with its session id by the planner.
            PlannerError::Upstream(_) => Self::opaque("failed to generate trip plan"),
            PlannerError::Persistence(e) => Self::internal("failed to store trip plan", &e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub planner: TripPlanner,
}

impl AppState {
    pub fn new(planner: TripPlanner) -> Self {
        Self {
            pool: planner.pool().clone(),
            planner,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub state: Option<String>,
    pub deity: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/temples", get(list_temples))
        .route("/api/temples/{id}", get(get_temple))
        .route("/api/search/temples", get(search_temples))
        .route("/api/trip-plan", post(create_trip_plan))
        .route("/api/trip-plans/{id}", get(get_trip_plan))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("yatra serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("yatra serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": SERVICE_BANNER }))
}

async fn list_temples(State(state): State<AppState>) -> Result<Json<Vec<Temple>>, AppError> {
    let temples = temple_db::list_temples(&state.pool)
        .await
        .map_err(|e| AppError::internal("failed to list temples", &e))?;
    Ok(Json(temples))
}

async fn get_temple(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Temple>, AppError> {
    temple_db::get_temple(&state.pool, &id)
        .await
        .map_err(|e| AppError::internal("failed to load temple", &e))?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("temple {id} not found")))
}

async fn search_temples(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Temple>>, AppError> {
    let search = TempleSearch {
        q: params.q.as_deref(),
        state: params.state.as_deref(),
        deity: params.deity.as_deref(),
    };
    let temples = temple_db::search_temples(&state.pool, &search)
        .await
        .map_err(|e| AppError::internal("failed to search temples", &e))?;
    Ok(Json(temples))
}

async fn create_trip_plan(
    State(state): State<AppState>,
    body: Result<Json<TripPlanRequest>, JsonRejection>,
) -> Result<Json<TripPlan>, AppError> {
    let Json(request) = body?;
    let plan = state.planner.plan_trip(&request).await?;
    Ok(Json(plan))
}

async fn get_trip_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripPlan>, AppError> {
    let not_found = || AppError::not_found(format!("trip plan {id} not found"));
    let plan_id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    trip_plan_db::get_trip_plan(&state.pool, plan_id)
        .await
        .map_err(|e| AppError::internal("failed to load trip plan", &e))?
        .map(Json)
        .ok_or_else(not_found)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
