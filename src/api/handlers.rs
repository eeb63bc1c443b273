//! HTTP API handlers.
//!
//! Each CRUD handler is a direct mapping: parsed path/body -> one
//! parameterized query -> HTTP response. Query failures become 500s with the
//! raw driver message; an empty result set on an id-addressed statement
//! becomes a 404. The id path parameter is forwarded to the query as-is.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use sqlx::PgPool;

use crate::db::{self, users};
use crate::error::ApiError;
use crate::metrics;

/// Application state shared with handlers.
///
/// Constructed once at startup and injected through axum's `State`; the pool
/// is the only handle to the database, there is no global.
#[derive(Clone)]
pub struct AppState {
    /// Shared connection pool.
    pub pool: PgPool,
    /// Whether the bootstrap sequencer has succeeded.
    pub bootstrap_ok: Arc<AtomicBool>,
    /// Prometheus render handle for the /metrics route.
    pub prometheus: PrometheusHandle,
}

impl AppState {
    /// Create new app state around an already-built pool.
    pub fn new(pool: PgPool, prometheus: PrometheusHandle) -> Self {
        Self {
            pool,
            bootstrap_ok: Arc::new(AtomicBool::new(false)),
            prometheus,
        }
    }

    /// Record the bootstrap outcome.
    pub fn set_bootstrap_ok(&self, ok: bool) {
        self.bootstrap_ok.store(ok, Ordering::SeqCst);
    }

    /// Whether bootstrap has succeeded.
    pub fn is_bootstrap_ok(&self) -> bool {
        self.bootstrap_ok.load(Ordering::SeqCst)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: &'static str,
    /// "connected" or "disconnected".
    pub database: &'static str,
    /// Probe error, present only when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// "ready" or "not ready".
    pub status: &'static str,
    /// Why the service is not ready, when it is not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn query_error(err: sqlx::Error) -> ApiError {
    metrics::record_query_failure();
    ApiError::Database(err)
}

/// Liveness probe - re-probes the database on every call.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    metrics::record_request("health");

    match db::probe(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                error: None,
            }),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "disconnected",
                error: Some(err.to_string()),
            }),
        ),
    }
}

/// Readiness probe - not ready until bootstrap has succeeded, then re-probes
/// connectivity on every call.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    metrics::record_request("ready");

    if !state.is_bootstrap_ok() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not ready",
                error: Some("database not initialized".to_string()),
            }),
        );
    }

    match db::probe(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready",
                error: None,
            }),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not ready",
                error: Some(err.to_string()),
            }),
        ),
    }
}

/// GET /api/users - all rows, possibly empty.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    metrics::record_request("list_users");

    let rows = users::list(&state.pool).await.map_err(query_error)?;
    Ok(Json(rows))
}

/// GET /api/users/:id - one row or 404.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    metrics::record_request("get_user");

    let row = users::find(&state.pool, &id).await.map_err(query_error)?;
    match row {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::UserNotFound),
    }
}

/// POST /api/users - insert and return the created row with 201.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<users::UserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    metrics::record_request("create_user");

    let user = users::create(&state.pool, &payload)
        .await
        .map_err(query_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/:id - full-replace both columns, 404 if absent.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<users::UserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    metrics::record_request("update_user");

    let row = users::update(&state.pool, &id, &payload)
        .await
        .map_err(query_error)?;
    match row {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::UserNotFound),
    }
}

/// DELETE /api/users/:id - 204 with empty body, 404 if absent.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    metrics::record_request("delete_user");

    let row = users::delete(&state.pool, &id).await.map_err(query_error)?;
    match row {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::UserNotFound),
    }
}

/// GET /metrics - Prometheus exposition text.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.prometheus.render()
}
