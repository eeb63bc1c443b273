//! Unified error types for the users service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Unified error type for the service binary.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error surfaced at the request-handler boundary.
///
/// Two outcomes only: a query failure becomes a 500 carrying the raw driver
/// message, and an empty result set on an id-addressed statement becomes a
/// 404 with a fixed message. Not-found is decided after a successful query;
/// it is never inferred from a failure.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Query execution failed.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Id-addressed statement matched no row.
    #[error("User not found")]
    UserNotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response(),
            ApiError::UserNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "User not found" })),
            )
                .into_response(),
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
