//! Health check controller.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Reports liveness and, for the database backend, whether the pool answers.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.pool {
        None => None,
        Some(pool) => Some(pool.health_check().await),
    };

    let (status, health, database) = match database {
        None => (StatusCode::OK, "healthy", None),
        Some(Ok(())) => (StatusCode::OK, "healthy", Some("up")),
        Some(Err(e)) => {
            warn!("Database health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some("down"))
        }
    };

    (
        status,
        Json(HealthResponse {
            status: health.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.map(str::to_string),
        }),
    )
}
