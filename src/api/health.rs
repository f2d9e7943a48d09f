//! Health check endpoints

use crate::state::HasServices;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    security(()),
    responses((status = 200, description = "Process is alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness probe, checks the database
#[utoipa::path(
    get,
    path = "/ready",
    tag = "System",
    security(()),
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn ready<S: HasServices>(State(state): State<S>) -> impl IntoResponse {
    if state.check_ready().await {
        (StatusCode::OK, "ready")
    } else {
        tracing::warn!("Readiness check failed: database unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    }
}
