//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since startup
    pub uptime: f64,
    pub database: String,
}

/// GET /health, unauthenticated
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.services.health_check().await;
    if let Some(issue) = status.issue.as_deref() {
        warn!(issue = issue, "Health check found an unreachable database");
    }

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: state.uptime_secs(),
        database: if status.is_healthy() { "ok" } else { "unavailable" }.to_string(),
    })
}
