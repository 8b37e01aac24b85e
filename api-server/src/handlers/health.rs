//! Health check handler

use axum::{extract::State, Json};
use churn_core::api::{ArtifactStatus, InferenceStats};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    timestamp: i64,
    artifacts: ArtifactStatus,
    inference: InferenceStats,
}

/// Liveness + artifact status; never triggers an artifact load
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.engine.status();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().timestamp(),
        artifacts: status.artifacts,
        inference: status.inference,
    })
}
