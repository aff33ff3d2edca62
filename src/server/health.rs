use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub jobs_tracked: usize,
    pub jobs_in_progress: usize,
    pub version: String,
    pub logs_dir: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Health check");

    let registry = state.service.registry();
    let logs_dir = state
        .config
        .logs_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let response = HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        jobs_tracked: registry.len(),
        jobs_in_progress: registry.in_progress(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        logs_dir,
    };

    (StatusCode::OK, Json(response))
}
