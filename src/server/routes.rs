use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::errors::LogSliceError;
use crate::models::{ArtifactOutcome, JobId, StatusReport};
use crate::storage::logs::SOURCE_LOG_NAME;

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn service_error(err: &LogSliceError) -> Response {
    let (status, code) = match err {
        LogSliceError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        LogSliceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        LogSliceError::Storage(_) | LogSliceError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };
    error_response(status, code, &err.to_string())
}

fn plain_text(body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Query params / bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateParams {
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: JobId,
    pub status: StatusReport,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/logs/create?date=DD-MM-YYYY
pub async fn create_extraction(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CreateParams>,
) -> Response {
    match state.service.submit(&params.date) {
        Ok(handle) => (StatusCode::OK, Json(handle.job_id)).into_response(),
        Err(e) => {
            tracing::warn!("Extraction request for '{}' rejected: {}", params.date, e);
            service_error(&e)
        }
    }
}

/// GET /api/logs/status/{id}
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Response {
    let id = JobId(id);
    let status = state.service.status(id);
    (StatusCode::OK, Json(StatusResponse { id, status })).into_response()
}

/// GET /api/logs/file/{id}
pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Response {
    let id = JobId(id);
    match state.service.artifact(id).await {
        Ok(ArtifactOutcome::Content(bytes)) => plain_text(bytes),
        Ok(ArtifactOutcome::StillProcessing) => error_response(
            StatusCode::BAD_REQUEST,
            "in_progress",
            &format!("Log extraction {} is still in progress", id),
        ),
        Ok(ArtifactOutcome::Failed) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "extraction_failed",
            &format!("Log extraction {} failed", id),
        ),
        Ok(ArtifactOutcome::NotFound) => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            &format!("Log file for job {} not found", id),
        ),
        Err(e) => {
            tracing::error!("Failed to read artifact for job {}: {}", id, e);
            service_error(&e)
        }
    }
}

/// GET /api/logs/full
pub async fn get_full_log(State(state): State<Arc<AppState>>) -> Response {
    match state.service.full_log().await {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", SOURCE_LOG_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => service_error(&LogSliceError::NotFound(format!(
            "{} does not exist",
            SOURCE_LOG_NAME
        ))),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", SOURCE_LOG_NAME, e);
            service_error(&e)
        }
    }
}
