pub mod health;
pub mod routes;
pub mod sse;

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::daemon::extraction::ExtractionService;
use crate::models::ServiceConfig;

/// Shared application state for the Axum server.
pub struct AppState {
    pub service: Arc<ExtractionService>,
    pub config: Arc<ServiceConfig>,
    pub start_time: Instant,
}

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/logs/create", post(routes::create_extraction))
        .route("/api/logs/status/{id}", get(routes::get_status))
        .route("/api/logs/file/{id}", get(routes::get_artifact))
        .route("/api/logs/full", get(routes::get_full_log))
        .route("/api/logs/events", get(sse::sse_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

// ===========================================================================
// Tests
// ===========================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::events::JobEvent;
    use crate::models::{FixedClock, JobId};
    use crate::storage::logs::FsArtifactStore;
    use crate::storage::ArtifactStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    // -----------------------------------------------------------------------
    // Test helper: build AppState and Router
    // -----------------------------------------------------------------------

    async fn make_test_state(delay: Duration) -> (Arc<AppState>, TempDir) {
        let tmp = TempDir::new().expect("create temp dir");
        let store = FsArtifactStore::new(tmp.path().to_path_buf())
            .await
            .expect("create store");
        let (event_tx, _) = broadcast::channel::<JobEvent>(64);
        let service = ExtractionService::new(
            Arc::new(store) as Arc<dyn ArtifactStore>,
            Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 4, 3).unwrap())),
            event_tx,
            delay,
        );
        let state = Arc::new(AppState {
            service: Arc::new(service),
            config: Arc::new(ServiceConfig::default()),
            start_time: Instant::now(),
        });
        (state, tmp)
    }

    /// Helper to read the full body from a response.
    async fn body_string(body: Body) -> String {
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn wait_for_terminal(state: &AppState, id: JobId) {
        for _ in 0..200 {
            if state.service.registry().status(id).is_some_and(|s| s.is_terminal()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never finished", id);
    }

    // =======================================================================
    // GET /health
    // =======================================================================
    #[tokio::test]
    async fn test_health_returns_200_with_expected_fields() {
        let (state, _tmp) = make_test_state(Duration::ZERO).await;
        let app = create_router(state);

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&body_string(response.into_body()).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_seconds"].is_number());
        assert_eq!(json["jobs_tracked"], 0);
        assert_eq!(json["jobs_in_progress"], 0);
        assert_eq!(json["version"], "0.1.0");
    }

    // =======================================================================
    // POST /api/logs/create
    // =======================================================================
    #[tokio::test]
    async fn test_create_returns_job_id() {
        let (state, _tmp) = make_test_state(Duration::from_secs(30)).await;
        let app = create_router(Arc::clone(&state));

        let response = app
            .oneshot(post("/api/logs/create?date=01-04-2023"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response.into_body()).await, "1");
        assert_eq!(state.service.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_create_invalid_date_returns_400() {
        let (state, _tmp) = make_test_state(Duration::ZERO).await;

        for date in ["invalid-date", "2023%2F04%2F01", "31-02-2024", "04-04-2025"] {
            let app = create_router(Arc::clone(&state));
            let response = app
                .oneshot(post(&format!("/api/logs/create?date={}", date)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "date {date}");

            let json: serde_json::Value =
                serde_json::from_str(&body_string(response.into_body()).await).unwrap();
            assert_eq!(json["error"], "validation_error");
            assert!(json["message"].is_string());
        }

        assert!(state.service.registry().is_empty());
    }

    #[tokio::test]
    async fn test_create_without_date_returns_400() {
        let (state, _tmp) = make_test_state(Duration::ZERO).await;
        let app = create_router(Arc::clone(&state));

        let response = app.oneshot(post("/api/logs/create")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.service.registry().is_empty());
    }

    // =======================================================================
    // GET /api/logs/status/{id}
    // =======================================================================
    #[tokio::test]
    async fn test_status_unknown_id_is_not_found_value() {
        let (state, _tmp) = make_test_state(Duration::ZERO).await;
        let app = create_router(state);

        let response = app.oneshot(get("/api/logs/status/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&body_string(response.into_body()).await).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["status"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_status_in_progress_right_after_submit() {
        let (state, _tmp) = make_test_state(Duration::from_secs(30)).await;
        let handle = state.service.submit("01-04-2023").unwrap();

        let app = create_router(Arc::clone(&state));
        let response = app
            .oneshot(get(&format!("/api/logs/status/{}", handle.job_id)))
            .await
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response.into_body()).await).unwrap();
        assert_eq!(json["status"], "IN_PROGRESS");
        handle.join_handle.abort();
    }

    #[tokio::test]
    async fn test_status_non_numeric_id_returns_400() {
        let (state, _tmp) = make_test_state(Duration::ZERO).await;
        let app = create_router(state);

        let response = app.oneshot(get("/api/logs/status/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // =======================================================================
    // GET /api/logs/file/{id}
    // =======================================================================
    #[tokio::test]
    async fn test_file_unknown_id_returns_404() {
        let (state, _tmp) = make_test_state(Duration::ZERO).await;
        let app = create_router(state);

        let response = app.oneshot(get("/api/logs/file/7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json: serde_json::Value =
            serde_json::from_str(&body_string(response.into_body()).await).unwrap();
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_file_in_progress_returns_400() {
        let (state, _tmp) = make_test_state(Duration::from_secs(30)).await;
        let handle = state.service.submit("01-04-2023").unwrap();

        let app = create_router(Arc::clone(&state));
        let response = app
            .oneshot(get(&format!("/api/logs/file/{}", handle.job_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json: serde_json::Value =
            serde_json::from_str(&body_string(response.into_body()).await).unwrap();
        assert_eq!(json["error"], "in_progress");
        handle.join_handle.abort();
    }

    #[tokio::test]
    async fn test_file_failed_job_returns_500() {
        // No application.log in the temp dir, so the worker fails
        let (state, _tmp) = make_test_state(Duration::ZERO).await;
        let handle = state.service.submit("01-04-2023").unwrap();
        let id = handle.job_id;
        wait_for_terminal(&state, id).await;

        let app = create_router(Arc::clone(&state));
        let response = app
            .oneshot(get(&format!("/api/logs/file/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json: serde_json::Value =
            serde_json::from_str(&body_string(response.into_body()).await).unwrap();
        assert_eq!(json["error"], "extraction_failed");
    }

    #[tokio::test]
    async fn test_file_completed_returns_plain_text() {
        let (state, tmp) = make_test_state(Duration::ZERO).await;
        std::fs::write(
            tmp.path().join("application.log"),
            "2023-04-01 A\n2023-04-01 B\n2023-04-02 C\n",
        )
        .unwrap();
        let handle = state.service.submit("01-04-2023").unwrap();
        let id = handle.job_id;
        wait_for_terminal(&state, id).await;

        let app = create_router(Arc::clone(&state));
        let response = app
            .oneshot(get(&format!("/api/logs/file/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(
            body_string(response.into_body()).await,
            "2023-04-01 A\n2023-04-01 B\n"
        );
    }

    // =======================================================================
    // GET /api/logs/full
    // =======================================================================
    #[tokio::test]
    async fn test_full_missing_returns_404() {
        let (state, _tmp) = make_test_state(Duration::ZERO).await;
        let app = create_router(state);

        let response = app.oneshot(get("/api/logs/full")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_full_returns_attachment() {
        let (state, tmp) = make_test_state(Duration::ZERO).await;
        std::fs::write(tmp.path().join("application.log"), "Test log content.").unwrap();
        let app = create_router(state);

        let response = app.oneshot(get("/api/logs/full")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=application.log"
        );
        assert_eq!(body_string(response.into_body()).await, "Test log content.");
    }
}
