//! Health check handlers.

use crate::constants::READINESS_TIMEOUT_SECS;
use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

/// Liveness probe, process is running.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Welcome to StudyBudd API" }))
}

/// Readiness probe, database reachable.
pub async fn readiness_check(state: Arc<AppState>) -> impl IntoResponse {
    let timeout = Duration::from_secs(READINESS_TIMEOUT_SECS);

    let (ready, database) =
        match tokio::time::timeout(timeout, state.documents.repository().ping()).await {
            Ok(Ok(())) => (true, "ready".to_string()),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Database readiness check failed");
                (false, format!("not_ready: {}", e))
            }
            Err(_) => {
                tracing::error!("Database readiness check timed out");
                (false, "timeout".to_string())
            }
        };

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}
