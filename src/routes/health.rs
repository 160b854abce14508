use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use docrag_api::RequestParams;
use serde_json::json;

use super::AppState;

/// GET /health - Liveness check
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// GET /ready - Readiness check
///
/// Ready once the backend answers its health endpoint.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.api.health(RequestParams::default()).await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "ready"}))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed: backend unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "reason": "backend_unavailable"
                })),
            )
        }
    }
}
