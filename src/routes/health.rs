use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::SERVICE_ID;
use crate::state::AppState;

/// Health check endpoint (liveness)
/// Returns 200 while the process is serving
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_ID,
        "version": state.settings.app_version,
    }))
}

/// Readiness check endpoint
///
/// Reports the datastore probes taken at startup; 503 when any datastore
/// was unreachable.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ready = state.datastores.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if ready { "ready" } else { "degraded" },
            "service": SERVICE_ID,
            "uptime_seconds": state.uptime_seconds(),
            "datastores": state.datastores.statuses(),
        })),
    )
}
