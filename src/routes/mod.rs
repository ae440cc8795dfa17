//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `api`: the versioned router mounted under `/api/v1`
//!
//! The service root, documentation index and fallbacks live here.

pub mod api;
pub mod health;

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;
use crate::{API_PREFIX, APP_DESCRIPTION, DOCS_PATH};

/// Public endpoints: method, path, description.
const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/", "Service information"),
    ("GET", "/health", "Liveness probe"),
    ("GET", "/ready", "Readiness probe with datastore connectivity"),
    ("GET", "/docs", "This endpoint index"),
    ("GET", "/api/v1/metadata", "Service metadata, model settings and limits"),
];

/// Root endpoint
///
/// ```json
/// { "message": "Email Agent AI Engine", "version": "1.0.0", "docs": "/docs" }
/// ```
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "message": state.settings.app_name,
        "version": state.settings.app_version,
        "docs": DOCS_PATH,
    }))
}

/// Endpoint index served at [`DOCS_PATH`].
pub async fn docs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let endpoints: Vec<_> = ENDPOINTS
        .iter()
        .map(|(method, path, description)| {
            json!({ "method": method, "path": path, "description": description })
        })
        .collect();

    Json(json!({
        "name": state.settings.app_name,
        "description": APP_DESCRIPTION,
        "version": state.settings.app_version,
        "api_prefix": API_PREFIX,
        "endpoints": endpoints,
    }))
}

/// 404 Not Found handler
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

/// 405 handler for known paths hit with the wrong method
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
