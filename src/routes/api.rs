//! Versioned API mounted under `/api/v1`.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::Serialize;

use crate::APP_DESCRIPTION;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/metadata", get(service_metadata))
}

/// Service metadata response
#[derive(Debug, Serialize)]
pub struct ServiceMetadata {
    pub name: String,
    pub description: &'static str,
    pub version: String,
    pub debug: bool,
    pub started_at: String,
    pub uptime_seconds: u64,
    pub models: ModelSettings,
    pub limits: ProcessingLimits,
}

#[derive(Debug, Serialize)]
pub struct ModelSettings {
    pub models_path: String,
    pub spacy_model: String,
    pub classification_confidence_threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct ProcessingLimits {
    pub max_file_size_mb: usize,
    pub pdf_processing_timeout_secs: u64,
}

/// Service metadata endpoint
pub async fn service_metadata(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ServiceMetadata>> {
    let settings = &state.settings;

    Ok(Json(ServiceMetadata {
        name: settings.app_name.clone(),
        description: APP_DESCRIPTION,
        version: settings.app_version.clone(),
        debug: settings.debug,
        started_at: state.started_at().to_rfc3339(),
        uptime_seconds: state.uptime_seconds(),
        models: ModelSettings {
            models_path: settings.models_path.display().to_string(),
            spacy_model: settings.spacy_model.clone(),
            classification_confidence_threshold: settings.classification_confidence_threshold,
        },
        limits: ProcessingLimits {
            max_file_size_mb: settings.max_file_size_mb,
            pdf_processing_timeout_secs: settings.pdf_timeout().as_secs(),
        },
    }))
}
