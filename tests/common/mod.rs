//! Shared helpers for the HTTP integration tests.

use std::sync::Arc;

use ai_engine::config::Settings;
use ai_engine::database::Datastores;
use ai_engine::state::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Settings used by the HTTP tests; metrics stay off so no recorder is
/// installed.
pub fn test_settings() -> Settings {
    Settings {
        metrics_enabled: false,
        ..Settings::default()
    }
}

/// State with unprobed datastores.
pub fn test_state(settings: Settings) -> Arc<AppState> {
    let datastores = Datastores::from_settings(&settings).expect("default urls parse");
    Arc::new(AppState::new(settings, datastores))
}

#[allow(dead_code)]
pub fn test_app() -> Router {
    ai_engine::build_router(test_state(test_settings()))
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
