//! Error mapping at the server boundary, exercised through a custom API
//! router mounted under `/api/v1`.

mod common;

use std::sync::Arc;

use ai_engine::Settings;
use ai_engine::error::{ApiError, ApiResult, INTERNAL_ERROR_MESSAGE};
use ai_engine::server::build_router_with;
use ai_engine::state::AppState;
use anyhow::Context;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};

use common::{body_json, get as get_uri, send, test_settings, test_state};

async fn missing_email() -> ApiResult<&'static str> {
    Err(ApiError::not_found("Email 42 not found"))
}

async fn teapot() -> ApiResult<&'static str> {
    Err(ApiError::new(StatusCode::IM_A_TEAPOT, "short and stout"))
}

async fn broken_dependency() -> ApiResult<&'static str> {
    let missing: Result<(), std::io::Error> = Err(std::io::Error::other(
        "secret-password@10.0.0.3 refused connection",
    ));
    missing.context("loading classifier model")?;
    Ok("unreachable")
}

async fn bad_json() -> ApiResult<String> {
    let value: serde_json::Value = serde_json::from_str("{ not json")?;
    Ok(value.to_string())
}

async fn panics() -> &'static str {
    panic!("model tensor shape mismatch at layer 7")
}

async fn upload(body: String) -> String {
    body.len().to_string()
}

async fn classify_email(Json(email): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "subject": email["subject"] }))
}

async fn thread(Path(id): Path<u64>) -> String {
    id.to_string()
}

fn faulty_api() -> Router<Arc<AppState>> {
    Router::new()
        .route("/emails/42", get(missing_email))
        .route("/teapot", get(teapot))
        .route("/classify", get(broken_dependency))
        .route("/parse", get(bad_json))
        .route("/panic", get(panics))
        .route("/upload", post(upload))
        .route("/emails", post(classify_email))
        .route("/threads/{id}", get(thread))
}

fn app_with(settings: Settings) -> Router {
    build_router_with(test_state(settings), faulty_api())
}

fn app() -> Router {
    app_with(test_settings())
}

#[tokio::test]
async fn recognized_404_keeps_status_and_message() {
    let response = get_uri(app(), "/api/v1/emails/42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Email 42 not found" })
    );
}

#[tokio::test]
async fn recognized_fault_with_custom_status() {
    let response = get_uri(app(), "/api/v1/teapot").await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body_json(response).await["error"], "short and stout");
}

#[tokio::test]
async fn unexpected_fault_is_generic_500() {
    let response = get_uri(app(), "/api/v1/classify").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE }));
    let rendered = body.to_string();
    assert!(!rendered.contains("secret-password"));
    assert!(!rendered.contains("classifier"));
}

#[tokio::test]
async fn serde_fault_is_generic_500() {
    let response = get_uri(app(), "/api/v1/parse").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], INTERNAL_ERROR_MESSAGE);
}

#[tokio::test]
async fn panic_is_generic_500() {
    let response = get_uri(app(), "/api/v1/panic").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    assert!(!body.to_string().contains("tensor"));
}

#[tokio::test]
async fn panic_does_not_poison_later_requests() {
    let app = app();
    let response = get_uri(app.clone(), "/api/v1/panic").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = get_uri(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn body_over_max_file_size_is_rejected() {
    let settings = Settings {
        max_file_size_mb: 1,
        ..test_settings()
    };

    let small = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/upload")
        .body(Body::from("x".repeat(1024)))
        .unwrap();
    let response = send(app_with(settings.clone()), small).await;
    assert_eq!(response.status(), StatusCode::OK);

    let large = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/upload")
        .body(Body::from("x".repeat(2 * 1024 * 1024)))
        .unwrap();
    let response = send(app_with(settings), large).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("length limit"));
}

#[tokio::test]
async fn malformed_json_body_is_json_error() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/emails")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ \"subject\": "))
        .unwrap();
    let response = send(app(), request).await;

    assert!(response.status().is_client_error());
    let body = body_json(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn missing_content_type_is_json_415() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/emails")
        .body(Body::from(r#"{ "subject": "Invoice" }"#))
        .unwrap();
    let response = send(app(), request).await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Content-Type"));
}

#[tokio::test]
async fn bad_path_parameter_is_json_400() {
    let response = get_uri(app(), "/api/v1/threads/not-a-number").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn valid_json_body_reaches_handler() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/emails")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{ "subject": "Invoice" }"#))
        .unwrap();
    let response = send(app(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["subject"], "Invoice");
}
