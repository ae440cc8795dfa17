use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{ApiError, internal_error_response};
use crate::monitoring;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Largest plain-text error body read back by [`json_error_bodies`].
const PLAIN_ERROR_BODY_LIMIT: usize = 16 * 1024;

/// Request ID carried in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    // Reuse a well-formed incoming ID, otherwise mint one
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    response
}

/// Logging and metrics middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::debug!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %start.elapsed().as_millis(),
        request_id = %request_id,
        "Request completed"
    );
    monitoring::record_request(method.as_str(), status.as_u16(), start);

    response
}

/// Rewrites plain-text error responses into the JSON error body.
///
/// axum's extractor rejections and the body limit answer in `text/plain`.
/// Client errors keep their status and message; server errors become the
/// generic 500.
pub async fn json_error_bodies(response: Response) -> Response {
    let status = response.status();
    let plain_text = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/plain"));

    if !plain_text || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let message = match to_bytes(response.into_body(), PLAIN_ERROR_BODY_LIMIT).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => status.canonical_reason().unwrap_or("Request failed").to_string(),
    };

    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), "Unhandled exception: {}", message);
        return internal_error_response();
    }
    ApiError::new(status, message).into_response()
}
