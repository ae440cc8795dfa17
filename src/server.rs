//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with the public endpoints and the `/api/v1` router
//! - Middleware stack (CORS, request IDs, logging, panics, body limit)
//! - The lifespan: datastore and monitoring startup, shutdown logging
//! - Graceful shutdown handling

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware::{from_fn, map_response};
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::database::init_database;
use crate::error::handle_panic;
use crate::middleware::{json_error_bodies, log_requests, request_id};
use crate::monitoring::{MonitoringStatus, setup_monitoring};
use crate::routes::{self, api, health};
use crate::state::AppState;
use crate::{API_PREFIX, DOCS_PATH};

/// Cross-origin policy: configured origins, credentials allowed, any method
/// and header.
///
/// Wildcard methods and headers cannot be combined with credentials, so the
/// request's own values are mirrored instead. A `*` origin mirrors the
/// request origin.
pub fn build_cors(settings: &Settings) -> CorsLayer {
    let origin = if settings.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = settings
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the router with the built-in `/api/v1` routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    build_router_with(state, api::router())
}

/// Build the Axum router, mounting `api` under `/api/v1`.
///
/// Middleware stack (outermost first):
/// 1. Tracing spans
/// 2. CORS
/// 3. Request ID tracking
/// 4. Request logging and metrics
/// 5. Compression
/// 6. Panic to 500 mapping
/// 7. JSON bodies for plain-text rejections
/// 8. Body size limit
pub fn build_router_with(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    let cors = build_cors(&state.settings);
    let body_limit = state.settings.max_file_size_bytes();

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route(DOCS_PATH, get(routes::docs))
        .nest(API_PREFIX, api)
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(map_response(json_error_bodies))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CompressionLayer::new())
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Lifespan startup: initialize datastores, then monitoring.
///
/// Any error here aborts launch before the listener accepts traffic.
pub async fn startup(settings: Settings) -> anyhow::Result<Arc<AppState>> {
    tracing::info!("Starting {}...", settings.app_name);

    let datastores = init_database(&settings).await?;
    let monitoring = setup_monitoring(&settings).await?;

    if settings.debug {
        tracing::info!("Debug mode: verbose HTTP tracing enabled");
    }
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        cors_origins = ?settings.cors_origins,
        metrics = matches!(monitoring, MonitoringStatus::Exporting(_)),
        datastores_ready = datastores.is_ready(),
        "{} started successfully",
        settings.app_name
    );

    Ok(Arc::new(AppState::new(settings, datastores)))
}

/// Start the AI engine HTTP server
///
/// Runs the lifespan startup, binds `HOST:PORT` and serves until SIGTERM or
/// Ctrl+C.
pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    let state = startup(settings).await?;
    let listener = TcpListener::bind(state.settings.bind_target()).await?;
    serve(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `signal` resolves, then run the
/// lifespan shutdown.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let app_name = state.settings.app_name.clone();
    let app = build_router(state);

    tracing::info!(address = %addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await?;

    tracing::info!("Shutting down {}...", app_name);
    Ok(())
}

/// Shutdown signal handler
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
