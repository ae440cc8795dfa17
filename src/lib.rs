//! Email Agent AI Engine - HTTP service bootstrap
//!
//! This crate wires the engine's HTTP surface and its environment-driven
//! settings:
//!
//! - **Settings**: a flat, fully defaulted record loaded from the process
//!   environment and an optional `.env` file ([`config`])
//! - **Lifespan**: datastore connectivity and the metrics exporter are set up
//!   before traffic is accepted ([`server::startup`])
//! - **Error mapping**: recognized faults keep their status and message,
//!   anything else becomes a generic 500 ([`error`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ai_engine::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     ai_engine::server::start_server(settings).await
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - Service information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe with datastore connectivity
//! - `GET /docs` - Endpoint index
//! - `GET /api/v1/metadata` - Service metadata, model settings and limits

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod monitoring;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Settings, SettingsError, get_settings};
pub use error::{ApiError, ApiResult};
pub use server::{build_router, start_server};
pub use state::AppState;

/// Service identifier reported by `/health`.
pub const SERVICE_ID: &str = "ai-engine";

pub const APP_DESCRIPTION: &str = "AI-powered email and document processing engine";

/// Prefix the versioned API router is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Documentation path advertised by `GET /`.
pub const DOCS_PATH: &str = "/docs";
