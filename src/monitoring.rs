//! Metrics collection and exposition.
//!
//! [`setup_monitoring`] installs the Prometheus exporter as the global
//! `metrics` recorder. Until it runs, [`record_request`] is a no-op, so
//! handlers and tests never depend on the exporter being present.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method and status
//! - `http_request_duration_seconds` (histogram): latency by method

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tokio::net::lookup_host;

use crate::config::Settings;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

#[derive(Debug, thiserror::Error)]
pub enum MonitoringError {
    #[error("invalid metrics address {target}: {reason}")]
    Address { target: String, reason: String },

    #[error("failed to install Prometheus exporter: {0}")]
    Exporter(#[from] BuildError),
}

/// Outcome of [`setup_monitoring`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringStatus {
    Disabled,
    Exporting(SocketAddr),
}

/// Install the process-wide metrics exporter when `METRICS_ENABLED` is set.
///
/// Must be called at most once per process: the global recorder cannot be
/// replaced, and a second install fails with [`MonitoringError::Exporter`].
pub async fn setup_monitoring(settings: &Settings) -> Result<MonitoringStatus, MonitoringError> {
    if !settings.metrics_enabled {
        tracing::info!("Metrics disabled");
        return Ok(MonitoringStatus::Disabled);
    }

    let addr = metrics_addr(settings).await?;
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();

    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(MonitoringStatus::Exporting(addr))
}

/// Resolve the exporter bind address from `HOST` and `METRICS_PORT`.
pub async fn metrics_addr(settings: &Settings) -> Result<SocketAddr, MonitoringError> {
    let (host, port) = settings.metrics_target();
    let address_error = |reason: String| MonitoringError::Address {
        target: format!("{host}:{port}"),
        reason,
    };

    lookup_host((host, port))
        .await
        .map_err(|e| address_error(e.to_string()))?
        .next()
        .ok_or_else(|| address_error("no address resolved".to_string()))
}

fn describe_metrics() {
    describe_counter!(HTTP_REQUESTS_TOTAL, Unit::Count, "Total HTTP requests served");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "HTTP request latency"
    );
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, started: Instant) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(started.elapsed().as_secs_f64());
}
