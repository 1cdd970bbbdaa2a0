//! Prometheus metrics for Charter.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `charter_requests_total` | Counter | `route`, `status` | Requests handled by the pipeline |
//! | `charter_request_duration_seconds` | Histogram | `route` | Pipeline latency |
//! | `charter_validation_failures_total` | Counter | `stage`, `status` | Rejected validations |
//! | `charter_in_flight_requests` | Gauge | - | Requests inside the pipeline |
//!
//! Recording functions are no-ops until a recorder is installed, so the
//! pipeline records unconditionally.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "charter_requests_total";

/// Request latency histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "charter_request_duration_seconds";

/// Validation failure counter name.
pub const VALIDATION_FAILURES_TOTAL: &str = "charter_validation_failures_total";

/// In-flight gauge name.
pub const IN_FLIGHT_REQUESTS: &str = "charter_in_flight_requests";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Service name.
    pub service_name: String,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "charter".to_string(),
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder.
///
/// The exporter has no listener of its own; the host application serves
/// [`render_metrics`] from whatever endpoint it likes.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for empty duration buckets and
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.duration_buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "duration_buckets must not be empty".to_string(),
        ));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests handled by the pipeline");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        "Time spent in the pipeline, handler included, in seconds"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Total validation failures by stage and status"
    );
    describe_gauge!(
        IN_FLIGHT_REQUESTS,
        "Number of requests currently inside the pipeline"
    );
}

/// Records a completed request.
pub fn record_request(route: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "route" => route.to_string())
        .record(duration.as_secs_f64());
}

/// Records a rejected validation.
///
/// `stage` is one of `params`, `query`, `requestBody` or `responseBody`.
pub fn record_validation_failure(stage: &str, status_code: u16) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "stage" => stage.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);
}

/// Keeps the in-flight gauge raised while alive.
///
/// The gauge is lowered on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Raises the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.service_name, "charter");
        assert_eq!(config.duration_buckets.len(), 12);
    }

    #[test]
    fn test_empty_buckets_rejected() {
        let config = MetricsConfig {
            duration_buckets: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_record_functions_dont_panic() {
        record_request("/things/{thingId}", 200, Duration::from_millis(10));
        record_validation_failure("params", 422);
        let guard = InFlightGuard::new();
        drop(guard);
    }
}
