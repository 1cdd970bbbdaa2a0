//! Observability for Charter: structured logging and Prometheus metrics.
//!
//! The pipeline emits `tracing` spans and `metrics` counters whether or not
//! anything is listening. This crate installs the subscriber and recorder
//! that make them visible.
//!
//! # Example
//!
//! ```rust,ignore
//! use charter_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::production("things-api");
//! init_telemetry(&config)?;
//!
//! // later, from a /metrics handler
//! let body = charter_telemetry::metrics::render_metrics().unwrap_or_default();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{
    init_metrics, record_request, record_validation_failure, render_metrics, InFlightGuard,
    MetricsConfig,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns the first subsystem failure.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
