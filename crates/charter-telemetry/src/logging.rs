//! Structured logging for Charter.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and either a
//! JSON layer (production) or a pretty layer (development). The pipeline logs
//! through `tracing` and never installs a subscriber itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use charter_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(http.route = "/things/{thingId}", "contract registered");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// How request logs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. "info", "charter_pipeline=debug").
    pub level: String,

    /// Whether to output JSON.
    pub json_format: bool,

    /// Whether to log span open and close events.
    pub span_events: bool,

    /// Whether to include file and line.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include the target module path.
    pub include_target: bool,

    /// Service name recorded on the root span by callers.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Human-readable output at debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "charter".to_string(),
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "charter".to_string(),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing when logging is disabled.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;
    let events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = tracing_subscriber::fmt::layer()
        .with_span_events(events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_thread_ids(config.thread_ids)
        .with_target(config.include_target);

    let output: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        base.json().boxed()
    } else {
        base.pretty().boxed()
    };

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(format!("subscriber already installed: {e}")))
}

/// Parses a filter directive.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Field names shared by pipeline log events.
pub mod fields {
    /// Per-request correlation ID.
    pub const REQUEST_ID: &str = "request_id";

    /// HTTP method.
    pub const HTTP_METHOD: &str = "http.method";

    /// Route pattern.
    pub const HTTP_ROUTE: &str = "http.route";

    /// Concrete request path.
    pub const HTTP_PATH: &str = "http.path";

    /// Response status.
    pub const HTTP_STATUS: &str = "http.status_code";

    /// Validation stage that failed.
    pub const VALIDATION_STAGE: &str = "validation.stage";

    /// Error description.
    pub const ERROR: &str = "error";
}
