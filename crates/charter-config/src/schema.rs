//! Configuration section types.

use charter_pipeline::{ErrorFormat, PipelineOptions, ResponseValidation, DEFAULT_MAX_BODY_SIZE};
use charter_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

/// Pipeline section.
///
/// # Example
///
/// ```
/// use charter_config::PipelineConfig;
/// use charter_pipeline::{PipelineOptions, ResponseValidation};
///
/// let config = PipelineConfig {
///     response_validation: ResponseValidation::All,
///     ..Default::default()
/// };
/// let options = PipelineOptions::from(&config);
/// assert_eq!(options.response_validation, ResponseValidation::All);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Which response bodies are validated (`json_only` or `all`).
    #[serde(default)]
    pub response_validation: ResponseValidation,

    /// Validate handler responses at all.
    #[serde(default = "default_true")]
    pub validate_responses: bool,

    /// Error body format (`json` or `text`).
    #[serde(default)]
    pub error_format: ErrorFormat,

    /// Send 500 diagnostics to clients.
    #[serde(default = "default_true")]
    pub expose_internal_errors: bool,

    /// Largest request body read, in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            response_validation: ResponseValidation::default(),
            validate_responses: true,
            error_format: ErrorFormat::default(),
            expose_internal_errors: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self::new()
            .response_validation(config.response_validation)
            .validate_responses(config.validate_responses)
            .error_format(config.error_format)
            .expose_internal_errors(config.expose_internal_errors)
            .max_body_size(config.max_body_size)
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Telemetry section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl TelemetrySection {
    /// Builds the runtime telemetry configuration.
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        let preset = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };

        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .logging(LogConfig {
                enabled: self.logging.enabled,
                level: self.logging.level.clone(),
                ..preset
            })
            .metrics(MetricsConfig {
                enabled: self.metrics.enabled,
                ..MetricsConfig::default()
            })
            .build()
    }
}

fn default_true() -> bool {
    true
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "charter".to_string()
}
