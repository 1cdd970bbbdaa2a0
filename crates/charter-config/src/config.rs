//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, PipelineConfig, TelemetrySection};
use charter_pipeline::{PipelineOptions, ResponseValidation};
use charter_telemetry::logging::create_env_filter;
use charter_telemetry::TelemetryConfig;

/// Complete Charter configuration.
///
/// ```toml
/// [pipeline]
/// response_validation = "json_only"
/// validate_responses = true
/// error_format = "json"
/// expose_internal_errors = true
/// max_body_size = 1048576
///
/// [telemetry]
/// service_name = "things-api"
///
/// [telemetry.logging]
/// level = "info"
/// format = "json"
///
/// [telemetry.metrics]
/// enabled = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct CharterConfig {
    /// Pipeline behavior.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl CharterConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the service name is empty or
    /// the log level is not a valid filter directive, and
    /// `ConfigError::ValidationError` if `response_validation = "all"` is
    /// set while response validation is switched off.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        if let Err(e) = create_env_filter(&self.telemetry.logging.level) {
            return Err(ConfigError::invalid(
                "telemetry.logging.level",
                e.to_string(),
            ));
        }

        if self.pipeline.response_validation == ResponseValidation::All
            && !self.pipeline.validate_responses
        {
            return Err(ConfigError::ValidationError(
                "pipeline.response_validation = \"all\" requires pipeline.validate_responses"
                    .to_string(),
            ));
        }

        if self.pipeline.max_body_size == 0 {
            return Err(ConfigError::invalid(
                "pipeline.max_body_size",
                "must be at least one byte",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, diagnostics exposed.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.pipeline.expose_internal_errors = true;
        config
    }

    /// Production preset: JSON logs, 500 diagnostics hidden from clients.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.pipeline.expose_internal_errors = false;
        config
    }

    /// Pipeline options for this configuration.
    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::from(&self.pipeline)
    }

    /// Telemetry configuration for this configuration.
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        self.telemetry.to_telemetry_config()
    }
}
