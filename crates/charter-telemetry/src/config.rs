//! Combined logging and metrics settings.

use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;

/// Service name used when none is given.
pub const DEFAULT_SERVICE_NAME: &str = "charter";

/// Everything [`init_telemetry`](crate::init_telemetry) needs.
///
/// `service_name` is authoritative: the builder copies it into the logging
/// and metrics sections so the three never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Name reported in logs and metrics.
    pub service_name: String,

    /// Prometheus recorder settings.
    pub metrics: MetricsConfig,

    /// Subscriber settings.
    pub logging: LogConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TelemetryConfig {
    /// Starts a builder seeded with production logging.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::default()
    }

    /// Pretty debug logs for `service_name`.
    #[must_use]
    pub fn development(service_name: &str) -> Self {
        Self::builder()
            .service_name(service_name)
            .logging(LogConfig::development())
            .build()
    }

    /// JSON info logs for `service_name`.
    #[must_use]
    pub fn production(service_name: &str) -> Self {
        Self::builder().service_name(service_name).build()
    }
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug, Clone)]
#[must_use]
pub struct TelemetryConfigBuilder {
    service_name: String,
    logging: LogConfig,
    metrics: MetricsConfig,
}

impl Default for TelemetryConfigBuilder {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            logging: LogConfig::production(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl TelemetryConfigBuilder {
    /// Sets the service name.
    pub fn service_name(mut self, name: &str) -> Self {
        self.service_name = name.to_string();
        self
    }

    /// Replaces the logging section.
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Replaces the metrics section.
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    /// Overrides only the filter directive.
    pub fn log_level(mut self, level: &str) -> Self {
        self.logging.level = level.to_string();
        self
    }

    /// Turns metrics recording on or off.
    pub fn metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics.enabled = enabled;
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let Self {
            service_name,
            logging,
            metrics,
        } = self;

        TelemetryConfig {
            logging: LogConfig {
                service_name: service_name.clone(),
                ..logging
            },
            metrics: MetricsConfig {
                service_name: service_name.clone(),
                ..metrics
            },
            service_name,
        }
    }
}
