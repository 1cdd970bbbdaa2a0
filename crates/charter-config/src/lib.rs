//! Typed configuration for Charter.
//!
//! - TOML and JSON files
//! - Environment overrides (`CHARTER__SECTION__KEY`)
//! - Strict parsing: unknown fields are errors
//! - Layered loading: defaults, then file, then environment
//!
//! # Example
//!
//! ```no_run
//! use charter_config::ConfigLoader;
//! use charter_pipeline::Pipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("charter.toml")?
//!     .with_env_prefix("CHARTER")
//!     .load()?;
//!
//! charter_telemetry::init_telemetry(&config.telemetry_config())?;
//! let pipeline = Pipeline::new(config.pipeline_options());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::CharterConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingSection, MetricsSection, PipelineConfig, TelemetrySection};
