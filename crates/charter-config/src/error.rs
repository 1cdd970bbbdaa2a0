//! Errors raised while assembling a [`CharterConfig`](crate::CharterConfig).

use std::path::PathBuf;
use thiserror::Error;

/// A configuration layer could not be applied.
///
/// Every variant names the source that failed, so a startup failure points
/// at the file, variable or field to fix.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A file passed to `with_file` does not exist.
    #[error("config file {path} does not exist")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A config file exists but could not be read.
    #[error("cannot read config file {path}")]
    ReadError {
        /// The unreadable path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// TOML content is malformed or has unknown keys.
    #[error("invalid TOML config: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON content is malformed or has unknown keys.
    #[error("invalid JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The file extension or format name is neither TOML nor JSON.
    #[error("unsupported config format '{format}' (expected toml or json)")]
    UnsupportedFormat {
        /// The rejected extension or format name.
        format: String,
    },

    /// A `.env` file exists but could not be parsed.
    #[error("cannot load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// A `PREFIX__SECTION__KEY` override has a value of the wrong shape.
    #[error("{var}: {reason}")]
    EnvParseError {
        /// Variable name.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// A loaded value is out of range.
    #[error("{field} is invalid: {reason}")]
    InvalidValue {
        /// Dotted path of the field, e.g. `telemetry.logging.level`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Cross-field validation failed.
    #[error("config rejected: {0}")]
    ValidationError(String),
}

impl ConfigError {
    pub(crate) fn env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }
}
