//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use charter_pipeline::{ErrorFormat, ResponseValidation};

use crate::{CharterConfig, ConfigError, LogFormat};

/// Loads a [`CharterConfig`] in layers.
///
/// Later layers override earlier ones:
/// 1. Defaults or a preset
/// 2. A TOML or JSON file (replaces the whole configuration)
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use charter_config::ConfigLoader;
///
/// # fn main() -> Result<(), charter_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("charter.toml")?
///     .with_env_prefix("CHARTER")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CharterConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CharterConfig::default(),
            env_prefix: None,
        }
    }

    /// Resets to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = CharterConfig::default();
        self
    }

    /// Starts from the development preset.
    ///
    /// ```
    /// use charter_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = CharterConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = CharterConfig::production();
        self
    }

    /// Loads a configuration file. The format follows the extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed
    /// or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Loads a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `format` ("toml" or "json").
    ///
    /// ```
    /// use charter_config::ConfigLoader;
    /// use charter_pipeline::ResponseValidation;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[pipeline]\nresponse_validation = \"all\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.pipeline.response_validation, ResponseValidation::All);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported(format)),
        };
        Ok(self)
    }

    /// Enables environment overrides of the form `PREFIX__SECTION__KEY`,
    /// for example `CHARTER__PIPELINE__RESPONSE_VALIDATION=all`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file into the process environment, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if a `.env` file exists but
    /// cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<CharterConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without environment overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> CharterConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<CharterConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::unsupported(other.unwrap_or_default())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["PIPELINE", "RESPONSE_VALIDATION"] => {
                self.config.pipeline.response_validation = match value.to_lowercase().as_str() {
                    "json_only" => ResponseValidation::JsonOnly,
                    "all" => ResponseValidation::All,
                    _ => {
                        return Err(ConfigError::env(
                            key,
                            "expected 'json_only' or 'all'",
                        ))
                    }
                };
            }
            ["PIPELINE", "VALIDATE_RESPONSES"] => {
                self.config.pipeline.validate_responses = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            ["PIPELINE", "ERROR_FORMAT"] => {
                self.config.pipeline.error_format = match value.to_lowercase().as_str() {
                    "json" => ErrorFormat::Json,
                    "text" => ErrorFormat::Text,
                    _ => {
                        return Err(ConfigError::env(key, "expected 'json' or 'text'"))
                    }
                };
            }
            ["PIPELINE", "EXPOSE_INTERNAL_ERRORS"] => {
                self.config.pipeline.expose_internal_errors = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            ["PIPELINE", "MAX_BODY_SIZE"] => {
                self.config.pipeline.max_body_size = value
                    .parse()
                    .map_err(|_| ConfigError::env(key, "expected byte count"))?;
            }
            ["TELEMETRY", "SERVICE_NAME"] => {
                self.config.telemetry.service_name = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                self.config.telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                self.config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                self.config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                self.config.telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, CharterConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
        assert!(!config.pipeline.expose_internal_errors);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"pipeline": {"error_format": "text"}, "telemetry": {"service_name": "things-api"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.pipeline.error_format, ErrorFormat::Text);
        assert_eq!(config.telemetry.service_name, "things-api");
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[pipeline]\nvalidate_responses = false\n\n[telemetry.logging]\nlevel = \"warn\""
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.pipeline.validate_responses);
        assert_eq!(config.telemetry.logging.level, "warn");
    }

    #[test]
    fn test_loader_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::UnsupportedFormat { format }) if format == "yaml"
        ));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/charter.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/charter.toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config, CharterConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[telemetry.logging]\nlevel = \"info=[\"", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_apply_env_var_pipeline() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__PIPELINE__RESPONSE_VALIDATION", "all", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__PIPELINE__VALIDATE_RESPONSES", "off", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__PIPELINE__ERROR_FORMAT", "TEXT", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__PIPELINE__EXPOSE_INTERNAL_ERRORS", "0", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__PIPELINE__MAX_BODY_SIZE", "2048", "TEST")
            .unwrap();

        let pipeline = &loader.config.pipeline;
        assert_eq!(pipeline.response_validation, ResponseValidation::All);
        assert!(!pipeline.validate_responses);
        assert_eq!(pipeline.error_format, ErrorFormat::Text);
        assert!(!pipeline.expose_internal_errors);
        assert_eq!(pipeline.max_body_size, 2048);
    }

    #[test]
    fn test_apply_env_var_telemetry() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__TELEMETRY__SERVICE_NAME", "things-api", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__METRICS__ENABLED", "false", "TEST")
            .unwrap();

        let telemetry = &loader.config.telemetry;
        assert_eq!(telemetry.service_name, "things-api");
        assert_eq!(telemetry.logging.format, LogFormat::Pretty);
        assert!(!telemetry.metrics.enabled);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(matches!(
            loader.apply_env_var("TEST__PIPELINE__VALIDATE_RESPONSES", "maybe", "TEST"),
            Err(ConfigError::EnvParseError { .. })
        ));
        assert!(loader
            .apply_env_var("TEST__PIPELINE__RESPONSE_VALIDATION", "some", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__PIPELINE__MAX_BODY_SIZE", "1mb", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SERVER__HTTP_ADDR", "0.0.0.0:1", "TEST")
            .unwrap();
        loader.apply_env_var("TESTING", "x", "TEST").unwrap();
        assert_eq!(loader.config, CharterConfig::default());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
