//! Pipeline options.

use charter_core::contract::{media_type_essence, APPLICATION_JSON};
use serde::{Deserialize, Serialize};

/// Default limit for request bodies (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Which handler responses have their bodies validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseValidation {
    /// Only `application/json` bodies are validated. Other media types pass
    /// once their status is declared.
    #[default]
    JsonOnly,

    /// Every response with a body or a `Content-Type` is validated.
    All,
}

impl ResponseValidation {
    /// Returns true if a response with this content type and body length
    /// must have its body validated.
    #[must_use]
    pub fn applies_to(self, content_type: Option<&str>, body_len: usize) -> bool {
        match self {
            Self::JsonOnly => {
                content_type.is_some_and(|ct| media_type_essence(ct) == APPLICATION_JSON)
            }
            Self::All => content_type.is_some() || body_len > 0,
        }
    }
}

/// Format of rendered error bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFormat {
    /// `{"message": "..."}` as `application/json`.
    #[default]
    Json,

    /// The bare message as `text/plain`.
    Text,
}

/// Options controlling a [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Which response bodies are validated.
    pub response_validation: ResponseValidation,

    /// Whether handler responses are validated at all.
    pub validate_responses: bool,

    /// Format of rendered error bodies.
    pub error_format: ErrorFormat,

    /// Whether 500 responses carry the diagnostic message. When false the
    /// body says only "Internal Server Error"; the cause is still logged.
    pub expose_internal_errors: bool,

    /// Largest request body read, in bytes. Longer bodies are rejected
    /// with 422.
    pub max_body_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            response_validation: ResponseValidation::JsonOnly,
            validate_responses: true,
            error_format: ErrorFormat::Json,
            expose_internal_errors: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl PipelineOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets which response bodies are validated.
    #[must_use]
    pub fn response_validation(mut self, mode: ResponseValidation) -> Self {
        self.response_validation = mode;
        self
    }

    /// Enables or disables response validation.
    #[must_use]
    pub fn validate_responses(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }

    /// Sets the error body format.
    #[must_use]
    pub fn error_format(mut self, format: ErrorFormat) -> Self {
        self.error_format = format;
        self
    }

    /// Sets whether 500 messages are sent to clients.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Sets the request body limit in bytes.
    #[must_use]
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PipelineOptions::default();
        assert_eq!(options.response_validation, ResponseValidation::JsonOnly);
        assert!(options.validate_responses);
        assert_eq!(options.error_format, ErrorFormat::Json);
        assert!(options.expose_internal_errors);
        assert_eq!(options.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn test_json_only_applies_to_json() {
        let mode = ResponseValidation::JsonOnly;
        assert!(mode.applies_to(Some("application/json"), 2));
        assert!(mode.applies_to(Some("application/json; charset=utf-8"), 2));
        assert!(!mode.applies_to(Some("text/plain"), 5));
        assert!(!mode.applies_to(None, 5));
    }

    #[test]
    fn test_all_applies_to_any_body() {
        let mode = ResponseValidation::All;
        assert!(mode.applies_to(Some("text/plain"), 5));
        assert!(mode.applies_to(None, 5));
        assert!(!mode.applies_to(None, 0));
    }

    #[test]
    fn test_serde_names() {
        let mode: ResponseValidation = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(mode, ResponseValidation::All);
        let format: ErrorFormat = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(format, ErrorFormat::Text);
        assert_eq!(
            serde_json::to_string(&ResponseValidation::JsonOnly).unwrap(),
            "\"json_only\""
        );
    }

    #[test]
    fn test_builder() {
        let options = PipelineOptions::new()
            .response_validation(ResponseValidation::All)
            .validate_responses(false)
            .error_format(ErrorFormat::Text)
            .expose_internal_errors(false)
            .max_body_size(64);
        assert_eq!(options.response_validation, ResponseValidation::All);
        assert!(!options.validate_responses);
        assert_eq!(options.error_format, ErrorFormat::Text);
        assert!(!options.expose_internal_errors);
        assert_eq!(options.max_body_size, 64);
    }
}
