//! Error types for Charter.
//!
//! [`HttpError`] is the unit of propagated failure inside the validation
//! pipeline. Each variant carries a fixed HTTP status and a human-readable
//! message:
//!
//! | Variant | Status | Raised when |
//! |---|---|---|
//! | `NotFound` | 404 | path parameters or query fail their schema |
//! | `UnsupportedMediaType` | 415 | the request `Content-Type` is missing, undeclared or not decodable |
//! | `UnprocessableEntity` | 422 | a body of a supported type fails decoding or its schema |
//! | `Internal` | 500 | the response breaks the contract, or the handler fails |
//!
//! [`ContractError`] covers authoring mistakes detected while contracts are
//! built at startup.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type alias using [`HttpError`].
pub type HttpResult<T> = Result<T, HttpError>;

/// The kind of an [`HttpError`], independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpErrorKind {
    /// Path parameters or query did not validate.
    NotFound,
    /// The request content type cannot be handled.
    UnsupportedMediaType,
    /// The request body did not validate.
    UnprocessableEntity,
    /// The server or the contract is at fault.
    Internal,
}

impl HttpErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable label, used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::Internal => "internal",
        }
    }
}

/// Typed HTTP failure.
///
/// # Example
///
/// ```
/// use charter_core::HttpError;
/// use http::StatusCode;
///
/// let error = HttpError::not_found("no such thing");
/// assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(error.message(), "no such thing");
/// ```
#[derive(Error, Debug)]
pub enum HttpError {
    /// Path parameters or query failed validation.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// The request `Content-Type` is missing or unsupported.
    #[error("Unsupported media type: {message}")]
    UnsupportedMediaType {
        /// Human-readable error message.
        message: String,
    },

    /// The request body failed decoding or validation.
    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error, kept for diagnostics.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HttpError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an unsupported media type error.
    #[must_use]
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            message: message.into(),
        }
    }

    /// Creates an unprocessable entity error.
    #[must_use]
    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        Self::UnprocessableEntity {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates the error for a value that failed a contract schema.
    ///
    /// The message embeds the offending value and the schema description,
    /// both as pretty-printed JSON. The kind follows from `target`.
    #[must_use]
    pub fn validation(target: ValidationTarget, value: &Value, schema: &Value) -> Self {
        let message = format!(
            "Error validating {}: {}\n\nSchema: {}",
            target.as_str(),
            pretty_json(value),
            pretty_json(schema)
        );

        match target.error_kind() {
            HttpErrorKind::NotFound => Self::not_found(message),
            HttpErrorKind::UnsupportedMediaType => Self::unsupported_media_type(message),
            HttpErrorKind::UnprocessableEntity => Self::unprocessable_entity(message),
            HttpErrorKind::Internal => Self::internal(message),
        }
    }

    /// Converts an error returned by handler code.
    ///
    /// An `HttpError` raised by the handler keeps its kind. Anything else
    /// becomes `Internal`, with the original error kept as the source.
    #[must_use]
    pub fn from_handler_error(error: anyhow::Error) -> Self {
        match error.downcast::<Self>() {
            Ok(http_error) => http_error,
            Err(other) => Self::Internal {
                message: other.to_string(),
                source: Some(other),
            },
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> HttpErrorKind {
        match self {
            Self::NotFound { .. } => HttpErrorKind::NotFound,
            Self::UnsupportedMediaType { .. } => HttpErrorKind::UnsupportedMediaType,
            Self::UnprocessableEntity { .. } => HttpErrorKind::UnprocessableEntity,
            Self::Internal { .. } => HttpErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Returns the bare message, without the kind prefix used by `Display`.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message }
            | Self::UnsupportedMediaType { message }
            | Self::UnprocessableEntity { message }
            | Self::Internal { message, .. } => message,
        }
    }
}

/// The part of an exchange being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationTarget {
    /// Path parameters.
    Params,
    /// Query string.
    Query,
    /// Request body.
    RequestBody,
    /// Response body.
    ResponseBody,
}

impl ValidationTarget {
    /// Returns the name used in validation messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::Query => "query",
            Self::RequestBody => "requestBody",
            Self::ResponseBody => "responseBody",
        }
    }

    /// Returns the error kind raised when this target fails validation.
    #[must_use]
    pub const fn error_kind(&self) -> HttpErrorKind {
        match self {
            Self::Params | Self::Query => HttpErrorKind::NotFound,
            Self::RequestBody => HttpErrorKind::UnprocessableEntity,
            Self::ResponseBody => HttpErrorKind::Internal,
        }
    }
}

/// Errors raised while building contracts and registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The path pattern is malformed.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A placeholder name appears twice in one pattern.
    #[error("duplicate placeholder '{name}' in path pattern '{pattern}'")]
    DuplicatePlaceholder {
        /// The offending pattern.
        pattern: String,
        /// The repeated placeholder name.
        name: String,
    },

    /// The same method and pattern were registered twice.
    #[error("route {method} {path} is already registered")]
    DuplicateRoute {
        /// HTTP method.
        method: String,
        /// Path pattern.
        path: String,
    },

    /// A JSON Schema document could not be compiled.
    #[error("invalid schema document: {0}")]
    InvalidSchema(String),
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        assert_eq!(HttpError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            HttpError::unsupported_media_type("x").status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            HttpError::unprocessable_entity("x").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            HttpError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_and_message() {
        let error = HttpError::unsupported_media_type("No Content-Type header");
        assert_eq!(error.to_string(), "Unsupported media type: No Content-Type header");
        assert_eq!(error.message(), "No Content-Type header");
    }

    #[test]
    fn test_validation_message_embeds_value_and_schema() {
        let value = json!({"thingId": "xyz"});
        let schema = json!({"type": "object"});
        let error = HttpError::validation(ValidationTarget::Params, &value, &schema);

        assert_eq!(error.kind(), HttpErrorKind::NotFound);
        assert!(error.message().starts_with("Error validating params: {"));
        assert!(error.message().contains("\"thingId\": \"xyz\""));
        assert!(error.message().contains("\n\nSchema: {"));
        assert!(error.message().contains("\"type\": \"object\""));
    }

    #[test]
    fn test_validation_target_kinds() {
        assert_eq!(ValidationTarget::Query.error_kind(), HttpErrorKind::NotFound);
        assert_eq!(
            ValidationTarget::RequestBody.error_kind(),
            HttpErrorKind::UnprocessableEntity
        );
        assert_eq!(
            ValidationTarget::ResponseBody.error_kind(),
            HttpErrorKind::Internal
        );
        assert_eq!(ValidationTarget::RequestBody.as_str(), "requestBody");
    }

    #[test]
    fn test_from_handler_error_keeps_http_errors() {
        let error = HttpError::from_handler_error(HttpError::not_found("gone").into());
        assert_eq!(error.kind(), HttpErrorKind::NotFound);
        assert_eq!(error.message(), "gone");
    }

    #[test]
    fn test_from_handler_error_wraps_other_errors() {
        let error = HttpError::from_handler_error(anyhow::anyhow!("database offline"));
        assert_eq!(error.kind(), HttpErrorKind::Internal);
        assert_eq!(error.message(), "database offline");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_internal_with_source() {
        let io = std::io::Error::other("disk full");
        let error = HttpError::internal_with_source("write failed", io);
        let source = std::error::Error::source(&error).expect("source");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn test_contract_error_display() {
        let error = ContractError::DuplicateRoute {
            method: "POST".to_string(),
            path: "/things/{thingId}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "route POST /things/{thingId} is already registered"
        );
    }
}
