//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A collected response with assertion helpers.
///
/// Assertions panic with the status and body in the message, so a failing
/// test shows what the pipeline actually returned.
#[derive(Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects an HTTP response.
    ///
    /// # Errors
    ///
    /// Returns `TestError::BodyRead` if the body stream fails.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body::Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a response from raw parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true for 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers.get(name.as_ref()).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `TestError::BodyRead` if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `TestError::Json` if the body does not deserialize into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Returns the `message` field of a JSON error body.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.json::<Value>()
            .ok()?
            .get("message")?
            .as_str()
            .map(ToString::to_string)
    }

    fn describe(&self) -> String {
        format!(
            "status {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        )
    }

    /// Asserts the status.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    #[track_caller]
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "expected status {expected}, got {}",
            self.describe()
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        match self.header_str(name) {
            Some(actual) => assert_eq!(
                actual, expected,
                "expected header {name}: {expected}, got {actual}"
            ),
            None => panic!("expected header {name}: {expected}, header missing"),
        }
        self
    }

    /// Asserts the Content-Type starts with `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the Content-Type is missing or does not match.
    #[track_caller]
    pub fn assert_content_type(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let actual = self.content_type().unwrap_or_default();
        assert!(
            actual.starts_with(expected),
            "expected Content-Type {expected}, got {actual:?}"
        );
        self
    }

    /// Asserts the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or differs from `expected`.
    #[track_caller]
    pub fn assert_json(&self, expected: &Value) -> &Self {
        match self.json::<Value>() {
            Ok(actual) => assert_eq!(&actual, expected, "JSON body mismatch"),
            Err(e) => panic!("expected JSON body, got {}: {e}", self.describe()),
        }
        self
    }

    /// Asserts the error body's `message` contains `expected`.
    ///
    /// # Panics
    ///
    /// Panics if there is no `message` field or it does not contain
    /// `expected`.
    #[track_caller]
    pub fn assert_message_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        match self.error_message() {
            Some(message) => assert!(
                message.contains(expected),
                "expected message containing {expected:?}, got {message:?}"
            ),
            None => panic!("expected error message, got {}", self.describe()),
        }
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .finish()
    }
}
