//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use http_body_util::Full;
use serde::Serialize;

/// Boundary used by [`TestRequestBuilder::multipart_text`].
pub const MULTIPART_BOUNDARY: &str = "charter-test-boundary";

/// A request that can be sent through a [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Bytes,
}

impl TestRequest {
    /// Creates a GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Creates a DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts this request to an HTTP request.
    ///
    /// # Errors
    ///
    /// Returns `TestError::RequestBuild` if the parts are rejected by
    /// `http::Request::builder`.
    pub fn into_http_request(self) -> Result<http::Request<Full<Bytes>>, TestError> {
        let mut builder = http::Request::builder().method(self.method).uri(self.uri);

        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }

        builder
            .body(Full::new(self.body))
            .map_err(|e| TestError::RequestBuild(e.to_string()))
    }
}

/// Builder for test requests.
///
/// Invalid headers or bodies are reported by [`build`](Self::build) rather
/// than at the call that introduced them.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    query: Vec<String>,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Sets a header.
    ///
    /// ```ignore
    /// let request = TestRequest::get("/things")
    ///     .header("X-Request-ID", "12345")
    ///     .build()?;
    /// ```
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = match HeaderName::try_from(name.as_ref()) {
            Ok(name) => name,
            Err(e) => return self.fail(TestError::InvalidHeader(e.to_string())),
        };
        let value = match HeaderValue::try_from(value.as_ref()) {
            Ok(value) => value,
            Err(e) => return self.fail(TestError::InvalidHeader(e.to_string())),
        };
        self.headers.insert(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Appends a percent-encoded query parameter.
    pub fn query(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.query.push(format!(
            "{}={}",
            urlencoding::encode(name.as_ref()),
            urlencoding::encode(value.as_ref())
        ));
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Some(Bytes::from(bytes));
                self.content_type("application/json")
            }
            Err(e) => self.fail(TestError::Json(e)),
        }
    }

    /// Sets a form body and `Content-Type: application/x-www-form-urlencoded`.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(encoded) => {
                self.body = Some(Bytes::from(encoded));
                self.content_type("application/x-www-form-urlencoded")
            }
            Err(e) => self.fail(TestError::RequestBuild(format!("form encoding failed: {e}"))),
        }
    }

    /// Sets a `multipart/form-data` body made of text fields.
    pub fn multipart_text(mut self, fields: &[(&str, &str)]) -> Self {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));

        self.body = Some(Bytes::from(body));
        self.content_type(format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"))
    }

    fn fail(mut self, error: TestError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by the builder, or
    /// `TestError::RequestBuild` for an invalid URI.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut uri = self.uri;
        if !self.query.is_empty() {
            uri.push(if uri.contains('?') { '&' } else { '?' });
            uri.push_str(&self.query.join("&"));
        }

        let uri: Uri = uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("Invalid URI: {e}")))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }

    /// Builds the request and converts it to an HTTP request.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn into_http_request(self) -> Result<http::Request<Full<Bytes>>, TestError> {
        self.build()?.into_http_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_methods() {
        assert_eq!(TestRequest::get("/things").build().unwrap().method, Method::GET);
        assert_eq!(TestRequest::post("/things").build().unwrap().method, Method::POST);
        assert_eq!(TestRequest::put("/things/1").build().unwrap().method, Method::PUT);
        assert_eq!(TestRequest::patch("/things/1").build().unwrap().method, Method::PATCH);
        assert_eq!(
            TestRequest::delete("/things/1").build().unwrap().method,
            Method::DELETE
        );
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/things/1")
            .json(&json!({"name": "foo"}))
            .build()
            .unwrap();

        assert_eq!(request.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(request.body.as_ref(), b"{\"name\":\"foo\"}");
    }

    #[test]
    fn test_form_body() {
        let request = TestRequest::post("/things/1")
            .form(&[("name", "foo"), ("description", "a b")])
            .build()
            .unwrap();

        assert_eq!(
            request.headers.get("Content-Type").unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.body.as_ref(), b"name=foo&description=a+b");
    }

    #[test]
    fn test_multipart_body() {
        let request = TestRequest::post("/things/1")
            .multipart_text(&[("name", "foo")])
            .build()
            .unwrap();

        assert_eq!(
            request.headers.get("Content-Type").unwrap(),
            "multipart/form-data; boundary=charter-test-boundary"
        );
        let body = String::from_utf8(request.body.to_vec()).unwrap();
        assert!(body.contains("name=\"name\"\r\n\r\nfoo\r\n"));
        assert!(body.ends_with("--charter-test-boundary--\r\n"));
    }

    #[test]
    fn test_query_encoding() {
        let request = TestRequest::get("/things?page=1")
            .query("q", "a b&c")
            .build()
            .unwrap();
        assert_eq!(request.uri.query(), Some("page=1&q=a%20b%26c"));
    }

    #[test]
    fn test_invalid_header_reported_at_build() {
        let result = TestRequest::get("/things")
            .header("bad header", "x")
            .build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn test_invalid_uri() {
        let result = TestRequest::get("not a uri").build();
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }

    #[test]
    fn test_into_http_request() {
        let request = TestRequest::get("/things")
            .header("X-Test", "value")
            .into_http_request()
            .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), "/things");
        assert_eq!(request.headers().get("X-Test").unwrap(), "value");
    }
}
