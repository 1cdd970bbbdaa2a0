//! What a handler receives once a request has passed validation.

use crate::pipeline::Pipeline;
use crate::types::{build_response, Response};
use bytes::Bytes;
use charter_core::contract::APPLICATION_JSON;
use charter_core::{HttpError, HttpResult, RouteContract};
use http::request::Parts;
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// A request whose params, query and body satisfied the route contract.
///
/// The values are the schema outputs, so coercions (for example `"42"` to
/// `42`) are already applied. Typed access goes through serde.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct ThingParams {
///     #[serde(rename = "thingId")]
///     thing_id: String,
/// }
///
/// let params: ThingParams = request.params_as()?;
/// Ok(request.respond(&thing, 200).await)
/// ```
#[derive(Debug)]
pub struct ValidatedRequest {
    params: Value,
    query: Value,
    body: Option<Value>,
    parts: Parts,
    responder: Responder,
}

impl ValidatedRequest {
    pub(crate) fn new(
        params: Value,
        query: Value,
        body: Option<Value>,
        parts: Parts,
        responder: Responder,
    ) -> Self {
        Self {
            params,
            query,
            body,
            parts,
            responder,
        }
    }

    /// Validated path parameters.
    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Validated query.
    #[must_use]
    pub fn query(&self) -> &Value {
        &self.query
    }

    /// Validated body, if the contract declares one and it was sent.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Takes the validated body out of the request.
    pub fn take_body(&mut self) -> Option<Value> {
        self.body.take()
    }

    /// Request head.
    #[must_use]
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Deserializes the validated params.
    ///
    /// # Errors
    ///
    /// `Internal` if the handler's type disagrees with the schema.
    pub fn params_as<T: DeserializeOwned>(&self) -> HttpResult<T> {
        from_validated("params", self.params.clone())
    }

    /// Deserializes the validated query.
    ///
    /// # Errors
    ///
    /// `Internal` if the handler's type disagrees with the schema.
    pub fn query_as<T: DeserializeOwned>(&self) -> HttpResult<T> {
        from_validated("query", self.query.clone())
    }

    /// Deserializes the validated body. An absent body deserializes from
    /// `null`, so `Option<T>` accepts it.
    ///
    /// # Errors
    ///
    /// `Internal` if the handler's type disagrees with the schema.
    pub fn body_as<T: DeserializeOwned>(&self) -> HttpResult<T> {
        from_validated("requestBody", self.body.clone().unwrap_or(Value::Null))
    }

    /// The responder bound to this request's contract.
    #[must_use]
    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Shorthand for [`Responder::respond`].
    pub async fn respond<T: Serialize + ?Sized>(&self, body: &T, status: u16) -> Response {
        self.responder.respond(body, status).await
    }
}

fn from_validated<T: DeserializeOwned>(target: &str, value: Value) -> HttpResult<T> {
    serde_json::from_value(value).map_err(|e| {
        HttpError::internal_with_source(
            format!("Validated {target} do not match the handler type"),
            e,
        )
    })
}

/// Builds responses that are checked against the route contract.
///
/// A response that breaks the contract comes back as the rendered 500
/// instead, so the intended status never reaches the client.
#[derive(Debug, Clone)]
pub struct Responder {
    pipeline: Pipeline,
    contract: Arc<RouteContract>,
}

impl Responder {
    pub(crate) fn new(pipeline: Pipeline, contract: Arc<RouteContract>) -> Self {
        Self { pipeline, contract }
    }

    /// Serializes `body` as JSON and validates it for `status`.
    pub async fn respond<T: Serialize + ?Sized>(&self, body: &T, status: u16) -> Response {
        let Ok(status_code) = StatusCode::from_u16(status) else {
            return self
                .pipeline
                .render_error(HttpError::internal(format!("Invalid status code {status}")));
        };

        match serde_json::to_vec(body) {
            Ok(bytes) => {
                self.respond_bytes(status_code, APPLICATION_JSON, Bytes::from(bytes))
                    .await
            }
            Err(e) => self.pipeline.render_error(HttpError::internal_with_source(
                "Failed to serialize response body",
                e,
            )),
        }
    }

    /// Validates a pre-encoded body of any media type.
    pub async fn respond_bytes(
        &self,
        status: StatusCode,
        content_type: &str,
        body: Bytes,
    ) -> Response {
        let response = build_response(status, content_type, body);
        self.pipeline.validate_response(&self.contract, response).await
    }

    /// Validates a response with neither body nor content type.
    pub async fn respond_empty(&self, status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        self.pipeline.validate_response(&self.contract, response).await
    }

    /// The contract responses are checked against.
    #[must_use]
    pub fn contract(&self) -> &Arc<RouteContract> {
        &self.contract
    }
}
