//! The validating request pipeline.
//!
//! ## Stages
//!
//! Every request moves through a fixed sequence and stops at the first
//! failure:
//!
//! 1. **Params** - path parameters against the params schema (404)
//! 2. **Query** - query string against the query schema (404)
//! 3. **Body** - content type resolution (415), then decoding and the body
//!    schema (422)
//! 4. **Handler** - errors and panics become rendered errors
//! 5. **Response** - the handler's response against the declared statuses
//!    and schemas (500)
//!
//! The body is only read when the contract declares one, so a request that
//! fails the params stage never has its body touched. The content type is
//! checked before the body is read, and the read stops at
//! `max_body_size` bytes.

use crate::context::{Responder, ValidatedRequest};
use crate::options::PipelineOptions;
use crate::render::{panic_message, renderer_for, SharedRenderer};
use crate::types::{fallback_response, mark_checked, mark_checked_for, ContractChecked, Response};
use crate::validator::ContractValidator;
use charter_core::{HttpError, HttpErrorKind, HttpResult, PathParams, RouteContract, ValidationTarget};
use charter_telemetry::{record_request, record_validation_failure, InFlightGuard};
use futures_util::FutureExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Request};
use http_body::Body;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Boxed error type accepted from request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of validating a request.
#[derive(Debug)]
pub enum ValidationOutcome {
    /// The request satisfied the contract.
    Success(ValidatedRequest),

    /// The request was rejected; the response is the rendered error.
    Failure(Response),
}

impl ValidationOutcome {
    /// Returns true for [`ValidationOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the rendered error response on failure.
    pub fn into_result(self) -> Result<ValidatedRequest, Response> {
        match self {
            Self::Success(request) => Ok(request),
            Self::Failure(response) => Err(response),
        }
    }
}

/// Validates requests and responses against route contracts.
///
/// A pipeline holds only options and a renderer. It is cheap to clone and
/// can be shared across tasks.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new(PipelineOptions::default());
///
/// let response = pipeline
///     .handle(&contract, &params, request, |req| async move {
///         let body = req.body().cloned();
///         Ok(req.respond(&body, 200).await)
///     })
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
    renderer: SharedRenderer,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl Pipeline {
    /// Creates a pipeline with the renderer selected by
    /// `options.error_format`.
    #[must_use]
    pub fn new(options: PipelineOptions) -> Self {
        let renderer = renderer_for(options.error_format);
        Self { options, renderer }
    }

    /// Replaces the error renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: SharedRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Returns the error renderer.
    #[must_use]
    pub fn renderer(&self) -> &SharedRenderer {
        &self.renderer
    }

    /// Validates a request, rendering any failure.
    pub async fn validate_request<B>(
        &self,
        contract: &Arc<RouteContract>,
        raw_params: &PathParams,
        request: Request<B>,
    ) -> ValidationOutcome
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        match self.try_validate_request(contract, raw_params, request).await {
            Ok(validated) => ValidationOutcome::Success(validated),
            Err(error) => ValidationOutcome::Failure(self.render_error(error)),
        }
    }

    /// Validates a request.
    ///
    /// # Errors
    ///
    /// Returns the [`HttpError`] of the first stage that fails.
    pub async fn try_validate_request<B>(
        &self,
        contract: &Arc<RouteContract>,
        raw_params: &PathParams,
        request: Request<B>,
    ) -> HttpResult<ValidatedRequest>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let validator = ContractValidator::new(contract, self.options.response_validation);
        let (parts, body) = request.into_parts();

        let params = validator
            .validate_params(raw_params)
            .map_err(|e| observe(ValidationTarget::Params, e))?;

        let query = validator
            .validate_query(&parts.uri)
            .map_err(|e| observe(ValidationTarget::Query, e))?;

        let body = match contract.request_body() {
            Some(request_body) => {
                let content_type = content_type(&parts.headers)
                    .map_err(|e| observe(ValidationTarget::RequestBody, e))?;
                let known_empty = body.is_end_stream() || body.size_hint().exact() == Some(0);
                if !request_body.is_required() && known_empty {
                    None
                } else {
                    if request_body.is_required() || content_type.is_some() {
                        validator
                            .check_content_type(content_type)
                            .map_err(|e| observe(ValidationTarget::RequestBody, e))?;
                    }
                    let bytes = self
                        .read_body(body)
                        .await
                        .map_err(|e| observe(ValidationTarget::RequestBody, e))?;
                    validator
                        .validate_body(content_type, bytes)
                        .await
                        .map_err(|e| observe(ValidationTarget::RequestBody, e))?
                }
            }
            None => None,
        };

        Ok(ValidatedRequest::new(
            params,
            query,
            body,
            parts,
            Responder::new(self.clone(), Arc::clone(contract)),
        ))
    }

    /// Validates a handler response.
    ///
    /// Responses this pipeline already checked against `contract`, and
    /// rendered errors, pass through. A response that breaks the contract is
    /// replaced by the rendered 500.
    pub async fn validate_response(
        &self,
        contract: &Arc<RouteContract>,
        response: Response,
    ) -> Response {
        let (mut parts, body) = response.into_parts();
        if let Some(marker) = parts.extensions.remove::<ContractChecked>() {
            if marker.covers(contract) {
                parts.extensions.insert(marker);
                return Response::from_parts(parts, body);
            }
        }
        if !self.options.validate_responses {
            return mark_checked_for(Response::from_parts(parts, body), contract);
        }

        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let validator = ContractValidator::new(contract, self.options.response_validation);
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        match validator
            .validate_response(parts.status, content_type, &bytes)
            .await
        {
            Ok(()) => mark_checked_for(Response::from_parts(parts, Full::new(bytes)), contract),
            Err(error) => self.render_error(observe(ValidationTarget::ResponseBody, error)),
        }
    }

    /// Runs the whole exchange: request validation, the handler and
    /// response validation.
    ///
    /// Never fails and never panics; every failure is a rendered response.
    /// A panic in the handler is reported as `Handler panicked: ...`, one
    /// anywhere else (a schema, a custom renderer) as
    /// `Validation panicked: ...`.
    pub async fn handle<B, H, Fut>(
        &self,
        contract: &Arc<RouteContract>,
        raw_params: &PathParams,
        request: Request<B>,
        handler: H,
    ) -> Response
    where
        B: Body,
        B::Error: Into<BoxError>,
        H: FnOnce(ValidatedRequest) -> Fut,
        Fut: Future<Output = anyhow::Result<Response>>,
    {
        let route = contract.path().as_str();
        let span = tracing::info_span!(
            "charter.request",
            request_id = %Uuid::now_v7(),
            http.method = %request.method(),
            http.route = route,
            http.path = request.uri().path(),
            http.status_code = tracing::field::Empty,
        );

        let _in_flight = InFlightGuard::new();
        let start = Instant::now();

        let response = match AssertUnwindSafe(self.run(contract, raw_params, request, handler))
            .catch_unwind()
            .instrument(span.clone())
            .await
        {
            Ok(response) => response,
            Err(panic) => {
                let error = HttpError::internal(panic_message("Validation", panic.as_ref()));
                match std::panic::catch_unwind(AssertUnwindSafe(|| self.render_error(error))) {
                    Ok(response) => response,
                    Err(_) => fallback_response(),
                }
            }
        };

        let status = response.status().as_u16();
        span.record("http.status_code", status);
        record_request(route, status, start.elapsed());
        response
    }

    async fn run<B, H, Fut>(
        &self,
        contract: &Arc<RouteContract>,
        raw_params: &PathParams,
        request: Request<B>,
        handler: H,
    ) -> Response
    where
        B: Body,
        B::Error: Into<BoxError>,
        H: FnOnce(ValidatedRequest) -> Fut,
        Fut: Future<Output = anyhow::Result<Response>>,
    {
        let validated = match self.try_validate_request(contract, raw_params, request).await {
            Ok(validated) => validated,
            Err(error) => return self.render_error(error),
        };

        match AssertUnwindSafe(async move { handler(validated).await })
            .catch_unwind()
            .await
        {
            Ok(Ok(response)) => self.validate_response(contract, response).await,
            Ok(Err(error)) => self.render_error(HttpError::from_handler_error(error)),
            Err(panic) => {
                self.render_error(HttpError::internal(panic_message("Handler", panic.as_ref())))
            }
        }
    }

    /// Logs an error and renders it.
    ///
    /// 500 messages are replaced by "Internal Server Error" unless
    /// `expose_internal_errors` is set.
    #[must_use]
    pub fn render_error(&self, error: HttpError) -> Response {
        if error.kind() == HttpErrorKind::Internal {
            tracing::error!(
                error = %error,
                cause = ?std::error::Error::source(&error),
                "request failed"
            );
        } else {
            tracing::debug!(
                status = error.status_code().as_u16(),
                error = %error,
                "request rejected"
            );
        }

        let error = if error.kind() == HttpErrorKind::Internal && !self.options.expose_internal_errors {
            HttpError::internal("Internal Server Error")
        } else {
            error
        };

        mark_checked(self.renderer.render(&error))
    }

    async fn read_body<B>(&self, body: B) -> HttpResult<Bytes>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let limit = self.options.max_body_size;
        match Limited::new(body, limit).collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) if e.is::<LengthLimitError>() => Err(HttpError::unprocessable_entity(format!(
                "Request body exceeds {limit} bytes"
            ))),
            Err(e) => Err(HttpError::internal_with_source(
                "Failed to read request body",
                anyhow::anyhow!(e),
            )),
        }
    }
}

fn observe(target: ValidationTarget, error: HttpError) -> HttpError {
    record_validation_failure(target.as_str(), error.status_code().as_u16());
    error
}

fn content_type(headers: &HeaderMap) -> HttpResult<Option<&str>> {
    headers
        .get(CONTENT_TYPE)
        .map(|v| {
            v.to_str()
                .map_err(|_| HttpError::unsupported_media_type("Invalid Content-Type header"))
        })
        .transpose()
}
