//! Error-to-response mapping.
//!
//! An [`ErrorRenderer`] turns an [`HttpError`] into the response a client
//! sees. Both built-in renderers mark their output as
//! [`ContractChecked`](crate::ContractChecked) for every contract.

use crate::options::ErrorFormat;
use crate::types::{build_response, fallback_response, mark_checked, Response};
use bytes::Bytes;
use charter_core::HttpError;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Renders errors as responses.
pub trait ErrorRenderer: fmt::Debug + Send + Sync {
    /// Builds the response for `error`. The status is the error's status.
    fn render(&self, error: &HttpError) -> Response;
}

/// A renderer shared between pipelines and handlers.
pub type SharedRenderer = Arc<dyn ErrorRenderer>;

/// Renders `{"message": "..."}` as `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorRenderer;

impl ErrorRenderer for JsonErrorRenderer {
    fn render(&self, error: &HttpError) -> Response {
        let body = serde_json::json!({ "message": error.message() });
        match serde_json::to_vec(&body) {
            Ok(bytes) => mark_checked(build_response(
                error.status_code(),
                "application/json",
                Bytes::from(bytes),
            )),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize error body");
                fallback_response()
            }
        }
    }
}

/// Renders the bare message as `text/plain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextErrorRenderer;

impl ErrorRenderer for TextErrorRenderer {
    fn render(&self, error: &HttpError) -> Response {
        mark_checked(build_response(
            error.status_code(),
            "text/plain; charset=utf-8",
            Bytes::from(error.message().to_string()),
        ))
    }
}

/// Returns the built-in renderer for a format.
#[must_use]
pub fn renderer_for(format: ErrorFormat) -> SharedRenderer {
    match format {
        ErrorFormat::Json => Arc::new(JsonErrorRenderer),
        ErrorFormat::Text => Arc::new(TextErrorRenderer),
    }
}

/// Wraps a fallible async handler so that it always yields a response.
///
/// Errors are converted with [`HttpError::from_handler_error`] and rendered
/// with `renderer`. A panic inside the handler is rendered as a 500.
///
/// # Example
///
/// ```
/// use charter_pipeline::{error_handler, JsonErrorRenderer, Response};
/// use charter_core::HttpError;
/// use std::sync::Arc;
///
/// let handler = error_handler(Arc::new(JsonErrorRenderer), |id: u32| async move {
///     Err::<Response, _>(anyhow::Error::from(HttpError::not_found(format!("no thing {id}"))))
/// });
///
/// let response = tokio_test::block_on(handler(7));
/// assert_eq!(response.status(), 404);
/// ```
pub fn error_handler<R, F, Fut>(
    renderer: SharedRenderer,
    handler: F,
) -> impl Fn(R) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static
where
    R: Send + 'static,
    F: Fn(R) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
{
    move |request| {
        let handler = handler.clone();
        let renderer = Arc::clone(&renderer);
        async move {
            match AssertUnwindSafe(async move { handler(request).await })
                .catch_unwind()
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(error)) => renderer.render(&HttpError::from_handler_error(error)),
                Err(panic) => renderer.render(&HttpError::internal(panic_message("Handler", panic.as_ref()))),
            }
        }
        .boxed()
    }
}

/// Describes a caught panic payload, prefixed with where it was caught.
pub(crate) fn panic_message(origin: &str, payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("{origin} panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("{origin} panicked: {message}")
    } else {
        format!("{origin} panicked")
    }
}
