//! # Charter Pipeline
//!
//! Validates HTTP exchanges against [`RouteContract`](charter_core::RouteContract)s.
//!
//! The [`Pipeline`] checks path parameters, query and body before a
//! handler runs, and the handler's response after it returns. Failures are
//! rendered by an [`ErrorRenderer`]:
//!
//! | Stage | Failure status |
//! |-------|----------------|
//! | params, query | 404 |
//! | body content type | 415 |
//! | body decoding or schema | 422 |
//! | response, handler error, panic | 500 |
//!
//! The pipeline is transport-agnostic: it takes an `http::Request` and the
//! raw path parameters the caller's router extracted, and returns an
//! `http::Response`.

#![doc(html_root_url = "https://docs.rs/charter-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod decode;
mod options;
mod pipeline;
mod render;
mod types;
mod validator;

pub use context::{Responder, ValidatedRequest};
pub use options::{ErrorFormat, PipelineOptions, ResponseValidation, DEFAULT_MAX_BODY_SIZE};
pub use pipeline::{BoxError, Pipeline, ValidationOutcome};
pub use render::{
    error_handler, renderer_for, ErrorRenderer, JsonErrorRenderer, SharedRenderer,
    TextErrorRenderer,
};
pub use types::{build_response, fallback_response, ContractChecked, Response, ResponseExt};
pub use validator::ContractValidator;
