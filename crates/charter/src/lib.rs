//! # Charter
//!
//! **Contract-driven HTTP request and response validation**
//!
//! A route declares once what its path parameters, query, request bodies and
//! responses look like. Charter enforces that declaration on both sides of
//! the handler:
//!
//! - **Request validation**: params and query failures are 404, an
//!   undeclared Content-Type is 415, a body that breaks its schema is 422
//! - **Response validation**: an undeclared status or a body that breaks
//!   the declared schema becomes a 500, so the intended response never
//!   leaves the process
//! - **Panic safety**: handler errors and panics are rendered as 500
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use charter::prelude::*;
//!
//! let contract = RouteDefinition::post()
//!     .params(SchemaSpec::object(vec![(
//!         "thingId",
//!         SchemaSpec::string().required().pattern(r"^\d+$"),
//!     )]))
//!     .body("application/json", thing_schema())
//!     .response(200, ResponseSpec::new("The thing").json(thing_schema()))
//!     .standard_errors()
//!     .at("/things/{thingId}")?;
//!
//! let pipeline = Pipeline::default();
//! let response = pipeline
//!     .handle(&Arc::new(contract), &raw_params, request, |req| async move {
//!         let body = req.body().cloned();
//!         Ok(req.respond(&body, 200).await)
//!     })
//!     .await;
//! ```
//!
//! ## Flow
//!
//! ```text
//! Request → params → query → body → Handler
//!                                      ↓
//! Response ← ErrorRenderer ← response validation
//! ```

#![doc(html_root_url = "https://docs.rs/charter/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Contract model
pub use charter_core as core;

// Validation pipeline
pub use charter_pipeline as pipeline;

// Logging and metrics
pub use charter_telemetry as telemetry;

// Layered configuration
pub use charter_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use charter::prelude::*;
/// ```
pub mod prelude {
    pub use charter_core::{
        ContractError, ContractRegistry, HttpError, HttpErrorKind, HttpResult,
        JsonSchemaDocument, PathParams, PathPattern, RegistryBuilder, RequestBody, ResponseSpec,
        RouteContract, RouteDefinition, Schema, SchemaSpec, SharedSchema, ValidationTarget,
    };

    pub use charter_pipeline::{
        error_handler, ErrorFormat, ErrorRenderer, Pipeline, PipelineOptions, Responder,
        Response, ResponseValidation, ValidatedRequest, ValidationOutcome,
    };

    pub use charter_telemetry::{init_telemetry, TelemetryConfig};

    pub use charter_config::{CharterConfig, ConfigLoader};
}
