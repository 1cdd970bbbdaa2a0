//! # Charter Core
//!
//! Contract model for the Charter validation pipeline.
//!
//! This crate provides:
//!
//! - [`RouteDefinition`] / [`RouteContract`]: the declared shape of a route
//! - [`Schema`]: the validation capability contracts depend on, with the
//!   built-in [`SchemaSpec`] and the JSON Schema backed [`JsonSchemaDocument`]
//! - [`PathPattern`]: `{name}` placeholder matching
//! - [`HttpError`]: the 404/415/422/500 error taxonomy
//! - [`ContractRegistry`]: the read-only set of contracts built at startup

#![doc(html_root_url = "https://docs.rs/charter-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contract;
mod error;
mod json_schema;
mod params;
pub mod pattern;
mod registry;
mod schema;

pub use contract::{RequestBody, ResponseSpec, RouteContract, RouteDefinition};
pub use error::{
    ContractError, HttpError, HttpErrorKind, HttpResult, ValidationTarget,
};
pub use json_schema::JsonSchemaDocument;
pub use params::PathParams;
pub use pattern::{extract_params, to_colon_pattern, PathPattern};
pub use registry::{ContractRegistry, RegistryBuilder};
pub use schema::{value_type_name, Schema, SchemaPattern, SchemaSpec, SchemaViolation, SharedSchema};
