//! Route contracts.
//!
//! A contract describes one route: its method, path pattern, the schemas
//! for path parameters, query and request body, and the schema of every
//! response it may emit.
//!
//! Contracts are built in two phases. A [`RouteDefinition`] carries
//! everything except the path, so it can be declared next to its handler.
//! Whatever discovers the route later supplies the path with
//! [`RouteDefinition::at`], producing an immutable [`RouteContract`].
//!
//! # Example
//!
//! ```
//! use charter_core::contract::{ResponseSpec, RouteDefinition};
//! use charter_core::SchemaSpec;
//!
//! let thing = SchemaSpec::object(vec![
//!     ("name", SchemaSpec::string().pattern("[a-z]+").required()),
//!     ("description", SchemaSpec::string().pattern("[a-z]+").required()),
//! ]);
//!
//! let contract = RouteDefinition::post()
//!     .params(SchemaSpec::object(vec![(
//!         "thingId",
//!         SchemaSpec::string().pattern(r"[\d]+").required(),
//!     )]))
//!     .body("application/json", thing.clone())
//!     .response(200, ResponseSpec::new("Create a thing").json(thing))
//!     .standard_errors()
//!     .at("/things/{thingId}")
//!     .unwrap();
//!
//! assert_eq!(contract.path().as_str(), "/things/{thingId}");
//! assert_eq!(contract.allowed_statuses(), vec![200, 404, 415, 422, 500]);
//! ```

use crate::error::ContractError;
use crate::params::PathParams;
use crate::pattern::PathPattern;
use crate::schema::{Schema, SchemaSpec, SharedSchema};
use http::Method;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// Returns the essence of a media type: `type/subtype`, lowercase, without
/// parameters.
///
/// ```
/// use charter_core::contract::media_type_essence;
///
/// assert_eq!(media_type_essence("Application/JSON; charset=utf-8"), "application/json");
/// ```
#[must_use]
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Schema for the `{message}` body of error responses.
#[must_use]
pub fn error_schema() -> SchemaSpec {
    SchemaSpec::object(vec![("message", SchemaSpec::string().required())])
}

/// Request body declaration: one schema per accepted media type.
#[derive(Debug, Clone)]
pub struct RequestBody {
    content: IndexMap<String, SharedSchema>,
    required: bool,
}

impl RequestBody {
    /// Returns the schema declared for a media type, matched by essence.
    #[must_use]
    pub fn schema_for(&self, content_type: &str) -> Option<&SharedSchema> {
        self.content.get(&media_type_essence(content_type))
    }

    /// Returns the declared media types, in declaration order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(String::as_str)
    }

    /// Returns whether a request must carry a body.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Declaration of one response status.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    description: String,
    content: IndexMap<String, SharedSchema>,
}

impl ResponseSpec {
    /// Creates a response declaration without content.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: IndexMap::new(),
        }
    }

    /// Declares the body schema for a media type.
    #[must_use]
    pub fn content<S: Schema + 'static>(self, content_type: &str, schema: S) -> Self {
        self.content_shared(content_type, Arc::new(schema))
    }

    /// Declares an already shared body schema for a media type.
    #[must_use]
    pub fn content_shared(mut self, content_type: &str, schema: SharedSchema) -> Self {
        self.content.insert(media_type_essence(content_type), schema);
        self
    }

    /// Declares an `application/json` body schema.
    #[must_use]
    pub fn json<S: Schema + 'static>(self, schema: S) -> Self {
        self.content(APPLICATION_JSON, schema)
    }

    /// The shared 404 declaration.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new("Not Found").json(error_schema())
    }

    /// The shared 415 declaration.
    #[must_use]
    pub fn unsupported_media_type() -> Self {
        Self::new("Unsupported Media Type").json(error_schema())
    }

    /// The shared 422 declaration.
    #[must_use]
    pub fn unprocessable_entity() -> Self {
        Self::new("Unprocessable Entity").json(error_schema())
    }

    /// The shared 500 declaration.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new("Internal Server Error").json(error_schema())
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the schema declared for a media type, matched by essence.
    #[must_use]
    pub fn schema_for(&self, content_type: &str) -> Option<&SharedSchema> {
        self.content.get(&media_type_essence(content_type))
    }

    /// Returns the declared media types, in declaration order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(String::as_str)
    }

    /// Returns whether any content is declared.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

/// A route contract without a path.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    method: Method,
    operation_id: Option<String>,
    description: Option<String>,
    params: Option<SharedSchema>,
    query: Option<SharedSchema>,
    request_body: Option<RequestBody>,
    responses: BTreeMap<u16, ResponseSpec>,
}

impl RouteDefinition {
    /// Creates a definition for `method`.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            operation_id: None,
            description: None,
            params: None,
            query: None,
            request_body: None,
            responses: BTreeMap::new(),
        }
    }

    /// Creates a GET definition.
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// Creates a POST definition.
    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Creates a PUT definition.
    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    /// Creates a PATCH definition.
    #[must_use]
    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    /// Creates a DELETE definition.
    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Sets the operation ID.
    #[must_use]
    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the path parameter schema.
    #[must_use]
    pub fn params<S: Schema + 'static>(mut self, schema: S) -> Self {
        self.params = Some(Arc::new(schema));
        self
    }

    /// Sets the query schema.
    #[must_use]
    pub fn query<S: Schema + 'static>(mut self, schema: S) -> Self {
        self.query = Some(Arc::new(schema));
        self
    }

    /// Accepts a request body of `content_type` validated by `schema`.
    #[must_use]
    pub fn body<S: Schema + 'static>(self, content_type: &str, schema: S) -> Self {
        self.body_shared(content_type, Arc::new(schema))
    }

    /// Accepts a request body of `content_type` validated by a shared schema.
    #[must_use]
    pub fn body_shared(mut self, content_type: &str, schema: SharedSchema) -> Self {
        let body = self.request_body.get_or_insert_with(|| RequestBody {
            content: IndexMap::new(),
            required: true,
        });
        body.content.insert(media_type_essence(content_type), schema);
        self
    }

    /// Lets requests omit the body entirely.
    #[must_use]
    pub fn body_optional(mut self) -> Self {
        if let Some(body) = self.request_body.as_mut() {
            body.required = false;
        }
        self
    }

    /// Declares a response status.
    #[must_use]
    pub fn response(mut self, status: u16, spec: ResponseSpec) -> Self {
        self.responses.insert(status, spec);
        self
    }

    /// Declares the shared 404, 415, 422 and 500 responses.
    #[must_use]
    pub fn standard_errors(self) -> Self {
        self.response(404, ResponseSpec::not_found())
            .response(415, ResponseSpec::unsupported_media_type())
            .response(422, ResponseSpec::unprocessable_entity())
            .response(500, ResponseSpec::internal_error())
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Binds the definition to a path pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractError`] if the pattern is malformed.
    pub fn at(self, path: &str) -> Result<RouteContract, ContractError> {
        let path = PathPattern::parse(path)?;
        Ok(RouteContract {
            method: self.method,
            path,
            operation_id: self.operation_id,
            description: self.description,
            params: self.params,
            query: self.query,
            request_body: self.request_body,
            responses: self.responses,
        })
    }
}

/// An immutable route contract.
#[derive(Debug, Clone)]
pub struct RouteContract {
    method: Method,
    path: PathPattern,
    operation_id: Option<String>,
    description: Option<String>,
    params: Option<SharedSchema>,
    query: Option<SharedSchema>,
    request_body: Option<RequestBody>,
    responses: BTreeMap<u16, ResponseSpec>,
}

impl RouteContract {
    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    /// Returns the operation ID, if set.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns the description, if set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the path parameter schema.
    #[must_use]
    pub fn params_schema(&self) -> Option<&SharedSchema> {
        self.params.as_ref()
    }

    /// Returns the query schema.
    #[must_use]
    pub fn query_schema(&self) -> Option<&SharedSchema> {
        self.query.as_ref()
    }

    /// Returns the request body declaration.
    #[must_use]
    pub fn request_body(&self) -> Option<&RequestBody> {
        self.request_body.as_ref()
    }

    /// Returns the declaration for a response status.
    #[must_use]
    pub fn response(&self, status: u16) -> Option<&ResponseSpec> {
        self.responses.get(&status)
    }

    /// Returns all response declarations, ordered by status.
    pub fn responses(&self) -> impl Iterator<Item = (u16, &ResponseSpec)> {
        self.responses.iter().map(|(status, spec)| (*status, spec))
    }

    /// Returns the declared statuses in ascending order.
    #[must_use]
    pub fn allowed_statuses(&self) -> Vec<u16> {
        self.responses.keys().copied().collect()
    }

    /// Extracts raw path parameters from a concrete path.
    #[must_use]
    pub fn extract_params(&self, path: &str) -> PathParams {
        self.path.extract(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thing() -> SchemaSpec {
        SchemaSpec::object(vec![
            ("name", SchemaSpec::string().required()),
            ("description", SchemaSpec::string().required()),
        ])
    }

    #[test]
    fn test_two_phase_construction() {
        let definition = RouteDefinition::post()
            .operation_id("createThing")
            .body("application/json", thing())
            .response(200, ResponseSpec::new("Created").json(thing()));
        assert_eq!(definition.method(), &Method::POST);

        let contract = definition.at("/things/{thingId}").unwrap();
        assert_eq!(contract.method(), &Method::POST);
        assert_eq!(contract.path().names(), ["thingId"]);
        assert_eq!(contract.operation_id(), Some("createThing"));
        assert_eq!(contract.extract_params("/things/5").get("thingId"), Some("5"));
    }

    #[test]
    fn test_at_rejects_bad_pattern() {
        let result = RouteDefinition::get().at("/things/{thingId");
        assert!(matches!(result, Err(ContractError::InvalidPattern { .. })));
    }

    #[test]
    fn test_request_body_lookup_by_essence() {
        let contract = RouteDefinition::post()
            .body("application/json", thing())
            .body("Application/X-WWW-Form-Urlencoded", thing())
            .at("/things")
            .unwrap();

        let body = contract.request_body().unwrap();
        assert!(body.is_required());
        assert!(body.schema_for("application/json; charset=utf-8").is_some());
        assert!(body.schema_for("application/x-www-form-urlencoded").is_some());
        assert!(body.schema_for("text/csv").is_none());
        assert_eq!(
            body.content_types().collect::<Vec<_>>(),
            vec!["application/json", "application/x-www-form-urlencoded"]
        );
    }

    #[test]
    fn test_body_optional() {
        let contract = RouteDefinition::patch()
            .body("application/json", thing())
            .body_optional()
            .at("/things")
            .unwrap();
        assert!(!contract.request_body().unwrap().is_required());
        assert!(RouteDefinition::get().at("/").unwrap().request_body().is_none());
    }

    #[test]
    fn test_standard_errors() {
        let contract = RouteDefinition::get()
            .response(200, ResponseSpec::new("OK"))
            .standard_errors()
            .at("/things")
            .unwrap();

        assert_eq!(contract.allowed_statuses(), vec![200, 404, 415, 422, 500]);
        let not_found = contract.response(404).unwrap();
        assert_eq!(not_found.description(), "Not Found");
        let schema = not_found.schema_for(APPLICATION_JSON).unwrap();
        assert!(schema.validate(&json!({"message": "gone"})).is_ok());
        assert!(schema.validate(&json!({"msg": "gone"})).is_err());
        assert!(!contract.response(200).unwrap().has_content());
    }

    #[test]
    fn test_error_schema_describe() {
        assert_eq!(
            error_schema().describe(),
            json!({
                "type": "object",
                "properties": {"message": {"type": "string"}},
                "required": ["message"]
            })
        );
    }
}
