//! Per-stage validation against a route contract.
//!
//! Each stage returns [`HttpResult`]; the error kind already carries the
//! status the client should see (404 for params and query, 415 or 422 for
//! the request body, 500 for the response).

use crate::decode::{decode_body, decode_query, BodyFormat};
use crate::options::ResponseValidation;
use bytes::Bytes;
use charter_core::contract::media_type_essence;
use charter_core::{
    HttpError, HttpResult, PathParams, RequestBody, RouteContract, Schema, SharedSchema,
    ValidationTarget,
};
use http::{StatusCode, Uri};
use serde_json::Value;

/// Validates the parts of one exchange against a contract.
#[derive(Debug, Clone, Copy)]
pub struct ContractValidator<'a> {
    contract: &'a RouteContract,
    response_validation: ResponseValidation,
}

impl<'a> ContractValidator<'a> {
    /// Creates a validator for `contract`.
    #[must_use]
    pub fn new(contract: &'a RouteContract, response_validation: ResponseValidation) -> Self {
        Self {
            contract,
            response_validation,
        }
    }

    /// Validates raw path parameters.
    ///
    /// A route without placeholders and without a params schema yields an
    /// empty object. A route with placeholders must declare a schema.
    ///
    /// # Errors
    ///
    /// `NotFound` if the parameters fail the schema; `Internal` if the
    /// schema is missing.
    pub fn validate_params(&self, raw: &PathParams) -> HttpResult<Value> {
        let value = raw.to_json();
        match self.contract.params_schema() {
            Some(schema) => check(ValidationTarget::Params, schema.as_ref(), value),
            None if self.contract.path().names().is_empty() => Ok(value),
            None => Err(HttpError::internal(format!(
                "No params schema for {} {}",
                self.contract.method(),
                self.contract.path()
            ))),
        }
    }

    /// Validates the query string of `uri`.
    ///
    /// Without a query schema the decoded query passes through unchecked.
    ///
    /// # Errors
    ///
    /// `NotFound` if the query cannot be decoded or fails the schema.
    pub fn validate_query(&self, uri: &Uri) -> HttpResult<Value> {
        let schema = self.contract.query_schema().map(|s| &**s);
        let value = decode_query(uri.query().unwrap_or_default(), schema)
            .map_err(|e| HttpError::not_found(format!("Error decoding query: {e}")))?;

        match schema {
            Some(schema) => check(ValidationTarget::Query, schema, value),
            None => Ok(value),
        }
    }

    /// Checks a request content type before the body is read.
    ///
    /// # Errors
    ///
    /// `UnsupportedMediaType` if the content type is missing, undeclared or
    /// has no decoder.
    pub fn check_content_type(&self, content_type: Option<&str>) -> HttpResult<()> {
        match self.contract.request_body() {
            Some(request_body) => resolve_body(request_body, content_type).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Validates a request body.
    ///
    /// Returns `Ok(None)` when the contract declares no body, or when an
    /// optional body is absent.
    ///
    /// # Errors
    ///
    /// `UnsupportedMediaType` for a missing, undeclared or undecodable
    /// content type; `UnprocessableEntity` if decoding or the schema fails.
    pub async fn validate_body(
        &self,
        content_type: Option<&str>,
        body: Bytes,
    ) -> HttpResult<Option<Value>> {
        let Some(request_body) = self.contract.request_body() else {
            return Ok(None);
        };

        if !request_body.is_required() && body.is_empty() {
            return Ok(None);
        }

        let (content_type, schema, format) = resolve_body(request_body, content_type)?;

        let value = decode_body(format, content_type, body, schema.as_ref())
            .await
            .map_err(|e| {
                HttpError::unprocessable_entity(format!("Error decoding requestBody: {e}"))
            })?;

        check(ValidationTarget::RequestBody, schema.as_ref(), value).map(Some)
    }

    /// Validates a handler response.
    ///
    /// The status must be declared. Whether the body is checked depends on
    /// the [`ResponseValidation`] mode; a response with neither body nor
    /// content type passes once its status is declared.
    ///
    /// # Errors
    ///
    /// `Internal` for any mismatch with the contract.
    pub async fn validate_response(
        &self,
        status: StatusCode,
        content_type: Option<&str>,
        body: &Bytes,
    ) -> HttpResult<()> {
        let code = status.as_u16();
        let Some(spec) = self.contract.response(code) else {
            let allowed: Vec<String> = self
                .contract
                .allowed_statuses()
                .iter()
                .map(u16::to_string)
                .collect();
            return Err(HttpError::internal(format!(
                "No response config for status {code}. Allowed statuses: {}",
                allowed.join(", ")
            )));
        };

        if !self.response_validation.applies_to(content_type, body.len()) {
            return Ok(());
        }

        if !spec.has_content() {
            return Err(HttpError::internal(format!(
                "No response config content for status {code}"
            )));
        }

        let Some(content_type) = content_type else {
            return Err(HttpError::internal(format!(
                "No Content-Type on response for status {code}"
            )));
        };

        let Some(schema) = spec.schema_for(content_type) else {
            return Err(HttpError::internal(format!(
                "No response config for Content-Type {content_type} on status {code}"
            )));
        };

        let Some(format) = BodyFormat::from_essence(&media_type_essence(content_type)) else {
            return Err(HttpError::internal(format!(
                "Unsupported response Content-Type: {content_type}"
            )));
        };

        let value = decode_body(format, content_type, body.clone(), schema.as_ref())
            .await
            .map_err(|e| {
                HttpError::internal_with_source(
                    format!("Error decoding responseBody for status {code}"),
                    e,
                )
            })?;

        check(ValidationTarget::ResponseBody, schema.as_ref(), value).map(|_| ())
    }
}

fn resolve_body<'a>(
    request_body: &'a RequestBody,
    content_type: Option<&'a str>,
) -> HttpResult<(&'a str, &'a SharedSchema, BodyFormat)> {
    let Some(content_type) = content_type else {
        return Err(HttpError::unsupported_media_type("No Content-Type header"));
    };

    let Some(schema) = request_body.schema_for(content_type) else {
        return Err(HttpError::unsupported_media_type(format!(
            "No schema for Content-Type: {content_type}"
        )));
    };

    let Some(format) = BodyFormat::from_essence(&media_type_essence(content_type)) else {
        return Err(HttpError::unsupported_media_type(format!(
            "Unsupported Content-Type: {content_type}"
        )));
    };

    Ok((content_type, schema, format))
}

fn check(target: ValidationTarget, schema: &dyn Schema, value: Value) -> HttpResult<Value> {
    schema.validate(&value).map_err(|violation| {
        tracing::debug!(
            stage = target.as_str(),
            violation = %violation,
            "schema validation failed"
        );
        HttpError::validation(target, &value, &schema.describe())
    })
}
