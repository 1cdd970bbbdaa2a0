//! JSON Schema documents as contract schemas.

use crate::error::ContractError;
use crate::schema::{Schema, SchemaViolation, SharedSchema};
use jsonschema::Validator;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A [`Schema`] backed by a JSON Schema document.
///
/// Validation never coerces: the returned value is the input unchanged.
/// All reported errors are joined into one violation message.
///
/// # Example
///
/// ```
/// use charter_core::{JsonSchemaDocument, Schema};
/// use serde_json::json;
///
/// let schema = JsonSchemaDocument::new(json!({
///     "type": "object",
///     "properties": {"message": {"type": "string"}},
///     "required": ["message"]
/// }))
/// .unwrap();
///
/// assert!(schema.validate(&json!({"message": "hi"})).is_ok());
/// assert!(schema.validate(&json!({})).is_err());
/// ```
pub struct JsonSchemaDocument {
    document: Value,
    validator: Validator,
}

impl JsonSchemaDocument {
    /// Compiles a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidSchema`] if the document is not a
    /// valid schema.
    pub fn new(document: Value) -> Result<Self, ContractError> {
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| ContractError::InvalidSchema(e.to_string()))?;
        Ok(Self {
            document,
            validator,
        })
    }

    /// Returns the source document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Wraps this schema for use in a contract.
    #[must_use]
    pub fn into_shared(self) -> SharedSchema {
        Arc::new(self)
    }
}

impl fmt::Debug for JsonSchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaDocument")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl Schema for JsonSchemaDocument {
    fn validate(&self, value: &Value) -> Result<Value, SchemaViolation> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|e| e.to_string())
            .collect();

        if errors.is_empty() {
            Ok(value.clone())
        } else {
            Err(SchemaViolation::new("$", errors.join(", ")))
        }
    }

    fn describe(&self) -> Value {
        self.document.clone()
    }
}
