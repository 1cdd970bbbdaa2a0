//! Schemas for contract validation.
//!
//! Contracts do not depend on a particular validation library. They hold
//! values implementing [`Schema`], which can validate (and coerce) a JSON
//! value and describe itself as JSON Schema for diagnostics and
//! documentation tooling.
//!
//! Two implementations ship with the crate:
//!
//! - [`SchemaSpec`], a small declarative schema built in code.
//! - [`JsonSchemaDocument`](crate::JsonSchemaDocument), which wraps a raw
//!   JSON Schema document.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::sync::Arc;

/// A value shape that can validate input and describe itself.
pub trait Schema: fmt::Debug + Send + Sync {
    /// Validates `value`, returning the (possibly coerced) value on success.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] describing the first mismatch.
    fn validate(&self, value: &Value) -> Result<Value, SchemaViolation>;

    /// Returns a machine-readable description, shaped as JSON Schema.
    fn describe(&self) -> Value;
}

/// A schema shared between contracts and in-flight requests.
pub type SharedSchema = Arc<dyn Schema>;

/// A schema mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON path of the offending value, rooted at `$`.
    pub path: String,
    /// What was wrong.
    pub message: String,
}

impl SchemaViolation {
    /// Creates a violation at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error at '{}': {}", self.path, self.message)
    }
}

impl std::error::Error for SchemaViolation {}

/// A compiled `pattern` constraint. Serialized as its source string.
#[derive(Debug, Clone)]
pub struct SchemaPattern(Regex);

impl SchemaPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl PartialEq for SchemaPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for SchemaPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchemaPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source).map_err(serde::de::Error::custom)
    }
}

/// A declarative schema.
///
/// Properties are optional unless marked [`required`](Self::required).
/// `pattern` uses search semantics, as JSON Schema does: `[a-z]+` accepts
/// any string containing a lowercase letter. Anchor it to match the whole
/// value.
///
/// Numeric and boolean schemas marked [`coerce`](Self::coerce) also accept
/// their string forms, which is how path and query values (always strings)
/// become typed.
///
/// # Example
///
/// ```
/// use charter_core::{Schema, SchemaSpec};
/// use serde_json::json;
///
/// let schema = SchemaSpec::object(vec![
///     ("id", SchemaSpec::integer().coerce().required()),
///     ("name", SchemaSpec::string().pattern("^[a-z]+$").required()),
/// ]);
///
/// let value = schema.validate(&json!({"id": "42", "name": "widget"})).unwrap();
/// assert_eq!(value, json!({"id": 42, "name": "widget"}));
///
/// assert!(schema.validate(&json!({"id": "x", "name": "widget"})).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaSpec {
    /// String type.
    String {
        /// Whether the property must be present.
        #[serde(default)]
        required: bool,
        /// Minimum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        /// Regex the value must contain a match for.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<SchemaPattern>,
    },
    /// Integer type.
    Integer {
        /// Whether the property must be present.
        #[serde(default)]
        required: bool,
        /// Accept numeric strings.
        #[serde(default)]
        coerce: bool,
        /// Minimum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Maximum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Number (float) type.
    Number {
        /// Whether the property must be present.
        #[serde(default)]
        required: bool,
        /// Accept numeric strings.
        #[serde(default)]
        coerce: bool,
        /// Minimum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Maximum value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// Boolean type.
    Boolean {
        /// Whether the property must be present.
        #[serde(default)]
        required: bool,
        /// Accept `"true"` and `"false"`.
        #[serde(default)]
        coerce: bool,
    },
    /// Array type.
    Array {
        /// Whether the property must be present.
        #[serde(default)]
        required: bool,
        /// Schema for every item.
        items: Box<SchemaSpec>,
        /// Minimum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum number of items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// Object type.
    Object {
        /// Whether the property must be present.
        #[serde(default)]
        required: bool,
        /// Declared properties, in declaration order.
        #[serde(default)]
        properties: IndexMap<String, SchemaSpec>,
        /// Reject properties that are not declared.
        #[serde(default)]
        strict: bool,
    },
    /// Accepts any value.
    Any {
        /// Whether the property must be present.
        #[serde(default)]
        required: bool,
    },
    /// Null type.
    Null,
}

impl SchemaSpec {
    /// Creates a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
        }
    }

    /// Creates an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer {
            required: false,
            coerce: false,
            minimum: None,
            maximum: None,
        }
    }

    /// Creates a number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::Number {
            required: false,
            coerce: false,
            minimum: None,
            maximum: None,
        }
    }

    /// Creates a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean {
            required: false,
            coerce: false,
        }
    }

    /// Creates an array schema.
    #[must_use]
    pub fn array(items: SchemaSpec) -> Self {
        Self::Array {
            required: false,
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Creates an object schema from (name, schema) pairs.
    #[must_use]
    pub fn object(properties: Vec<(&str, SchemaSpec)>) -> Self {
        Self::Object {
            required: false,
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            strict: false,
        }
    }

    /// Creates a schema that accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::Any { required: false }
    }

    /// Creates a null schema.
    #[must_use]
    pub fn null() -> Self {
        Self::Null
    }

    /// Marks this schema as required within its parent object.
    #[must_use]
    pub fn required(mut self) -> Self {
        if let Some(flag) = self.required_flag_mut() {
            *flag = true;
        }
        self
    }

    /// Marks this schema as optional within its parent object.
    #[must_use]
    pub fn optional(mut self) -> Self {
        if let Some(flag) = self.required_flag_mut() {
            *flag = false;
        }
        self
    }

    /// Returns whether this schema is required within its parent object.
    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::String { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::Boolean { required, .. }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required } => *required,
            Self::Null => false,
        }
    }

    /// Accepts string forms of integers, numbers and booleans.
    #[must_use]
    pub fn coerce(mut self) -> Self {
        match &mut self {
            Self::Integer { coerce, .. }
            | Self::Number { coerce, .. }
            | Self::Boolean { coerce, .. } => *coerce = true,
            _ => {}
        }
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Self::String { min_length, .. } = &mut self {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let Self::String { max_length, .. } = &mut self {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the string pattern.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Schemas are declared at
    /// startup, so this is a programming error; use
    /// [`try_pattern`](Self::try_pattern) for patterns loaded at runtime.
    #[must_use]
    pub fn pattern(self, pattern: &str) -> Self {
        self.try_pattern(pattern)
            .unwrap_or_else(|e| panic!("invalid schema pattern '{pattern}': {e}"))
    }

    /// Sets the string pattern, reporting an invalid regex.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error.
    pub fn try_pattern(mut self, source: &str) -> Result<Self, regex::Error> {
        let compiled = SchemaPattern::new(source)?;
        if let Self::String { pattern, .. } = &mut self {
            *pattern = Some(compiled);
        }
        Ok(self)
    }

    /// Sets the minimum integer value.
    #[must_use]
    pub fn minimum_int(mut self, min: i64) -> Self {
        if let Self::Integer { minimum, .. } = &mut self {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the maximum integer value.
    #[must_use]
    pub fn maximum_int(mut self, max: i64) -> Self {
        if let Self::Integer { maximum, .. } = &mut self {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the minimum number value.
    #[must_use]
    pub fn minimum(mut self, min: f64) -> Self {
        if let Self::Number { minimum, .. } = &mut self {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the maximum number value.
    #[must_use]
    pub fn maximum(mut self, max: f64) -> Self {
        if let Self::Number { maximum, .. } = &mut self {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the minimum array length.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        if let Self::Array { min_items, .. } = &mut self {
            *min_items = Some(min);
        }
        self
    }

    /// Sets the maximum array length.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        if let Self::Array { max_items, .. } = &mut self {
            *max_items = Some(max);
        }
        self
    }

    /// Rejects undeclared object properties.
    #[must_use]
    pub fn strict(mut self) -> Self {
        if let Self::Object { strict, .. } = &mut self {
            *strict = true;
        }
        self
    }

    /// Wraps this schema for use in a contract.
    #[must_use]
    pub fn into_shared(self) -> SharedSchema {
        Arc::new(self)
    }

    fn required_flag_mut(&mut self) -> Option<&mut bool> {
        match self {
            Self::String { required, .. }
            | Self::Integer { required, .. }
            | Self::Number { required, .. }
            | Self::Boolean { required, .. }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required } => Some(required),
            Self::Null => None,
        }
    }

    fn validate_at_path(&self, value: &Value, path: &str) -> Result<Value, SchemaViolation> {
        match self {
            Self::String {
                min_length,
                max_length,
                pattern,
                ..
            } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| type_mismatch(path, "string", value))?;
                let len = s.chars().count();

                if let Some(min) = min_length {
                    if len < *min {
                        return Err(SchemaViolation::new(
                            path,
                            format!("string length {len} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = max_length {
                    if len > *max {
                        return Err(SchemaViolation::new(
                            path,
                            format!("string length {len} is greater than maximum {max}"),
                        ));
                    }
                }
                if let Some(pattern) = pattern {
                    if !pattern.is_match(s) {
                        return Err(SchemaViolation::new(
                            path,
                            format!("string does not match pattern '{}'", pattern.as_str()),
                        ));
                    }
                }

                Ok(value.clone())
            }

            Self::Integer {
                coerce,
                minimum,
                maximum,
                ..
            } => {
                let n = match value {
                    Value::String(s) if *coerce => s.trim().parse::<i128>().ok(),
                    Value::Number(n) => integral(n),
                    _ => None,
                }
                .ok_or_else(|| type_mismatch(path, "integer", value))?;

                if let Some(min) = minimum {
                    if n < i128::from(*min) {
                        return Err(SchemaViolation::new(
                            path,
                            format!("value {n} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > i128::from(*max) {
                        return Err(SchemaViolation::new(
                            path,
                            format!("value {n} is greater than maximum {max}"),
                        ));
                    }
                }

                Ok(i64::try_from(n)
                    .map(Value::from)
                    .or_else(|_| u64::try_from(n).map(Value::from))
                    .unwrap_or_else(|_| value.clone()))
            }

            Self::Number {
                coerce,
                minimum,
                maximum,
                ..
            } => {
                let coerced = match value {
                    Value::String(s) if *coerce => s
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64),
                    Value::Number(n) => Some(n.clone()),
                    _ => None,
                }
                .ok_or_else(|| type_mismatch(path, "number", value))?;
                let n = coerced.as_f64().unwrap_or(f64::NAN);

                if let Some(min) = minimum {
                    if n < *min {
                        return Err(SchemaViolation::new(
                            path,
                            format!("value {n} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        return Err(SchemaViolation::new(
                            path,
                            format!("value {n} is greater than maximum {max}"),
                        ));
                    }
                }

                Ok(Value::Number(coerced))
            }

            Self::Boolean { coerce, .. } => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) if *coerce && s == "true" => Ok(Value::Bool(true)),
                Value::String(s) if *coerce && s == "false" => Ok(Value::Bool(false)),
                _ => Err(type_mismatch(path, "boolean", value)),
            },

            Self::Array {
                items,
                min_items,
                max_items,
                ..
            } => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| type_mismatch(path, "array", value))?;

                if let Some(min) = min_items {
                    if arr.len() < *min {
                        return Err(SchemaViolation::new(
                            path,
                            format!("array length {} is less than minimum {min}", arr.len()),
                        ));
                    }
                }
                if let Some(max) = max_items {
                    if arr.len() > *max {
                        return Err(SchemaViolation::new(
                            path,
                            format!("array length {} is greater than maximum {max}", arr.len()),
                        ));
                    }
                }

                arr.iter()
                    .enumerate()
                    .map(|(idx, item)| items.validate_at_path(item, &format!("{path}[{idx}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }

            Self::Object {
                properties, strict, ..
            } => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| type_mismatch(path, "object", value))?;
                let mut output = Map::with_capacity(obj.len());

                for (name, prop_schema) in properties {
                    let prop_path = format!("{path}.{name}");
                    match obj.get(name) {
                        None if prop_schema.is_required() => {
                            return Err(SchemaViolation::new(
                                prop_path,
                                format!("missing required property '{name}'"),
                            ));
                        }
                        None => {}
                        Some(Value::Null) if !prop_schema.is_required() => {
                            output.insert(name.clone(), Value::Null);
                        }
                        Some(prop_value) => {
                            let validated = prop_schema.validate_at_path(prop_value, &prop_path)?;
                            output.insert(name.clone(), validated);
                        }
                    }
                }

                for (name, extra) in obj {
                    if properties.contains_key(name) {
                        continue;
                    }
                    if *strict {
                        return Err(SchemaViolation::new(
                            format!("{path}.{name}"),
                            format!("unexpected property '{name}'"),
                        ));
                    }
                    output.insert(name.clone(), extra.clone());
                }

                Ok(Value::Object(output))
            }

            Self::Any { .. } => Ok(value.clone()),

            Self::Null => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    Err(type_mismatch(path, "null", value))
                }
            }
        }
    }
}

impl Schema for SchemaSpec {
    fn validate(&self, value: &Value) -> Result<Value, SchemaViolation> {
        self.validate_at_path(value, "$")
    }

    fn describe(&self) -> Value {
        let mut out = Map::new();
        match self {
            Self::String {
                min_length,
                max_length,
                pattern,
                ..
            } => {
                out.insert("type".into(), "string".into());
                insert_opt(&mut out, "minLength", *min_length);
                insert_opt(&mut out, "maxLength", *max_length);
                insert_opt(&mut out, "pattern", pattern.as_ref().map(SchemaPattern::as_str));
            }
            Self::Integer {
                minimum, maximum, ..
            } => {
                out.insert("type".into(), "integer".into());
                insert_opt(&mut out, "minimum", *minimum);
                insert_opt(&mut out, "maximum", *maximum);
            }
            Self::Number {
                minimum, maximum, ..
            } => {
                out.insert("type".into(), "number".into());
                insert_opt(&mut out, "minimum", *minimum);
                insert_opt(&mut out, "maximum", *maximum);
            }
            Self::Boolean { .. } => {
                out.insert("type".into(), "boolean".into());
            }
            Self::Array {
                items,
                min_items,
                max_items,
                ..
            } => {
                out.insert("type".into(), "array".into());
                out.insert("items".into(), items.describe());
                insert_opt(&mut out, "minItems", *min_items);
                insert_opt(&mut out, "maxItems", *max_items);
            }
            Self::Object {
                properties, strict, ..
            } => {
                out.insert("type".into(), "object".into());
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.describe()))
                    .collect();
                out.insert("properties".into(), Value::Object(props));

                let required: Vec<Value> = properties
                    .iter()
                    .filter(|(_, schema)| schema.is_required())
                    .map(|(name, _)| Value::String(name.clone()))
                    .collect();
                if !required.is_empty() {
                    out.insert("required".into(), Value::Array(required));
                }
                if *strict {
                    out.insert("additionalProperties".into(), Value::Bool(false));
                }
            }
            Self::Any { .. } => {}
            Self::Null => {
                out.insert("type".into(), "null".into());
            }
        }
        Value::Object(out)
    }
}

fn insert_opt<T: Into<Value>>(out: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        out.insert(key.to_string(), value.into());
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> SchemaViolation {
    SchemaViolation::new(
        path,
        format!("expected {expected}, got {}", value_type_name(value)),
    )
}

/// Integer value of a JSON number, accepting floats with no fractional part.
fn integral(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(i128::from(u));
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i128)
}

/// Returns a human-readable name for a JSON value type.
#[must_use]
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thing_body() -> SchemaSpec {
        SchemaSpec::object(vec![
            ("name", SchemaSpec::string().pattern("[a-z]+").required()),
            ("description", SchemaSpec::string().pattern("[a-z]+").required()),
        ])
    }

    #[test]
    fn test_string_pattern_search_semantics() {
        let schema = SchemaSpec::string().pattern(r"[\d]+");
        assert!(schema.validate(&json!("1")).is_ok());
        assert!(schema.validate(&json!("a1b")).is_ok());
        assert!(schema.validate(&json!("xyz")).is_err());
    }

    #[test]
    fn test_string_length() {
        let schema = SchemaSpec::string().min_length(2).max_length(3);
        assert!(schema.validate(&json!("ab")).is_ok());
        assert!(schema.validate(&json!("a")).is_err());
        assert!(schema.validate(&json!("abcd")).is_err());
        assert!(schema.validate(&json!("äöü")).is_ok());
    }

    #[test]
    fn test_top_level_null_is_rejected() {
        let schema = SchemaSpec::string();
        let err = schema.validate(&json!(null)).unwrap_err();
        assert_eq!(err.path, "$");
        assert_eq!(err.message, "expected string, got null");
    }

    #[test]
    fn test_integer_coercion() {
        let schema = SchemaSpec::integer().coerce().minimum_int(1);
        assert_eq!(schema.validate(&json!("42")).unwrap(), json!(42));
        assert_eq!(schema.validate(&json!(7)).unwrap(), json!(7));
        assert!(schema.validate(&json!("0")).is_err());
        assert!(schema.validate(&json!("4.2")).is_err());

        let strict = SchemaSpec::integer();
        assert!(strict.validate(&json!("42")).is_err());
    }

    #[test]
    fn test_integer_accepts_integral_floats_and_large_unsigned() {
        let schema = SchemaSpec::integer();
        assert_eq!(schema.validate(&json!(1.0)).unwrap(), json!(1));
        assert_eq!(schema.validate(&json!(-3.0)).unwrap(), json!(-3));
        assert!(schema.validate(&json!(1.5)).is_err());

        let big = u64::MAX;
        assert_eq!(schema.validate(&json!(big)).unwrap(), json!(big));

        let bounded = SchemaSpec::integer().maximum_int(i64::MAX);
        assert!(bounded.validate(&json!(big)).is_err());
        assert!(bounded.validate(&json!(2.0)).is_ok());
    }

    #[test]
    fn test_number_coercion() {
        let schema = SchemaSpec::number().coerce().maximum(10.0);
        assert_eq!(schema.validate(&json!("2.5")).unwrap(), json!(2.5));
        assert!(schema.validate(&json!("11")).is_err());
        assert!(schema.validate(&json!("NaN")).is_err());
    }

    #[test]
    fn test_boolean_coercion() {
        let schema = SchemaSpec::boolean().coerce();
        assert_eq!(schema.validate(&json!("true")).unwrap(), json!(true));
        assert_eq!(schema.validate(&json!("false")).unwrap(), json!(false));
        assert!(schema.validate(&json!("yes")).is_err());
        assert!(SchemaSpec::boolean().validate(&json!("true")).is_err());
    }

    #[test]
    fn test_object_required_and_optional() {
        let schema = SchemaSpec::object(vec![
            ("id", SchemaSpec::string().required()),
            ("nickname", SchemaSpec::string()),
        ]);

        assert!(schema.validate(&json!({"id": "a"})).is_ok());
        assert!(schema.validate(&json!({"id": "a", "nickname": null})).is_ok());

        let err = schema.validate(&json!({"nickname": "b"})).unwrap_err();
        assert_eq!(err.path, "$.id");
        assert_eq!(err.message, "missing required property 'id'");
    }

    #[test]
    fn test_object_passes_unknown_properties_unless_strict() {
        let lenient = SchemaSpec::object(vec![("id", SchemaSpec::string())]);
        assert_eq!(
            lenient.validate(&json!({"id": "a", "extra": 1})).unwrap(),
            json!({"id": "a", "extra": 1})
        );

        let strict = lenient.strict();
        let err = strict.validate(&json!({"id": "a", "extra": 1})).unwrap_err();
        assert_eq!(err.path, "$.extra");
    }

    #[test]
    fn test_object_coerces_nested_values() {
        let schema = SchemaSpec::object(vec![("thingId", SchemaSpec::integer().coerce().required())]);
        assert_eq!(
            schema.validate(&json!({"thingId": "12"})).unwrap(),
            json!({"thingId": 12})
        );
    }

    #[test]
    fn test_array_items_and_paths() {
        let schema = SchemaSpec::array(SchemaSpec::integer()).min_items(1).max_items(3);
        assert!(schema.validate(&json!([1, 2])).is_ok());
        assert!(schema.validate(&json!([])).is_err());
        assert!(schema.validate(&json!([1, 2, 3, 4])).is_err());

        let err = schema.validate(&json!([1, "two"])).unwrap_err();
        assert_eq!(err.path, "$[1]");
    }

    #[test]
    fn test_thing_body_rejects_uppercase() {
        let schema = thing_body();
        assert!(schema
            .validate(&json!({"name": "mything", "description": "besthingever"}))
            .is_ok());
        assert!(schema
            .validate(&json!({"name": "MYTHING", "description": "WORSTTHINGEVER"}))
            .is_err());
        assert!(schema.validate(&json!({"foo": "bar"})).is_err());
    }

    #[test]
    fn test_describe_object() {
        let described = thing_body().describe();
        assert_eq!(
            described,
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "pattern": "[a-z]+"},
                    "description": {"type": "string", "pattern": "[a-z]+"}
                },
                "required": ["name", "description"]
            })
        );
    }

    #[test]
    fn test_describe_array_and_any() {
        let described = SchemaSpec::array(SchemaSpec::string()).describe();
        assert_eq!(described["type"], "array");
        assert_eq!(described["items"]["type"], "string");
        assert_eq!(SchemaSpec::any().describe(), json!({}));
    }

    #[test]
    fn test_serde_roundtrip() {
        let schema = thing_body();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"]["name"]["pattern"], "[a-z]+");

        let back: SchemaSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_try_pattern_rejects_invalid_regex() {
        assert!(SchemaSpec::string().try_pattern("(unclosed").is_err());
    }

    #[test]
    fn test_violation_display() {
        let violation = SchemaViolation::new("$.name", "expected string, got number");
        assert_eq!(
            violation.to_string(),
            "validation error at '$.name': expected string, got number"
        );
    }
}
