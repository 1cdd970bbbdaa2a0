//! Body and query decoding.
//!
//! Every decoder produces a JSON value so that one [`Schema`] can check
//! JSON, form and multipart bodies alike. Form-shaped inputs (query strings,
//! urlencoded bodies, multipart text fields) decode to a flat object: a
//! repeated key keeps its last value, unless the schema declares that
//! property as an array, in which case every value is kept in order.

use bytes::Bytes;
use charter_core::Schema;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io;
use thiserror::Error;

/// A body format the pipeline can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// `application/json`.
    Json,

    /// `application/x-www-form-urlencoded`.
    Form,

    /// `multipart/form-data`, text fields only.
    Multipart,
}

impl BodyFormat {
    /// Maps a media type essence to a decodable format.
    #[must_use]
    pub fn from_essence(essence: &str) -> Option<Self> {
        if essence == mime::APPLICATION_JSON.essence_str() {
            Some(Self::Json)
        } else if essence == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            Some(Self::Form)
        } else if essence == mime::MULTIPART_FORM_DATA.essence_str() {
            Some(Self::Multipart)
        } else {
            None
        }
    }
}

/// Failure to turn raw bytes into a JSON value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body or query is not valid urlencoded data.
    #[error("invalid urlencoded data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// The body is not valid multipart data.
    #[error("invalid multipart data: {0}")]
    Multipart(#[from] multer::Error),
}

/// Decodes a body of the given format.
///
/// `content_type` is the full header value; multipart needs its boundary.
/// `schema` decides which repeated form fields become arrays.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the bytes do not match the format.
pub async fn decode_body(
    format: BodyFormat,
    content_type: &str,
    body: Bytes,
    schema: &dyn Schema,
) -> Result<Value, DecodeError> {
    match format {
        BodyFormat::Json => Ok(serde_json::from_slice(&body)?),
        BodyFormat::Form => {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)?;
            Ok(collect_fields(pairs, &array_properties(&schema.describe())))
        }
        BodyFormat::Multipart => {
            let pairs = multipart_fields(content_type, body).await?;
            Ok(collect_fields(pairs, &array_properties(&schema.describe())))
        }
    }
}

/// Decodes a query string into a flat object.
///
/// # Errors
///
/// Returns [`DecodeError::Form`] if the query is not valid urlencoded data.
pub fn decode_query(query: &str, schema: Option<&dyn Schema>) -> Result<Value, DecodeError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
    let arrays = schema
        .map(|s| array_properties(&s.describe()))
        .unwrap_or_default();
    Ok(collect_fields(pairs, &arrays))
}

async fn multipart_fields(
    content_type: &str,
    body: Bytes,
) -> Result<Vec<(String, String)>, DecodeError> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut pairs = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let text = field.text().await?;
        pairs.push((name, text));
    }
    Ok(pairs)
}

/// Names of the properties a schema description declares as arrays.
#[must_use]
pub fn array_properties(description: &Value) -> HashSet<String> {
    let Some(properties) = description.get("properties").and_then(Value::as_object) else {
        return HashSet::new();
    };

    properties
        .iter()
        .filter(|(_, property)| declares_array(property))
        .map(|(name, _)| name.clone())
        .collect()
}

fn declares_array(property: &Value) -> bool {
    match property.get("type") {
        Some(Value::String(t)) => t == "array",
        Some(Value::Array(types)) => types.iter().any(|t| t == "array"),
        _ => false,
    }
}

/// Folds key/value pairs into an object.
#[must_use]
pub fn collect_fields<I>(pairs: I, arrays: &HashSet<String>) -> Value
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut object = Map::new();
    for (key, value) in pairs {
        if arrays.contains(&key) {
            let slot = object
                .entry(key)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = slot {
                items.push(Value::String(value));
            }
        } else {
            object.insert(key, Value::String(value));
        }
    }
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::SchemaSpec;
    use serde_json::json;

    fn tags_schema() -> SchemaSpec {
        SchemaSpec::object(vec![
            ("name", SchemaSpec::string()),
            ("tags", SchemaSpec::array(SchemaSpec::string())),
        ])
    }

    #[test]
    fn test_format_from_essence() {
        assert_eq!(BodyFormat::from_essence("application/json"), Some(BodyFormat::Json));
        assert_eq!(
            BodyFormat::from_essence("application/x-www-form-urlencoded"),
            Some(BodyFormat::Form)
        );
        assert_eq!(
            BodyFormat::from_essence("multipart/form-data"),
            Some(BodyFormat::Multipart)
        );
        assert_eq!(BodyFormat::from_essence("text/csv"), None);
    }

    #[test]
    fn test_query_last_value_wins() {
        let value = decode_query("name=a&name=b&x=1", None).unwrap();
        assert_eq!(value, json!({"name": "b", "x": "1"}));
    }

    #[test]
    fn test_query_collects_declared_arrays() {
        let schema = tags_schema();
        let value = decode_query("tags=a&name=x&tags=b&name=y", Some(&schema as &dyn Schema)).unwrap();
        assert_eq!(value, json!({"name": "y", "tags": ["a", "b"]}));
    }

    #[test]
    fn test_query_percent_decoding() {
        let value = decode_query("q=hello%20world&plus=a+b", None).unwrap();
        assert_eq!(value, json!({"q": "hello world", "plus": "a b"}));
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(decode_query("", None).unwrap(), json!({}));
    }

    #[test]
    fn test_array_properties_from_json_schema_types() {
        let description = json!({
            "type": "object",
            "properties": {
                "a": {"type": "array"},
                "b": {"type": ["array", "null"]},
                "c": {"type": "string"}
            }
        });
        let arrays = array_properties(&description);
        assert!(arrays.contains("a"));
        assert!(arrays.contains("b"));
        assert!(!arrays.contains("c"));
        assert!(array_properties(&json!({"type": "string"})).is_empty());
    }

    #[tokio::test]
    async fn test_decode_json() {
        let value = decode_body(
            BodyFormat::Json,
            "application/json",
            Bytes::from_static(br#"{"name":"thing"}"#),
            &SchemaSpec::any(),
        )
        .await
        .unwrap();
        assert_eq!(value, json!({"name": "thing"}));
    }

    #[tokio::test]
    async fn test_decode_invalid_json() {
        let result = decode_body(
            BodyFormat::Json,
            "application/json",
            Bytes::from_static(b"{not json"),
            &SchemaSpec::any(),
        )
        .await;
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[tokio::test]
    async fn test_decode_form() {
        let value = decode_body(
            BodyFormat::Form,
            "application/x-www-form-urlencoded",
            Bytes::from_static(b"name=thing&tags=a&tags=b"),
            &tags_schema(),
        )
        .await
        .unwrap();
        assert_eq!(value, json!({"name": "thing", "tags": ["a", "b"]}));
    }

    #[tokio::test]
    async fn test_decode_multipart_text_fields() {
        let body = "--XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"name\"\r\n\r\n\
                    thing\r\n\
                    --XBOUNDARY\r\n\
                    Content-Disposition: form-data; name=\"description\"\r\n\r\n\
                    stuff\r\n\
                    --XBOUNDARY--\r\n";
        let value = decode_body(
            BodyFormat::Multipart,
            "multipart/form-data; boundary=XBOUNDARY",
            Bytes::from(body),
            &SchemaSpec::any(),
        )
        .await
        .unwrap();
        assert_eq!(value, json!({"name": "thing", "description": "stuff"}));
    }

    #[tokio::test]
    async fn test_decode_multipart_without_boundary() {
        let result = decode_body(
            BodyFormat::Multipart,
            "multipart/form-data",
            Bytes::from_static(b"irrelevant"),
            &SchemaSpec::any(),
        )
        .await;
        assert!(matches!(result, Err(DecodeError::Multipart(_))));
    }
}
