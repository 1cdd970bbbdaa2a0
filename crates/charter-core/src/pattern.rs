//! Path-pattern matching.
//!
//! Route contracts name their path with `{name}` placeholders, e.g.
//! `/things/{thingId}`. A [`PathPattern`] compiles such a pattern into an
//! anchored regular expression where each placeholder captures exactly one
//! path segment (`[^/]*`), and extracts the captured values by position.
//!
//! Extraction never fails: a path that does not fit the pattern yields a
//! [`PathParams`] with the missing names absent, and schema validation
//! rejects it later.

use crate::error::ContractError;
use crate::params::PathParams;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("valid regex"))
}

/// A compiled path pattern.
///
/// # Example
///
/// ```
/// use charter_core::PathPattern;
///
/// let pattern = PathPattern::parse("/things/{thingId}").unwrap();
/// assert_eq!(pattern.names(), ["thingId"]);
///
/// let params = pattern.extract("/things/42");
/// assert_eq!(params.get("thingId"), Some("42"));
///
/// // A path of the wrong shape yields no values rather than an error.
/// assert!(pattern.extract("/others/42/extra").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    names: Vec<String>,
    regex: Regex,
}

impl PathPattern {
    /// Parses and compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidPattern`] for unbalanced or nested
    /// braces, empty names or names containing `/`, and
    /// [`ContractError::DuplicatePlaceholder`] when a name repeats.
    pub fn parse(pattern: &str) -> Result<Self, ContractError> {
        let invalid = |reason: &str| ContractError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let mut source = String::from("^");
        let mut names: Vec<String> = Vec::new();
        let mut rest = pattern;

        while !rest.is_empty() {
            let Some(open) = rest.find(['{', '}']) else {
                source.push_str(&regex::escape(rest));
                break;
            };

            if rest[open..].starts_with('}') {
                return Err(invalid("unmatched '}'"));
            }

            source.push_str(&regex::escape(&rest[..open]));
            let after_open = &rest[open + 1..];
            let close = after_open
                .find(['{', '}'])
                .filter(|idx| after_open[*idx..].starts_with('}'))
                .ok_or_else(|| invalid("unclosed or nested placeholder"))?;

            let name = &after_open[..close];
            if name.is_empty() {
                return Err(invalid("empty placeholder name"));
            }
            if name.contains('/') {
                return Err(invalid("placeholder name contains '/'"));
            }
            if names.iter().any(|existing| existing == name) {
                return Err(ContractError::DuplicatePlaceholder {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }

            names.push(name.to_string());
            source.push_str("([^/]*)");
            rest = &after_open[close + 1..];
        }

        if pattern.ends_with('/') {
            source.push('$');
        } else {
            source.push_str("/?$");
        }

        let regex = Regex::new(&source).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            names,
            regex,
        })
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the placeholder names in order of appearance.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if `path` has the shape of this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extracts placeholder values from a concrete path.
    ///
    /// Values are percent-decoded; a value that does not decode to UTF-8 is
    /// kept as captured.
    #[must_use]
    pub fn extract(&self, path: &str) -> PathParams {
        let mut params = PathParams::new();
        let Some(captures) = self.regex.captures(path) else {
            return params;
        };

        for (idx, name) in self.names.iter().enumerate() {
            if let Some(value) = captures.get(idx + 1) {
                params.push(name.as_str(), decode_segment(value.as_str()));
            }
        }
        params
    }

    /// Rewrites this pattern into `:name` placeholder syntax.
    #[must_use]
    pub fn to_colon_pattern(&self) -> String {
        to_colon_pattern(&self.source)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Extracts placeholder values from `path` using `pattern`.
///
/// An invalid pattern yields an empty parameter set.
#[must_use]
pub fn extract_params(pattern: &str, path: &str) -> PathParams {
    PathPattern::parse(pattern)
        .map(|compiled| compiled.extract(path))
        .unwrap_or_default()
}

/// Rewrites `{name}` placeholders into `:name` syntax.
///
/// ```
/// use charter_core::to_colon_pattern;
///
/// assert_eq!(to_colon_pattern("/things/{thingId}"), "/things/:thingId");
/// ```
#[must_use]
pub fn to_colon_pattern(pattern: &str) -> String {
    placeholder_regex().replace_all(pattern, ":$1").into_owned()
}

fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_names_in_order() {
        let pattern = PathPattern::parse("/users/{userId}/posts/{postId}").unwrap();
        assert_eq!(pattern.names(), ["userId", "postId"]);
        assert_eq!(pattern.as_str(), "/users/{userId}/posts/{postId}");
    }

    #[test]
    fn test_extract_values() {
        let params = extract_params("/users/{userId}/posts/{postId}", "/users/7/posts/99");
        assert_eq!(params.get("userId"), Some("7"));
        assert_eq!(params.get("postId"), Some("99"));
    }

    #[test]
    fn test_extract_tolerates_trailing_slash() {
        let params = extract_params("/things/{thingId}", "/things/1/");
        assert_eq!(params.get("thingId"), Some("1"));
    }

    #[test]
    fn test_extract_segment_count_mismatch() {
        let params = extract_params("/things/{thingId}", "/things/1/extra");
        assert!(params.is_empty());

        let params = extract_params("/things/{thingId}", "/things");
        assert_eq!(params.get("thingId"), None);
    }

    #[test]
    fn test_extract_empty_segment() {
        let params = extract_params("/things/{thingId}", "/things/");
        assert_eq!(params.get("thingId"), Some(""));
    }

    #[test]
    fn test_extract_percent_decodes() {
        let params = extract_params("/files/{name}", "/files/hello%20world");
        assert_eq!(params.get("name"), Some("hello world"));

        let params = extract_params("/files/{name}", "/files/%FF");
        assert_eq!(params.get("name"), Some("%FF"));
    }

    #[test]
    fn test_literal_metacharacters_are_escaped() {
        let pattern = PathPattern::parse("/v1.0/{id}").unwrap();
        assert!(pattern.matches("/v1.0/3"));
        assert!(!pattern.matches("/v1x0/3"));
    }

    #[test]
    fn test_placeholder_inside_segment() {
        let params = extract_params("/files/{name}.{ext}", "/files/report.pdf");
        assert_eq!(params.get("name"), Some("report"));
        assert_eq!(params.get("ext"), Some("pdf"));
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/"));
        assert!(!pattern.matches("/x"));
        assert!(pattern.names().is_empty());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("/things/{thingId"),
            Err(ContractError::InvalidPattern { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/things/thingId}"),
            Err(ContractError::InvalidPattern { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/things/{}"),
            Err(ContractError::InvalidPattern { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/things/{a{b}}"),
            Err(ContractError::InvalidPattern { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/a/{id}/b/{id}"),
            Err(ContractError::DuplicatePlaceholder { .. })
        ));
    }

    #[test]
    fn test_extract_params_with_invalid_pattern_is_empty() {
        assert!(extract_params("/things/{", "/things/1").is_empty());
    }

    #[test]
    fn test_to_colon_pattern() {
        assert_eq!(to_colon_pattern("/things/{thingId}"), "/things/:thingId");
        assert_eq!(
            to_colon_pattern("/users/{userId}/posts/{postId}"),
            "/users/:userId/posts/:postId"
        );
        assert_eq!(to_colon_pattern("/health"), "/health");

        let pattern = PathPattern::parse("/things/{thingId}").unwrap();
        assert_eq!(pattern.to_colon_pattern(), "/things/:thingId");
    }

    proptest! {
        #[test]
        fn prop_extract_never_panics(pattern in ".{0,40}", path in ".{0,40}") {
            let _ = extract_params(&pattern, &path);
        }

        #[test]
        fn prop_extract_recovers_segments(a in "[A-Za-z0-9_-]{1,12}", b in "[A-Za-z0-9_-]{0,12}") {
            let params = extract_params("/a/{first}/b/{second}", &format!("/a/{a}/b/{b}"));
            prop_assert_eq!(params.get("first"), Some(a.as_str()));
            prop_assert_eq!(params.get("second"), Some(b.as_str()));
        }
    }
}
