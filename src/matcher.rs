use assert_json_diff::{assert_json_matches_no_panic, CompareMode};
use regex::Regex;
use std::convert::From;
use std::fmt;
use std::string::ToString;

///
/// Allows matching a URI, query parameter, header or body value in multiple ways: by the exact value,
/// by any value (as long as it is present), by regular expression, by JSON document or by checking
/// that a particular value is missing.
///
/// These matchers can be used within `request_to`, `query_param`, `header`, `body` and the other
/// request matcher factories.
///
#[derive(Clone, PartialEq, Debug)]
pub enum Matcher {
    /// Matches the exact value. There's also an implementation of `From<&str>`
    /// to keep things simple.
    Exact(String),
    /// Matches the body content as raw bytes
    Binary(Vec<u8>),
    /// Matches a value by a regular expression. An invalid expression never matches.
    Regex(String),
    /// Matches a specified JSON body from a `serde_json::Value`
    Json(serde_json::Value),
    /// Matches a specified JSON body from a `String`
    JsonString(String),
    /// Matches a partial JSON body from a `serde_json::Value`
    PartialJson(serde_json::Value),
    /// Matches a specified partial JSON body from a `String`
    PartialJsonString(String),
    /// Matches a URL-encoded key/value pair, where both key and value should be specified
    /// in plain (unencoded) format
    UrlEncoded(String, String),
    /// At least one matcher must match
    AnyOf(Vec<Matcher>),
    /// All matchers must match
    AllOf(Vec<Matcher>),
    /// Matches any value.
    Any,
    /// Checks that a value is not present.
    Missing,
}

impl<'a> From<&'a str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::Exact(value.to_string())
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Matcher::Exact(value)
    }
}

impl From<Vec<u8>> for Matcher {
    fn from(value: Vec<u8>) -> Self {
        Matcher::Binary(value)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join_matches = |matches: &[Self]| {
            matches
                .iter()
                .map(Self::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        };

        let result = match self {
            Matcher::Exact(ref value) => value.to_string(),
            Matcher::Binary(ref content) => {
                let len = std::cmp::min(content.len(), 8);
                format!("{:?} (binary)", &content[..len])
            }
            Matcher::Regex(ref value) => format!("{} (regex)", value),
            Matcher::Json(ref json_obj) => format!("{} (json)", json_obj),
            Matcher::JsonString(ref value) => format!("{} (json)", value),
            Matcher::PartialJson(ref json_obj) => format!("{} (partial json)", json_obj),
            Matcher::PartialJsonString(ref value) => format!("{} (partial json)", value),
            Matcher::UrlEncoded(ref field, ref value) => {
                format!("{}={} (urlencoded)", field, value)
            }
            Matcher::Any => "(any)".to_string(),
            Matcher::AnyOf(x) => format!("({}) (any of)", join_matches(x)),
            Matcher::AllOf(x) => format!("({}) (all of)", join_matches(x)),
            Matcher::Missing => "(missing)".to_string(),
        };
        write!(f, "{}", result)
    }
}

impl Matcher {
    pub(crate) fn matches_values(&self, values: &[&str]) -> bool {
        match self {
            Matcher::Missing => values.is_empty(),
            // AnyOf([…Missing…]) is handled here, but
            // AnyOf([Something]) is handled in the last block.
            // That's because Missing matches against all values at once,
            // but other matchers match against individual values.
            Matcher::AnyOf(ref matchers) if values.is_empty() => {
                matchers.iter().any(|m| m.matches_values(values))
            }
            Matcher::AllOf(ref matchers) if values.is_empty() => {
                matchers.iter().all(|m| m.matches_values(values))
            }
            _ => !values.is_empty() && values.iter().all(|val| self.matches_value(val)),
        }
    }

    pub(crate) fn matches_binary_value(&self, binary: &[u8]) -> bool {
        match self {
            Matcher::Binary(ref content) => binary == content.as_slice(),
            Matcher::Any => true,
            Matcher::Missing => binary.is_empty(),
            Matcher::AnyOf(ref matchers) => matchers.iter().any(|m| m.matches_binary_value(binary)),
            Matcher::AllOf(ref matchers) => matchers.iter().all(|m| m.matches_binary_value(binary)),
            _ => match std::str::from_utf8(binary) {
                Ok(text) => self.matches_value(text),
                Err(_) => false,
            },
        }
    }

    pub(crate) fn matches_value(&self, other: &str) -> bool {
        let compare_json_config = assert_json_diff::Config::new(CompareMode::Inclusive);
        match self {
            Matcher::Exact(ref value) => value == other,
            Matcher::Binary(ref content) => other.as_bytes() == content.as_slice(),
            Matcher::Regex(ref regex) => Regex::new(regex)
                .map(|regex| regex.is_match(other))
                .unwrap_or(false),
            Matcher::Json(ref json_obj) => parse_json(other)
                .map(|other| *json_obj == other)
                .unwrap_or(false),
            Matcher::JsonString(ref value) => match (parse_json(value), parse_json(other)) {
                (Some(value), Some(other)) => value == other,
                _ => false,
            },
            Matcher::PartialJson(ref json_obj) => parse_json(other)
                .map(|actual| {
                    assert_json_matches_no_panic(&actual, json_obj, compare_json_config).is_ok()
                })
                .unwrap_or(false),
            Matcher::PartialJsonString(ref value) => match (parse_json(value), parse_json(other)) {
                (Some(expected), Some(actual)) => {
                    assert_json_matches_no_panic(&actual, &expected, compare_json_config).is_ok()
                }
                _ => false,
            },
            Matcher::UrlEncoded(ref expected_field, ref expected_value) => {
                serde_urlencoded::from_str::<Vec<(String, String)>>(other)
                    .map(|params| {
                        params.into_iter().any(|(ref field, ref value)| {
                            field == expected_field && value == expected_value
                        })
                    })
                    .unwrap_or(false)
            }
            Matcher::Any => true,
            Matcher::AnyOf(ref matchers) => matchers.iter().any(|m| m.matches_value(other)),
            Matcher::AllOf(ref matchers) => matchers.iter().all(|m| m.matches_value(other)),
            Matcher::Missing => other.is_empty(),
        }
    }
}

fn parse_json(value: &str) -> Option<serde_json::Value> {
    serde_json::from_str(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_regex_does_not_match() {
        assert!(!Matcher::Regex("(".to_string()).matches_value("("));
    }

    #[test]
    fn test_partial_json() {
        let matcher = Matcher::PartialJson(json!({"hello": "world"}));
        assert!(matcher.matches_value(r#"{"hello": "world", "extra": 1}"#));
        assert!(!matcher.matches_value(r#"{"hello": "there"}"#));
        assert!(!matcher.matches_value("not json"));
    }

    #[test]
    fn test_missing_matches_no_values() {
        assert!(Matcher::Missing.matches_values(&[]));
        assert!(!Matcher::Missing.matches_values(&["x"]));
        assert!(!Matcher::Any.matches_values(&[]));
        assert!(Matcher::AnyOf(vec![Matcher::Missing, "a".into()]).matches_values(&["a"]));
    }
}
