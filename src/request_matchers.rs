//!
//! Request matchers: predicates over a `ClientRequest` that fail with an `ErrorKind::Assertion`
//! error describing the expected and the actual value.
//!

use crate::diff;
use crate::{ClientRequest, Error, Matcher};
use http::Method;
use std::fmt;

///
/// A predicate evaluated against an outgoing request.
///
/// A mismatch is reported as an `ErrorKind::Assertion` error. Any other error kind (for example
/// `ErrorKind::Io`) is treated as an environment failure and is never skipped over while looking
/// for another candidate expectation.
///
/// Closures taking a `&ClientRequest` and returning `Result<(), Error>` implement this trait.
///
/// # Deadlocks
///
/// Matchers are evaluated while the `ExpectationManager` holds its lock. A matcher calling back
/// into the manager (`request_count`, `requests`, `verify`, ...) never returns.
///
pub trait RequestMatcher: Send + Sync {
    /// Checks the request, returning an error on mismatch.
    fn matches(&self, request: &ClientRequest) -> Result<(), Error>;

    /// A short human readable description, used in diagnostics.
    fn description(&self) -> String {
        "(custom matcher)".to_string()
    }
}

impl<F> RequestMatcher for F
where
    F: Fn(&ClientRequest) -> Result<(), Error> + Send + Sync,
{
    fn matches(&self, request: &ClientRequest) -> Result<(), Error> {
        self(request)
    }
}

type CheckFn = dyn Fn(&ClientRequest) -> Result<(), Error> + Send + Sync + 'static;

///
/// A described request matcher, as returned by the functions of this module.
///
pub struct RequestMatch {
    description: String,
    check: Box<CheckFn>,
}

impl RequestMatch {
    fn new(
        description: impl Into<String>,
        check: impl Fn(&ClientRequest) -> Result<(), Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            check: Box::new(check),
        }
    }
}

impl RequestMatcher for RequestMatch {
    fn matches(&self, request: &ClientRequest) -> Result<(), Error> {
        (self.check)(request)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

impl fmt::Debug for RequestMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestMatch")
            .field("description", &self.description)
            .finish()
    }
}

fn mismatch(subject: &str, expected: impl fmt::Display, actual: impl fmt::Display) -> Error {
    Error::assertion(format!(
        "{} expected:<{}> but was:<{}>",
        subject, expected, actual
    ))
}

///
/// Matches any request.
///
pub fn anything() -> RequestMatch {
    RequestMatch::new("anything", |_| Ok(()))
}

///
/// Matches the request method.
///
/// ## Example
///
/// ```
/// use restmock::request_matchers::method;
/// use restmock::{ClientRequest, RequestMatcher};
/// use http::{Method, Uri};
///
/// let request = ClientRequest::new(Method::POST, Uri::from_static("/"));
/// let err = method(Method::GET).matches(&request).unwrap_err();
/// assert_eq!("Unexpected HttpMethod expected:<GET> but was:<POST>", err.message());
/// ```
///
pub fn method(expected: Method) -> RequestMatch {
    RequestMatch::new(format!("method {}", expected), move |request| {
        if *request.method() == expected {
            Ok(())
        } else {
            Err(mismatch("Unexpected HttpMethod", &expected, request.method()))
        }
    })
}

///
/// Matches the full request URI, as rendered by `http::Uri`. Accepts a string for an exact
/// match or any other `Matcher`.
///
pub fn request_to<M: Into<Matcher>>(uri: M) -> RequestMatch {
    let matcher = uri.into();
    RequestMatch::new(format!("request to {}", matcher), move |request| {
        let actual = request.uri().to_string();
        if matcher.matches_value(&actual) {
            Ok(())
        } else {
            Err(mismatch("Request URI", &matcher, actual))
        }
    })
}

///
/// Matches the decoded values of the query parameter `name`. Every value must match, and
/// `Matcher::Missing` checks that the parameter is absent.
///
pub fn query_param<M: Into<Matcher>>(name: &str, value: M) -> RequestMatch {
    let name = name.to_owned();
    let matcher = value.into();
    RequestMatch::new(
        format!("query param {}={}", name, matcher),
        move |request| {
            let query = request.query().unwrap_or("");
            let params: Vec<(String, String)> =
                serde_urlencoded::from_str(query).map_err(|err| {
                    Error::assertion(format!(
                        "Query param [{}] could not be read from {:?}: {}",
                        name, query, err
                    ))
                })?;
            let values: Vec<&str> = params
                .iter()
                .filter(|(field, _)| field == &name)
                .map(|(_, value)| value.as_str())
                .collect();

            if matcher.matches_values(&values) {
                Ok(())
            } else {
                Err(mismatch(
                    &format!("Query param [{}]", name),
                    &matcher,
                    format!("{:?}", values),
                ))
            }
        },
    )
}

///
/// Matches the values of the request header `name`. The field letter case is ignored,
/// every value must match, and `Matcher::Missing` checks that the header is absent.
///
pub fn header<M: Into<Matcher>>(name: &str, value: M) -> RequestMatch {
    let name = name.to_lowercase();
    let matcher = value.into();
    RequestMatch::new(format!("header {}: {}", name, matcher), move |request| {
        let values = request.header(&name);
        if matcher.matches_values(&values) {
            Ok(())
        } else {
            Err(mismatch(
                &format!("Request header [{}]", name),
                &matcher,
                format!("{:?}", values),
            ))
        }
    })
}

///
/// Matches requests without the header `name`.
///
pub fn header_does_not_exist(name: &str) -> RequestMatch {
    header(name, Matcher::Missing)
}

///
/// Matches the `content-type` header.
///
pub fn content_type<M: Into<Matcher>>(value: M) -> RequestMatch {
    let matcher = value.into();
    RequestMatch::new(format!("content type {}", matcher), move |request| {
        let actual = request.content_type();
        let values: Vec<&str> = actual.into_iter().collect();
        if matcher.matches_values(&values) {
            Ok(())
        } else {
            Err(mismatch(
                "Content type",
                &matcher,
                actual.unwrap_or("(missing)"),
            ))
        }
    })
}

///
/// Matches the request body. Text matchers compare against the body decoded as UTF-8, while
/// `Matcher::Binary` compares the raw bytes.
///
/// ## Example
///
/// ```
/// use restmock::request_matchers::body;
/// use restmock::{ClientRequest, Matcher, RequestMatcher};
/// use http::{Method, Uri};
/// use serde_json::json;
///
/// let request = ClientRequest::new(Method::POST, Uri::from_static("/"))
///     .with_body(r#"{"hello": "world", "lang": "en"}"#);
///
/// assert!(body(Matcher::PartialJson(json!({"hello": "world"}))).matches(&request).is_ok());
/// ```
///
pub fn body<M: Into<Matcher>>(expected: M) -> RequestMatch {
    let matcher = expected.into();
    RequestMatch::new(format!("body {}", matcher), move |request| {
        if matcher.matches_binary_value(request.body()) {
            return Ok(());
        }

        let actual = String::from_utf8_lossy(request.body());
        let mut err = mismatch("Request body", &matcher, &actual);
        if let Matcher::Exact(ref expected) | Matcher::JsonString(ref expected) = matcher {
            err.context = err
                .context
                .map(|context| format!("{}\n{}", context, diff::compare(expected, &actual)));
        }
        Err(err)
    })
}

///
/// Matches the JSON value found under the RFC 6901 `pointer` of the request body. String values
/// are compared without quotes, other values by their JSON rendering. `Matcher::Missing` checks
/// that nothing exists under the pointer.
///
/// ## Example
///
/// ```
/// use restmock::request_matchers::json_path;
/// use restmock::{ClientRequest, Matcher, RequestMatcher};
/// use http::{Method, Uri};
///
/// let request = ClientRequest::new(Method::POST, Uri::from_static("/"))
///     .with_body(r#"{"user": {"name": "alice", "age": 42}}"#);
///
/// assert!(json_path("/user/name", "alice").matches(&request).is_ok());
/// assert!(json_path("/user/age", "42").matches(&request).is_ok());
/// assert!(json_path("/user/email", Matcher::Missing).matches(&request).is_ok());
/// ```
///
pub fn json_path<M: Into<Matcher>>(pointer: &str, value: M) -> RequestMatch {
    let pointer = pointer.to_owned();
    let matcher = value.into();
    RequestMatch::new(
        format!("json path {} {}", pointer, matcher),
        move |request| {
            let document = request.body_json()?;
            let actual = document.pointer(&pointer).map(|value| match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            });
            let values: Vec<&str> = actual.iter().map(String::as_str).collect();

            if matcher.matches_values(&values) {
                Ok(())
            } else {
                Err(mismatch(
                    &format!("JSON path \"{}\"", pointer),
                    &matcher,
                    actual.as_deref().unwrap_or("(missing)"),
                ))
            }
        },
    )
}
