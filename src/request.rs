use crate::{Error, ErrorKind};
use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue, IntoHeaderName};
use http::{Method, Uri};
use std::fmt;

///
/// A read-only view of an outgoing client request, as seen by matchers and response creators.
///
#[derive(Clone, Debug)]
pub struct ClientRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl ClientRequest {
    ///
    /// Creates a request without headers or body.
    ///
    /// ## Example
    ///
    /// ```
    /// use restmock::ClientRequest;
    /// use http::{Method, Uri};
    ///
    /// let request = ClientRequest::new(Method::GET, Uri::from_static("/hello?lang=en"));
    /// assert_eq!("/hello", request.path());
    /// assert_eq!(Some("lang=en"), request.query());
    /// ```
    ///
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a header value, keeping any previous values of the same field.
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// All request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    ///
    /// All values of the header `name`, in the order they were added. The field name is
    /// case insensitive.
    ///
    pub fn header(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .map(|value| value.to_str().unwrap_or("<binary>"))
            .collect()
    }

    /// The `content-type` header, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// The raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The request body as UTF-8 text.
    pub fn body_str(&self) -> Result<&str, Error> {
        std::str::from_utf8(&self.body)
            .map_err(|err| Error::new_with_context(ErrorKind::Assertion, err))
    }

    /// The request body parsed as JSON.
    pub fn body_json(&self) -> Result<serde_json::Value, Error> {
        serde_json::from_slice(&self.body).map_err(|err| {
            Error::new_with_context(
                ErrorKind::Assertion,
                format!("request body is not valid JSON: {}", err),
            )
        })
    }

    ///
    /// Renders the headers as `{name=[value, value], other=[value]}`, one entry per field
    /// in insertion order.
    ///
    pub fn string_headers(&self) -> String {
        let entries: Vec<String> = self
            .headers
            .keys()
            .map(|name| {
                let values: Vec<String> = self
                    .headers
                    .get_all(name)
                    .iter()
                    .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                    .collect();
                format!("{}=[{}]", name, values.join(", "))
            })
            .collect();

        format!("{{{}}}", entries.join(", "))
    }
}

impl From<http::Request<Bytes>> for ClientRequest {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }
}

impl fmt::Display for ClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)?;
        if !self.headers.is_empty() {
            write!(f, ", headers: {}", self.string_headers())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_headers() {
        let request = ClientRequest::new(Method::GET, Uri::from_static("/hello"));
        assert_eq!("GET /hello", request.to_string());
    }

    #[test]
    fn test_display_with_repeated_headers() {
        let request = ClientRequest::new(Method::POST, Uri::from_static("http://localhost/a"))
            .with_header("accept", HeaderValue::from_static("text/plain"))
            .with_header("accept", HeaderValue::from_static("application/json"))
            .with_header("x-id", HeaderValue::from_static("1"));

        assert_eq!(
            "POST http://localhost/a, headers: {accept=[text/plain, application/json], x-id=[1]}",
            request.to_string()
        );
    }

    #[test]
    fn test_body_json() {
        let request = ClientRequest::new(Method::POST, Uri::from_static("/"))
            .with_body(r#"{"hello": "world"}"#);
        assert_eq!(
            serde_json::json!({"hello": "world"}),
            request.body_json().unwrap()
        );

        let request = ClientRequest::new(Method::POST, Uri::from_static("/")).with_body("nope");
        assert!(request.body_json().unwrap_err().is_assertion());
    }
}
