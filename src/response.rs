//!
//! Response creators: canned responses, failing responses and pass-through to a real transport.
//!

use crate::transport::Transport;
use crate::{ClientRequest, Error, ErrorKind};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Response, StatusCode};
use std::fmt;
use std::io;
use std::sync::Arc;

///
/// Produces the response for a matched request.
///
/// Closures taking a `&ClientRequest` and returning `Result<http::Response<Bytes>, Error>`
/// implement this trait.
///
pub trait ResponseCreator: Send + Sync {
    /// Creates the response.
    fn create_response(&self, request: &ClientRequest) -> Result<Response<Bytes>, Error>;
}

impl<F> ResponseCreator for F
where
    F: Fn(&ClientRequest) -> Result<Response<Bytes>, Error> + Send + Sync,
{
    fn create_response(&self, request: &ClientRequest) -> Result<Response<Bytes>, Error> {
        self(request)
    }
}

type BodyFnWithRequest = dyn Fn(&ClientRequest) -> Vec<u8> + Send + Sync + 'static;

#[derive(Clone)]
pub(crate) enum Body {
    Bytes(Bytes),
    FnWithRequest(Arc<BodyFnWithRequest>),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Body::Bytes(ref b) => b.fmt(f),
            Body::FnWithRequest(_) => f.write_str("<callback>"),
        }
    }
}

///
/// A canned response. Start from one of the `with_*` functions of this module.
///
/// ## Example
///
/// ```
/// use restmock::response::with_success;
/// use restmock::{ClientRequest, ResponseCreator};
/// use http::{Method, Uri};
///
/// let creator = with_success()
///     .content_type("text/plain")
///     .header("x-api-key", "1234")
///     .body("world");
///
/// let request = ClientRequest::new(Method::GET, Uri::from_static("/hello"));
/// let response = creator.create_response(&request).unwrap();
///
/// assert_eq!(200, response.status());
/// assert_eq!(response.body(), "world");
/// ```
///
#[derive(Clone, Debug)]
pub struct DefaultResponseCreator {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Body,
}

impl DefaultResponseCreator {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Bytes(Bytes::new()),
        }
    }

    /// Sets the response body.
    pub fn body<StrOrBytes: AsRef<[u8]>>(mut self, body: StrOrBytes) -> Self {
        self.body = Body::Bytes(Bytes::copy_from_slice(body.as_ref()));
        self
    }

    /// Sets a JSON response body and its `content-type`.
    pub fn json(self, body: &serde_json::Value) -> Self {
        self.content_type("application/json").body(body.to_string())
    }

    ///
    /// Sets the body of the response dynamically while exposing the request object.
    ///
    /// The function must be thread-safe. If it's a closure, it can't be borrowing its context.
    /// Use `move` closures and `Arc` to share any data.
    ///
    pub fn body_from_request(
        mut self,
        callback: impl Fn(&ClientRequest) -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        self.body = Body::FnWithRequest(Arc::new(callback));
        self
    }

    /// Sets the `content-type` header, replacing any previous value.
    pub fn content_type(mut self, content_type: &str) -> Self {
        self.headers
            .retain(|(field, _)| !field.eq_ignore_ascii_case("content-type"));
        self.header("content-type", content_type)
    }

    /// Adds a response header.
    pub fn header(mut self, field: &str, value: &str) -> Self {
        self.headers.push((field.to_owned(), value.to_owned()));
        self
    }

    /// Sets the `location` header.
    pub fn location(self, location: &str) -> Self {
        self.header("location", location)
    }
}

impl ResponseCreator for DefaultResponseCreator {
    fn create_response(&self, request: &ClientRequest) -> Result<Response<Bytes>, Error> {
        let body = match self.body {
            Body::Bytes(ref bytes) => bytes.clone(),
            Body::FnWithRequest(ref body_fn) => Bytes::from(body_fn(request)),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;

        for (field, value) in &self.headers {
            let name = HeaderName::from_bytes(field.as_bytes())
                .map_err(|err| Error::new_with_context(ErrorKind::Configuration, err))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| Error::new_with_context(ErrorKind::Configuration, err))?;
            response.headers_mut().append(name, value);
        }

        Ok(response)
    }
}

/// A `200 OK` response.
pub fn with_success() -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::OK)
}

///
/// A response with the given status code.
///
/// # Panics
///
/// When the status code is outside `100..=999`.
///
#[track_caller]
pub fn with_status(status: u16) -> DefaultResponseCreator {
    match StatusCode::from_u16(status) {
        Ok(status) => DefaultResponseCreator::new(status),
        Err(_) => panic!(
            "{}",
            Error::new_with_context(
                ErrorKind::Configuration,
                format!("invalid status code {}", status)
            )
        ),
    }
}

/// A `201 Created` response with a `location` header.
pub fn with_created_entity(location: &str) -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::CREATED).location(location)
}

/// A `204 No Content` response.
pub fn with_no_content() -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::NO_CONTENT)
}

/// A `400 Bad Request` response.
pub fn with_bad_request() -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::BAD_REQUEST)
}

/// A `401 Unauthorized` response.
pub fn with_unauthorized_request() -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::UNAUTHORIZED)
}

/// A `429 Too Many Requests` response.
pub fn with_too_many_requests() -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::TOO_MANY_REQUESTS)
}

/// A `500 Internal Server Error` response.
pub fn with_server_error() -> DefaultResponseCreator {
    DefaultResponseCreator::new(StatusCode::INTERNAL_SERVER_ERROR)
}

///
/// Fails every matched request with an `ErrorKind::Io` error built from `error`, simulating a
/// network failure.
///
pub fn with_exception(error: io::Error) -> impl ResponseCreator {
    let error = Error::from(error);
    move |_: &ClientRequest| -> Result<Response<Bytes>, Error> { Err(error.clone()) }
}

///
/// Executes the matched request against a real transport and returns its response. Useful
/// when only some of the requests of a client should be mocked.
///
pub struct ExecutingResponseCreator {
    transport: Arc<dyn Transport>,
}

impl ExecutingResponseCreator {
    /// Delegates to `transport`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }
}

impl ResponseCreator for ExecutingResponseCreator {
    fn create_response(&self, request: &ClientRequest) -> Result<Response<Bytes>, Error> {
        log::debug!("Passing request {} through to the real transport", request);
        self.transport.execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Uri};

    fn get(uri: &'static str) -> ClientRequest {
        ClientRequest::new(Method::GET, Uri::from_static(uri))
    }

    #[test]
    fn test_created_entity() {
        let response = with_created_entity("/users/1")
            .create_response(&get("/users"))
            .unwrap();
        assert_eq!(StatusCode::CREATED, response.status());
        assert_eq!(response.headers()["location"], "/users/1");
    }

    #[test]
    fn test_body_from_request() {
        let creator = with_success().body_from_request(|request| request.path().as_bytes().to_vec());
        assert_eq!(creator.create_response(&get("/bob")).unwrap().body(), "/bob");
    }

    #[test]
    fn test_content_type_replaces_previous_value() {
        let response = with_success()
            .json(&serde_json::json!({"a": 1}))
            .content_type("application/problem+json")
            .create_response(&get("/"))
            .unwrap();
        let values: Vec<&str> = response
            .headers()
            .get_all("content-type")
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(vec!["application/problem+json"], values);
    }

    #[test]
    fn test_invalid_header_is_a_configuration_error() {
        let err = with_success()
            .header("bad header", "x")
            .create_response(&get("/"))
            .unwrap_err();
        assert_eq!(ErrorKind::Configuration, err.kind);
    }

    #[test]
    #[should_panic(expected = "invalid status code 1000")]
    fn test_with_status_rejects_invalid_code() {
        let _ = with_status(1000);
    }

    #[test]
    fn test_with_exception() {
        let creator = with_exception(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        let err = creator.create_response(&get("/")).unwrap_err();
        assert_eq!(ErrorKind::Io, err.kind);
        assert_eq!("reset", err.message());
    }
}
