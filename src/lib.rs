#![warn(missing_docs)]

//!
//! Restmock lets tests declare the requests an HTTP client is expected to send, answers them with
//! canned (or passed-through) responses and verifies that every expectation was met.
//!
//! The client under test sends its requests through a `Transport`. In tests that transport is the
//! `MockTransport` of a `MockServer`, which validates every request against the declared
//! expectations instead of going over the network.
//!
//! # Getting Started
//!
//! Declare the expected requests, hand the transport to your client, then verify:
//!
//! ```
//! use restmock::request_matchers::{method, request_to};
//! use restmock::response::with_success;
//! use restmock::{ClientRequest, MockServer, Transport};
//! use http::{Method, Uri};
//!
//! let server = MockServer::new();
//!
//! server
//!     .expect(request_to("/hello"))
//!     .and_expect(method(Method::GET))
//!     .and_respond(
//!         with_success()
//!             .content_type("text/plain")
//!             .body("world"),
//!     );
//!
//! let transport = server.transport();
//! let response = transport
//!     .execute(&ClientRequest::new(Method::GET, Uri::from_static("/hello")))
//!     .unwrap();
//!
//! assert_eq!(response.body(), "world");
//! server.assert();
//! ```
//!
//! # Expectations
//!
//! Every call to `MockServer::expect` or `MockServer::expect_times` declares a new expectation:
//! a chain of request matchers (extended with `and_expect`), an `ExpectedCount` and a response
//! creator (assigned with `and_respond`).
//!
//! Expectations can only be declared before the first request. Once a request was validated,
//! declaring further expectations panics until `MockServer::reset` is called.
//!
//! ## Example
//!
//! ```
//! use restmock::request_matchers::request_to;
//! use restmock::response::with_no_content;
//! use restmock::{ExpectedCount, MockServer};
//!
//! let server = MockServer::new();
//!
//! server
//!     .expect_times(ExpectedCount::between(1, 3), request_to("/ping"))
//!     .and_respond(with_no_content());
//!
//! server
//!     .expect_times(ExpectedCount::from(2..), request_to("/status"))
//!     .and_respond(with_no_content());
//! ```
//!
//! # Ordering
//!
//! Requests are matched against the expectations in one of three orders, picked through
//! `ServerOpts::order`:
//!
//! * `ExpectationOrder::Ordered` (the default): the first request for each expectation must
//!   follow the declaration order. Repeated requests for expectations that were already hit may
//!   come in any order.
//! * `ExpectationOrder::StrictOrdered`: each expectation must receive its minimum number of
//!   requests before the next one may match.
//! * `ExpectationOrder::Unordered`: requests may come in any order.
//!
//! ## Example
//!
//! ```
//! use restmock::request_matchers::request_to;
//! use restmock::response::with_success;
//! use restmock::{ClientRequest, MockServer, Transport};
//! use http::{Method, Uri};
//!
//! let server = MockServer::unordered();
//! server.expect(request_to("/a")).and_respond(with_success());
//! server.expect(request_to("/b")).and_respond(with_success());
//!
//! let transport = server.transport();
//! transport.execute(&ClientRequest::new(Method::GET, Uri::from_static("/b"))).unwrap();
//! transport.execute(&ClientRequest::new(Method::GET, Uri::from_static("/a"))).unwrap();
//!
//! server.assert();
//! ```
//!
//! # Matching
//!
//! The `request_matchers` module offers matchers for the method, URI, query parameters, headers,
//! content type and body. Values are described with a `Matcher`: an exact string, a regex, a
//! (partial) JSON document, a URL-encoded pair, or a combination of those.
//!
//! ## Example
//!
//! ```
//! use restmock::request_matchers::{body, header, query_param, request_to};
//! use restmock::response::with_created_entity;
//! use restmock::{Matcher, MockServer};
//! use serde_json::json;
//!
//! let server = MockServer::new();
//!
//! server
//!     .expect(request_to(Matcher::Regex(r"^/users(\?.*)?$".to_string())))
//!     .and_expect(query_param("notify", "true"))
//!     .and_expect(header("content-type", "application/json"))
//!     .and_expect(body(Matcher::PartialJson(json!({"name": "alice"}))))
//!     .and_respond(with_created_entity("/users/1"));
//! ```
//!
//! Any closure taking a `&ClientRequest` and returning `Result<(), restmock::Error>` is a
//! matcher too. A mismatch should be reported as an `ErrorKind::Assertion` error; other error
//! kinds are treated as hard failures.
//!
//! # Verifying
//!
//! `MockServer::verify` fails if any request failed to match (or its response could not be
//! created), and otherwise if any expectation did not receive its minimum number of requests.
//! Every message lists the requests executed so far.
//!
//! For clients sending requests in the background, `MockServer::verify_timeout` waits for the
//! expectations to be satisfied before verifying.
//!
//! Setting `ServerOpts::assert_on_drop` verifies the server when it goes out of scope.
//!
//! # Passing requests through
//!
//! `ExecutingResponseCreator` forwards the matched request to another `Transport`, for example
//! the network-backed `HttpTransport`, and returns the real response.
//!
//! # Debug
//!
//! Restmock logs through the `log` crate. Matched requests are logged at debug level and failed
//! requests at warn level, so any logger will show them:
//!
//! ```
//! let _ = env_logger::try_init();
//! ```
//!

pub use count::ExpectedCount;
pub use error::{Error, ErrorKind};
pub use expectation::{Expectation, ResponseActions};
pub use manager::ExpectationManager;
pub use matcher::Matcher;
pub use request::ClientRequest;
pub use request_matchers::RequestMatcher;
pub use response::{ExecutingResponseCreator, ResponseCreator};
pub use server::{MockServer, MockTransport, ServerOpts};
pub use strategy::ExpectationOrder;
pub use transport::{HttpTransport, Transport};

mod count;
mod diff;
mod error;
mod expectation;
mod group;
mod manager;
mod matcher;
mod request;
pub mod request_matchers;
pub mod response;
mod server;
mod strategy;
mod transport;
