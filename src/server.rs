use crate::expectation::ResponseActions;
use crate::transport::Transport;
use crate::{
    ClientRequest, Error, ExpectationManager, ExpectationOrder, ExpectedCount, RequestMatcher,
};
use bytes::Bytes;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

///
/// Options to configure a `MockServer`.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOpts {
    /// The order requests are matched with. Defaults to `ExpectationOrder::Ordered`.
    pub order: ExpectationOrder,
    /// Verify the expectations when the server is dropped and panic if they were not met.
    pub assert_on_drop: bool,
}

///
/// The entry point for tests: declares expectations and hands out the `MockTransport` the
/// client under test sends its requests through.
///
/// ## Example
///
/// ```
/// use restmock::request_matchers::{method, request_to};
/// use restmock::response::with_success;
/// use restmock::{ClientRequest, MockServer, Transport};
/// use http::{Method, Uri};
///
/// let server = MockServer::new();
/// server
///     .expect(request_to("/hello"))
///     .and_expect(method(Method::GET))
///     .and_respond(with_success().body("world"));
///
/// // normally handed to the client under test
/// let transport = server.transport();
/// let request = ClientRequest::new(Method::GET, Uri::from_static("/hello"));
/// let response = transport.execute(&request).unwrap();
///
/// assert_eq!(response.body(), "world");
/// server.assert();
/// ```
///
#[derive(Debug)]
pub struct MockServer {
    manager: Arc<ExpectationManager>,
    opts: ServerOpts,
}

impl MockServer {
    /// Creates a server matching requests in declaration order.
    pub fn new() -> Self {
        Self::new_with_opts(ServerOpts::default())
    }

    /// Creates a server with the given options.
    pub fn new_with_opts(opts: ServerOpts) -> Self {
        Self {
            manager: Arc::new(ExpectationManager::new(opts.order)),
            opts,
        }
    }

    /// Creates a server accepting requests in any order.
    pub fn unordered() -> Self {
        Self::new_with_opts(ServerOpts {
            order: ExpectationOrder::Unordered,
            ..ServerOpts::default()
        })
    }

    /// Creates a server requiring each expectation to be satisfied before the next one.
    pub fn strict_ordered() -> Self {
        Self::new_with_opts(ServerOpts {
            order: ExpectationOrder::StrictOrdered,
            ..ServerOpts::default()
        })
    }

    ///
    /// Declares an expectation for exactly one request.
    ///
    /// # Panics
    ///
    /// When called after the first request and before `reset`.
    ///
    #[track_caller]
    pub fn expect(&self, matcher: impl RequestMatcher + 'static) -> ResponseActions {
        self.manager.expect_request(ExpectedCount::once(), matcher)
    }

    ///
    /// Declares an expectation for `count` requests.
    ///
    /// # Panics
    ///
    /// When called after the first request and before `reset`.
    ///
    #[track_caller]
    pub fn expect_times(
        &self,
        count: impl Into<ExpectedCount>,
        matcher: impl RequestMatcher + 'static,
    ) -> ResponseActions {
        self.manager.expect_request(count, matcher)
    }

    /// See `ExpectationManager::verify`.
    pub fn verify(&self) -> Result<(), Error> {
        self.manager.verify()
    }

    /// See `ExpectationManager::verify_timeout`.
    pub fn verify_timeout(&self, timeout: Duration) -> Result<(), Error> {
        self.manager.verify_timeout(timeout)
    }

    ///
    /// Asserts that all expectations were met, panicking with the verification message otherwise.
    ///
    #[track_caller]
    pub fn assert(&self) {
        if let Err(err) = self.verify() {
            panic!("{}", err.message());
        }
    }

    /// See `ExpectationManager::reset`.
    pub fn reset(&self) {
        self.manager.reset();
    }

    /// The underlying expectation manager.
    pub fn manager(&self) -> &Arc<ExpectationManager> {
        &self.manager
    }

    /// A transport answering from the declared expectations. Can be cloned and sent across threads.
    pub fn transport(&self) -> MockTransport {
        MockTransport {
            manager: self.manager.clone(),
        }
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if !self.opts.assert_on_drop || thread::panicking() {
            return;
        }

        if let Err(err) = self.verify() {
            panic!("{}", err.message());
        }
    }
}

///
/// The transport handed to the client under test. Every request is validated against the
/// expectations of the `MockServer` it came from instead of going over the network.
///
#[derive(Clone, Debug)]
pub struct MockTransport {
    manager: Arc<ExpectationManager>,
}

impl Transport for MockTransport {
    fn execute(&self, request: &ClientRequest) -> Result<http::Response<Bytes>, Error> {
        self.manager.validate_request(request)
    }
}
