use crate::{ClientRequest, Error, ExpectedCount, RequestMatcher, ResponseCreator};
use bytes::Bytes;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

///
/// A declared request expectation: a chain of request matchers, the accepted call count and the
/// response creator used once a request matches.
///
pub struct Expectation {
    id: String,
    count: ExpectedCount,
    matched: AtomicUsize,
    matchers: RwLock<Vec<Arc<dyn RequestMatcher>>>,
    response_creator: RwLock<Option<Arc<dyn ResponseCreator>>>,
}

impl Expectation {
    pub(crate) fn new(count: ExpectedCount, matcher: Arc<dyn RequestMatcher>) -> Self {
        Self {
            id: rand::rng()
                .sample_iter(&Alphanumeric)
                .map(char::from)
                .take(24)
                .collect(),
            count,
            matched: AtomicUsize::new(0),
            matchers: RwLock::new(vec![matcher]),
            response_creator: RwLock::new(None),
        }
    }

    /// A random identifier, unique per declared expectation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The accepted call count.
    pub fn expected_count(&self) -> ExpectedCount {
        self.count
    }

    /// The number of requests matched so far.
    pub fn matched_count(&self) -> usize {
        self.matched.load(Ordering::SeqCst)
    }

    ///
    /// Runs every matcher in declaration order and stops at the first failure. Never changes the
    /// matched count, so it can be called speculatively.
    ///
    pub fn matches(&self, request: &ClientRequest) -> Result<(), Error> {
        let matchers = self.matchers.read().unwrap_or_else(PoisonError::into_inner);
        matchers.iter().try_for_each(|matcher| matcher.matches(request))
    }

    /// Whether the expectation can accept at least one more request.
    pub fn has_remaining_count(&self) -> bool {
        self.matched_count() < self.count.max_count()
    }

    /// Whether the minimum call count has been reached.
    pub fn is_satisfied(&self) -> bool {
        self.matched_count() >= self.count.min_count()
    }

    ///
    /// Counts one more matched request. Fails without changing the count when the maximum call
    /// count was already reached.
    ///
    pub(crate) fn increment_and_validate(&self) -> Result<(), Error> {
        let max = self.count.max_count();
        self.matched
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |matched| {
                if matched < max {
                    Some(matched + 1)
                } else {
                    None
                }
            })
            .map(|_| ())
            .map_err(|matched| {
                Error::assertion(format!(
                    "Received more calls than expected: {} (expected {}, already matched {})",
                    self, self.count, matched
                ))
            })
    }

    ///
    /// Delegates to the response creator. Fails with an `ErrorKind::Configuration` error when no
    /// response creator was assigned.
    ///
    pub fn create_response(&self, request: &ClientRequest) -> Result<http::Response<Bytes>, Error> {
        let response_creator = self
            .response_creator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match response_creator {
            Some(response_creator) => response_creator.create_response(request),
            None => Err(Error::configuration(format!(
                "Response creator not set for expectation {}",
                self
            ))),
        }
    }

    pub(crate) fn add_matcher(&self, matcher: Arc<dyn RequestMatcher>) {
        self.matchers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(matcher);
    }

    pub(crate) fn set_response_creator(&self, response_creator: Arc<dyn ResponseCreator>) {
        *self
            .response_creator
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(response_creator);
    }

    pub(crate) fn has_response_creator(&self) -> bool {
        self.response_creator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matchers = self.matchers.read().unwrap_or_else(PoisonError::into_inner);
        let descriptions: Vec<String> = matchers.iter().map(|m| m.description()).collect();
        write!(f, "[{}]", descriptions.join(", "))
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("id", &self.id)
            .field("count", &self.count)
            .field("matched", &self.matched_count())
            .field("matchers", &self.to_string())
            .finish()
    }
}

///
/// Returned by `ExpectationManager::expect_request`. Adds further matchers to the declared
/// expectation and assigns its response.
///
/// ## Example
///
/// ```
/// use restmock::request_matchers::{header, method, request_to};
/// use restmock::response::with_success;
/// use restmock::{ExpectationManager, ExpectedCount};
/// use http::Method;
///
/// let manager = ExpectationManager::default();
///
/// manager
///     .expect_request(ExpectedCount::once(), request_to("/hello"))
///     .and_expect(method(Method::GET))
///     .and_expect(header("accept", "text/plain"))
///     .and_respond(with_success().body("world"));
/// ```
///
#[must_use = "an expectation without a response fails every matching request"]
pub struct ResponseActions {
    expectation: Arc<Expectation>,
}

impl ResponseActions {
    pub(crate) fn new(expectation: Arc<Expectation>) -> Self {
        Self { expectation }
    }

    /// Adds a matcher, evaluated after the ones already declared.
    pub fn and_expect(self, matcher: impl RequestMatcher + 'static) -> Self {
        self.expectation.add_matcher(Arc::new(matcher));
        self
    }

    ///
    /// Assigns the response creator. Returns the expectation so its matched count can be
    /// inspected later on.
    ///
    pub fn and_respond(self, response_creator: impl ResponseCreator + 'static) -> Arc<Expectation> {
        self.expectation
            .set_response_creator(Arc::new(response_creator));
        self.expectation.clone()
    }
}

impl Drop for ResponseActions {
    fn drop(&mut self) {
        if !self.expectation.has_response_creator() {
            log::warn!(
                "Missing .and_respond() call on expectation {}",
                self.expectation
            );
        }
    }
}
