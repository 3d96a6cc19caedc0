use crate::expectation::ResponseActions;
use crate::strategy::MatchingStrategy;
use crate::{
    ClientRequest, Error, Expectation, ExpectationOrder, ExpectedCount, RequestMatcher,
};
use bytes::Bytes;
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

const VERIFY_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug)]
struct State {
    expectations: Vec<Arc<Expectation>>,
    requests: Vec<ClientRequest>,
    failures: Vec<(ClientRequest, Error)>,
    declared: bool,
    strategy: MatchingStrategy,
}

impl State {
    fn new(order: ExpectationOrder) -> Self {
        Self {
            expectations: Vec::new(),
            requests: Vec::new(),
            failures: Vec::new(),
            declared: false,
            strategy: MatchingStrategy::new(order),
        }
    }

    fn unsatisfied_count(&self) -> usize {
        self.expectations
            .iter()
            .filter(|expectation| !expectation.is_satisfied())
            .count()
    }
}

///
/// Tracks the declared request expectations of a client, matches every outgoing request against
/// them and reports what went wrong.
///
/// Expectations can only be declared until the first request is validated. The manager can be
/// shared between threads: matching is serialized behind a lock, while responses are created
/// outside of it.
///
/// ## Example
///
/// ```
/// use restmock::request_matchers::request_to;
/// use restmock::response::with_success;
/// use restmock::{ClientRequest, ExpectationManager, ExpectedCount};
/// use http::{Method, Uri};
///
/// let manager = ExpectationManager::default();
/// manager
///     .expect_request(ExpectedCount::once(), request_to("/hello"))
///     .and_respond(with_success().body("world"));
///
/// let request = ClientRequest::new(Method::GET, Uri::from_static("/hello"));
/// let response = manager.validate_request(&request).unwrap();
/// assert_eq!(response.body(), "world");
///
/// manager.verify().unwrap();
/// ```
///
#[derive(Debug)]
pub struct ExpectationManager {
    order: ExpectationOrder,
    state: Mutex<State>,
}

impl ExpectationManager {
    /// Creates a manager matching requests with the given order.
    pub fn new(order: ExpectationOrder) -> Self {
        Self {
            order,
            state: Mutex::new(State::new(order)),
        }
    }

    /// The order requests are matched with.
    pub fn order(&self) -> ExpectationOrder {
        self.order
    }

    ///
    /// Declares a new expectation accepting `count` requests that pass `matcher`.
    ///
    /// # Panics
    ///
    /// When called after the first request was validated and before `reset`.
    ///
    #[track_caller]
    pub fn expect_request(
        &self,
        count: impl Into<ExpectedCount>,
        matcher: impl RequestMatcher + 'static,
    ) -> ResponseActions {
        match self.try_expect_request(count, matcher) {
            Ok(actions) => actions,
            Err(err) => panic!("{}", err),
        }
    }

    ///
    /// Same as `ExpectationManager::expect_request`, but returns an `ErrorKind::Configuration`
    /// error instead of panicking.
    ///
    pub fn try_expect_request(
        &self,
        count: impl Into<ExpectedCount>,
        matcher: impl RequestMatcher + 'static,
    ) -> Result<ResponseActions, Error> {
        let mut state = self.lock();
        if state.declared {
            return Err(Error::configuration(
                "Cannot declare further expectations after the first request",
            ));
        }

        let expectation = Arc::new(Expectation::new(count.into(), Arc::new(matcher)));
        state.expectations.push(expectation.clone());

        Ok(ResponseActions::new(expectation))
    }

    ///
    /// Matches `request` against the declared expectations and creates the response of the
    /// matching one.
    ///
    /// The first call freezes the declarations. Every failure is returned as is and also recorded,
    /// so that a later `verify` fails as well.
    ///
    /// Matchers run while the manager is locked, so they must not call back into it.
    ///
    pub fn validate_request(&self, request: &ClientRequest) -> Result<http::Response<Bytes>, Error> {
        let expectation = {
            let mut state = self.lock();
            let state = &mut *state;

            if !state.declared {
                state.declared = true;
                log::debug!(
                    "Expectations declared ({}), matching in {:?} order",
                    state.expectations.len(),
                    self.order
                );
                state.strategy.expectations_declared(&state.expectations);
            }

            let result = state.strategy.match_request(request, &state.requests);
            state.requests.push(request.clone());

            match result {
                Ok(expectation) => {
                    log::debug!("Matched request {} against {}", request, expectation);
                    expectation
                }
                Err(err) => {
                    log::warn!("Request {} did not match: {}", request, err);
                    state.failures.push((request.clone(), err.clone()));
                    return Err(err);
                }
            }
        };

        expectation.create_response(request).map_err(|err| {
            log::warn!("Could not create a response for {}: {}", request, err);
            self.lock().failures.push((request.clone(), err.clone()));
            err
        })
    }

    ///
    /// Checks that all expectations were met.
    ///
    /// Fails when any request failed, listing the failures, and otherwise when some expectations
    /// are still unsatisfied, listing the executed requests.
    ///
    pub fn verify(&self) -> Result<(), Error> {
        let state = self.lock();
        if state.expectations.is_empty() {
            return Ok(());
        }

        if !state.failures.is_empty() {
            return Err(failed_requests_error(&state.failures));
        }

        match state.unsatisfied_count() {
            0 => Ok(()),
            count => Err(Error::assertion(format!(
                "Further request(s) expected leaving {} unsatisfied expectation(s).\n{}",
                count,
                request_details(&state.requests)
            ))),
        }
    }

    ///
    /// Same as `ExpectationManager::verify`, but first waits up to `timeout` for the expectations
    /// to be satisfied. Meant for requests that complete in the background.
    ///
    /// Once the expectations are satisfied the wait ends early, but the result is still the one of
    /// `verify`: a request that failed earlier fails this call as well.
    ///
    pub fn verify_timeout(&self, timeout: Duration) -> Result<(), Error> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.unsatisfied_count() == 0 {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(VERIFY_POLL_INTERVAL.min(deadline - now));
        }

        self.verify()
    }

    ///
    /// Removes all expectations, requests and failures, so that new expectations can be declared.
    ///
    pub fn reset(&self) {
        let mut state = self.lock();
        state.expectations.clear();
        state.requests.clear();
        state.failures.clear();
        state.declared = false;
        state.strategy.reset();
        log::debug!("Expectation manager reset");
    }

    /// The number of requests validated so far, including failed ones.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// The requests validated so far, in execution order.
    pub fn requests(&self) -> Vec<ClientRequest> {
        self.lock().requests.clone()
    }

    fn unsatisfied_count(&self) -> usize {
        self.lock().unsatisfied_count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ExpectationManager {
    fn default() -> Self {
        Self::new(ExpectationOrder::default())
    }
}

pub(crate) fn unexpected_request_error(request: &ClientRequest, executed: &[ClientRequest]) -> Error {
    Error::assertion(format!(
        "No further requests expected: HTTP {} {}\n{}",
        request.method(),
        request.uri(),
        request_details(executed)
    ))
}

fn request_details(requests: &[ClientRequest]) -> String {
    let mut details = format!("{} request(s) executed", requests.len());
    if requests.is_empty() {
        details.push_str(".\n");
    } else {
        details.push_str(":\n");
        for request in requests {
            let _ = writeln!(details, "{}", request);
        }
    }
    details
}

fn failed_requests_error(failures: &[(ClientRequest, Error)]) -> Error {
    let entries: Vec<String> = failures
        .iter()
        .map(|(request, err)| format!("Failed request:\n{}\n{}", request, err))
        .collect();

    Error::assertion(format!(
        "Some requests did not execute successfully.\n{}",
        entries.join("\n\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Uri};

    fn get(uri: &'static str) -> ClientRequest {
        ClientRequest::new(Method::GET, Uri::from_static(uri))
    }

    #[test]
    fn test_request_details_without_requests() {
        assert_eq!("0 request(s) executed.\n", request_details(&[]));
    }

    #[test]
    fn test_request_details() {
        assert_eq!(
            "2 request(s) executed:\nGET /a\nGET /b\n",
            request_details(&[get("/a"), get("/b")])
        );
    }

    #[test]
    fn test_failed_requests_message() {
        let failures = vec![
            (get("/a"), Error::assertion("first")),
            (get("/b"), Error::assertion("second")),
        ];
        assert_eq!(
            "Some requests did not execute successfully.\n\
             Failed request:\nGET /a\nassertion failed: first\n\n\
             Failed request:\nGET /b\nassertion failed: second",
            failed_requests_error(&failures).message()
        );
    }
}
