use crate::group::ExpectationGroup;
use crate::manager::unexpected_request_error;
use crate::{ClientRequest, Error, Expectation};
use std::collections::VecDeque;
use std::sync::Arc;

///
/// How requests are matched against the declared expectations.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExpectationOrder {
    /// The first request for each expectation must arrive in declaration order. Repeated requests
    /// for expectations that were already hit may arrive in any order.
    #[default]
    Ordered,
    /// Each expectation must be satisfied, in declaration order, before the next one may match.
    /// An expectation keeps accepting requests up to its maximum count until a later one matches.
    StrictOrdered,
    /// Requests may arrive in any order.
    Unordered,
}

#[derive(Debug)]
pub(crate) enum MatchingStrategy {
    Ordered {
        pending: VecDeque<Arc<Expectation>>,
        repeats: ExpectationGroup,
    },
    StrictOrdered {
        remaining: Vec<Arc<Expectation>>,
    },
    Unordered {
        remaining: ExpectationGroup,
    },
}

impl MatchingStrategy {
    pub(crate) fn new(order: ExpectationOrder) -> Self {
        match order {
            ExpectationOrder::Ordered => MatchingStrategy::Ordered {
                pending: VecDeque::new(),
                repeats: ExpectationGroup::default(),
            },
            ExpectationOrder::StrictOrdered => MatchingStrategy::StrictOrdered {
                remaining: Vec::new(),
            },
            ExpectationOrder::Unordered => MatchingStrategy::Unordered {
                remaining: ExpectationGroup::default(),
            },
        }
    }

    /// Builds the working view once the first request froze the declarations.
    pub(crate) fn expectations_declared(&mut self, expectations: &[Arc<Expectation>]) {
        match self {
            MatchingStrategy::Ordered { pending, .. } => {
                pending.extend(expectations.iter().cloned());
            }
            MatchingStrategy::StrictOrdered { remaining } => {
                remaining.extend(expectations.iter().cloned());
            }
            MatchingStrategy::Unordered { remaining } => remaining.add_all(expectations),
        }
    }

    ///
    /// Finds the expectation for `request` and counts the match against it. `executed` holds the
    /// requests seen before this one, for the unexpected request diagnostic.
    ///
    pub(crate) fn match_request(
        &mut self,
        request: &ClientRequest,
        executed: &[ClientRequest],
    ) -> Result<Arc<Expectation>, Error> {
        match self {
            MatchingStrategy::Ordered { pending, repeats } => {
                if let Some(expectation) = repeats.find_expectation(request)? {
                    repeats.update(&expectation)?;
                    return Ok(expectation);
                }

                let expectation = pending
                    .pop_front()
                    .ok_or_else(|| unexpected_request_error(request, executed))?;
                expectation.matches(request)?;
                repeats.update(&expectation)?;
                Ok(expectation)
            }
            MatchingStrategy::StrictOrdered { remaining } => {
                let index = find_in_strict_order(remaining, request)?
                    .ok_or_else(|| unexpected_request_error(request, executed))?;

                let expectation = remaining[index].clone();
                expectation.increment_and_validate()?;

                // satisfied expectations skipped over are done for good
                remaining.drain(..index);
                if !expectation.has_remaining_count() {
                    remaining.remove(0);
                }
                Ok(expectation)
            }
            MatchingStrategy::Unordered { remaining } => {
                let expectation = remaining
                    .find_expectation(request)?
                    .ok_or_else(|| unexpected_request_error(request, executed))?;
                remaining.update(&expectation)?;
                Ok(expectation)
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        match self {
            MatchingStrategy::Ordered { pending, repeats } => {
                pending.clear();
                repeats.reset();
            }
            MatchingStrategy::StrictOrdered { remaining } => remaining.clear(),
            MatchingStrategy::Unordered { remaining } => remaining.reset(),
        }
    }
}

// Satisfied expectations may be skipped over on an assertion failure, the first unsatisfied one
// must match.
fn find_in_strict_order(
    remaining: &[Arc<Expectation>],
    request: &ClientRequest,
) -> Result<Option<usize>, Error> {
    for (index, candidate) in remaining.iter().enumerate() {
        if !candidate.is_satisfied() {
            candidate.matches(request)?;
            return Ok(Some(index));
        }

        match candidate.matches(request) {
            Ok(()) => return Ok(Some(index)),
            Err(err) if err.is_assertion() => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(None)
}
