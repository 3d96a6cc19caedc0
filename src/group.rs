use crate::{ClientRequest, Error, Expectation};
use std::sync::Arc;

///
/// The expectations that are currently eligible for a request, regardless of declaration order.
/// An expectation is a member only while it has remaining call count.
///
#[derive(Debug, Default)]
pub(crate) struct ExpectationGroup {
    expectations: Vec<Arc<Expectation>>,
}

impl ExpectationGroup {
    ///
    /// Returns the first member whose matchers all pass. Assertion failures only rule out the
    /// candidate at hand, while any other failure is returned right away.
    ///
    pub(crate) fn find_expectation(
        &self,
        request: &ClientRequest,
    ) -> Result<Option<Arc<Expectation>>, Error> {
        for expectation in &self.expectations {
            match expectation.matches(request) {
                Ok(()) => return Ok(Some(expectation.clone())),
                Err(err) if err.is_assertion() => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(None)
    }

    pub(crate) fn add_all<'a>(&mut self, expectations: impl IntoIterator<Item = &'a Arc<Expectation>>) {
        for expectation in expectations {
            self.update_membership(expectation);
        }
    }

    ///
    /// Counts a matched request against `expectation`, then drops it from the group if its call
    /// count is used up.
    ///
    pub(crate) fn update(&mut self, expectation: &Arc<Expectation>) -> Result<(), Error> {
        expectation.increment_and_validate()?;
        self.update_membership(expectation);
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.expectations.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.expectations.len()
    }

    fn update_membership(&mut self, expectation: &Arc<Expectation>) {
        let position = self
            .expectations
            .iter()
            .position(|member| Arc::ptr_eq(member, expectation));

        match (expectation.has_remaining_count(), position) {
            (true, None) => self.expectations.push(expectation.clone()),
            (false, Some(index)) => {
                self.expectations.remove(index);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_matchers::request_to;
    use crate::{ErrorKind, ExpectedCount};
    use http::{Method, Uri};

    fn get(uri: &'static str) -> ClientRequest {
        ClientRequest::new(Method::GET, Uri::from_static(uri))
    }

    fn expectation(count: ExpectedCount, uri: &str) -> Arc<Expectation> {
        Arc::new(Expectation::new(count, Arc::new(request_to(uri))))
    }

    #[test]
    fn test_find_skips_mismatches() {
        let a = expectation(ExpectedCount::once(), "/a");
        let b = expectation(ExpectedCount::once(), "/b");
        let mut group = ExpectationGroup::default();
        group.add_all([&a, &b]);

        let found = group.find_expectation(&get("/b")).unwrap().unwrap();
        assert!(Arc::ptr_eq(&b, &found));
        assert!(group.find_expectation(&get("/c")).unwrap().is_none());
    }

    #[test]
    fn test_find_propagates_io_failures() {
        let failing = Arc::new(Expectation::new(
            ExpectedCount::once(),
            Arc::new(|_: &ClientRequest| -> Result<(), Error> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire").into())
            }),
        ));
        let b = expectation(ExpectedCount::once(), "/b");
        let mut group = ExpectationGroup::default();
        group.add_all([&failing, &b]);

        let err = group.find_expectation(&get("/b")).unwrap_err();
        assert_eq!(ErrorKind::Io, err.kind);
    }

    #[test]
    fn test_update_removes_exhausted_expectations() {
        let a = expectation(ExpectedCount::twice(), "/a");
        let mut group = ExpectationGroup::default();
        group.add_all([&a]);

        group.update(&a).unwrap();
        assert_eq!(1, group.len());
        group.update(&a).unwrap();
        assert_eq!(0, group.len());
        assert!(group.update(&a).unwrap_err().is_assertion());
    }

    #[test]
    fn test_add_all_skips_expectations_without_capacity() {
        let never = expectation(ExpectedCount::never(), "/a");
        let mut group = ExpectationGroup::default();
        group.add_all([&never]);
        assert_eq!(0, group.len());
    }
}
