use std::fmt;
use std::ops::{RangeFrom, RangeInclusive};

///
/// The range of calls an expectation accepts, with `min <= max`.
///
/// ## Example
///
/// ```
/// use restmock::ExpectedCount;
///
/// assert_eq!(ExpectedCount::times(2), ExpectedCount::between(2, 2));
/// assert_eq!(ExpectedCount::from(1..=3), ExpectedCount::between(1, 3));
/// assert_eq!(ExpectedCount::min(2).max_count(), usize::MAX);
/// ```
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpectedCount {
    min: usize,
    max: usize,
}

impl ExpectedCount {
    /// Exactly once.
    pub const fn once() -> Self {
        Self { min: 1, max: 1 }
    }

    /// Exactly twice.
    pub const fn twice() -> Self {
        Self { min: 2, max: 2 }
    }

    /// Exactly `count` times.
    pub const fn times(count: usize) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    /// At least once, with no upper bound.
    pub const fn many_times() -> Self {
        Self {
            min: 1,
            max: usize::MAX,
        }
    }

    /// At least `min` times, with no upper bound.
    pub const fn min(min: usize) -> Self {
        Self {
            min,
            max: usize::MAX,
        }
    }

    /// At least once and at most `max` times.
    #[track_caller]
    pub fn max(max: usize) -> Self {
        Self::between(1, max)
    }

    /// Between `min` and `max` times, both inclusive.
    ///
    /// # Panics
    ///
    /// When `max` is smaller than `min`.
    #[track_caller]
    pub fn between(min: usize, max: usize) -> Self {
        assert!(
            max >= min,
            "max count must be greater than or equal to min count (min: {}, max: {})",
            min,
            max
        );
        Self { min, max }
    }

    /// The request must not be performed at all.
    pub const fn never() -> Self {
        Self { min: 0, max: 0 }
    }

    /// The minimum number of calls.
    pub const fn min_count(&self) -> usize {
        self.min
    }

    /// The maximum number of calls.
    pub const fn max_count(&self) -> usize {
        self.max
    }
}

impl Default for ExpectedCount {
    fn default() -> Self {
        Self::once()
    }
}

impl From<usize> for ExpectedCount {
    fn from(count: usize) -> Self {
        Self::times(count)
    }
}

impl From<RangeInclusive<usize>> for ExpectedCount {
    #[track_caller]
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::between(*range.start(), *range.end())
    }
}

impl From<RangeFrom<usize>> for ExpectedCount {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::min(range.start)
    }
}

impl fmt::Display for ExpectedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (1, 1) => f.write_str("once"),
            (min, max) if min == max => write!(f, "exactly {}", min),
            (min, usize::MAX) => write!(f, "at least {}", min),
            (min, max) => write!(f, "between {} and {}", min, max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_implies_at_least_once() {
        let count = ExpectedCount::max(3);
        assert_eq!(1, count.min_count());
        assert_eq!(3, count.max_count());
    }

    #[test]
    #[should_panic(expected = "max count must be greater than or equal to min count")]
    fn test_between_rejects_inverted_range() {
        ExpectedCount::between(3, 2);
    }

    #[test]
    fn test_display() {
        assert_eq!("once", ExpectedCount::once().to_string());
        assert_eq!("exactly 0", ExpectedCount::never().to_string());
        assert_eq!("at least 2", ExpectedCount::min(2).to_string());
        assert_eq!("between 1 and 4", ExpectedCount::max(4).to_string());
    }
}
