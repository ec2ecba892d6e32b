//! Batch statistics types.

use std::fmt;

/// Running count of attempted vs. succeeded jobs within a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    /// Number of jobs attempted.
    pub total: usize,
    /// Number of jobs that succeeded. Never exceeds `total`.
    pub succeeded: usize,
}

impl BatchTally {
    /// Creates an empty tally.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
        }
    }

    /// Records one attempted job.
    pub const fn record(&mut self, succeeded: bool) {
        self.total += 1;
        if succeeded {
            self.succeeded += 1;
        }
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// True when every attempted job succeeded (vacuously true when empty).
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

impl fmt::Display for BatchTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally() {
        let tally = BatchTally::new();
        assert_eq!(tally.total, 0);
        assert_eq!(tally.succeeded, 0);
        assert_eq!(tally.failed(), 0);
        assert!(tally.all_succeeded());
        assert_eq!(tally.to_string(), "0/0");
    }

    #[test]
    fn record_counts_attempts_and_successes() {
        let mut tally = BatchTally::new();
        tally.record(true);
        tally.record(false);
        tally.record(true);
        assert_eq!(tally.total, 3);
        assert_eq!(tally.succeeded, 2);
        assert_eq!(tally.failed(), 1);
        assert!(!tally.all_succeeded());
        assert_eq!(tally.to_string(), "2/3");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn succeeded_never_exceeds_total(outcomes in proptest::collection::vec(any::<bool>(), 0..200)) {
                let mut tally = BatchTally::new();
                for ok in &outcomes {
                    tally.record(*ok);
                }
                prop_assert_eq!(tally.total, outcomes.len());
                prop_assert!(tally.succeeded <= tally.total);
                prop_assert_eq!(tally.succeeded, outcomes.iter().filter(|ok| **ok).count());
            }
        }
    }
}
