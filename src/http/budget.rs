//! Time-budget accounting for a single receive operation.
//!
//! A receive may take many partial reads; the whole operation shares one
//! shrinking wall-clock budget. Each read is bounded by the *current*
//! remaining time, never the original limit, so the per-attempt wait shrinks
//! monotonically across suspension points.

use std::time::Duration;

/// Remaining wall-clock time for an in-flight receive.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    remaining: Duration,
}

impl TimeBudget {
    /// Pick the initial budget: the keepalive timeout when one is configured
    /// (a reused connection waiting for its next request), otherwise the
    /// total receive timeout.
    pub fn new(keepalive_timeout: Option<Duration>, total_timeout: Duration) -> Self {
        Self {
            remaining: keepalive_timeout.unwrap_or(total_timeout),
        }
    }

    /// The deadline to apply to the next read attempt.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Subtract the wall time spent on a completed read, including any wait.
    ///
    /// Returns `false` once the budget is exhausted; the receive must then
    /// terminate with a timeout instead of issuing another read.
    #[must_use]
    pub fn charge(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        !self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keepalive_takes_precedence_when_finite() {
        let budget = TimeBudget::new(Some(Duration::from_secs(75)), Duration::from_secs(30));
        assert_eq!(budget.remaining(), Duration::from_secs(75));
    }

    #[test]
    fn unlimited_keepalive_falls_back_to_total() {
        let budget = TimeBudget::new(None, Duration::from_secs(30));
        assert_eq!(budget.remaining(), Duration::from_secs(30));
    }

    #[test]
    fn charge_never_increases_remaining() {
        let mut budget = TimeBudget::new(None, Duration::from_secs(5));
        let mut previous = budget.remaining();
        for _ in 0..10 {
            let _ = budget.charge(Duration::from_millis(700));
            assert!(budget.remaining() <= previous);
            previous = budget.remaining();
        }
    }

    #[test]
    fn exact_exhaustion_reports_spent() {
        let mut budget = TimeBudget::new(None, Duration::from_secs(2));
        assert!(budget.charge(Duration::from_secs(1)));
        assert!(!budget.charge(Duration::from_secs(1)));
        assert_eq!(budget.remaining(), Duration::ZERO);
    }

    #[test]
    fn overdraw_saturates_at_zero() {
        let mut budget = TimeBudget::new(None, Duration::from_millis(100));
        assert!(!budget.charge(Duration::from_secs(10)));
        assert_eq!(budget.remaining(), Duration::ZERO);
    }

    #[test]
    fn zero_budget_starts_exhausted_after_any_charge() {
        let mut budget = TimeBudget::new(None, Duration::ZERO);
        assert_eq!(budget.remaining(), Duration::ZERO);
        assert!(!budget.charge(Duration::from_nanos(1)));
    }
}
