//! Per-request receive metrics.
//!
//! One `RecvMetrics` belongs to one in-flight receive and has a single
//! writer, the receive loop. Server-wide aggregation lives in
//! [`crate::observability::metrics`], which folds finished values in after
//! the receive completes.

use std::time::{Duration, Instant};

/// IO timing and size accounting for a single request receive.
#[derive(Debug, Clone, Default)]
pub struct RecvMetrics {
    first_io: Option<Instant>,
    last_io: Option<Instant>,
    io_elapsed: Duration,
    bytes_received: u64,
    reads: u64,
}

impl RecvMetrics {
    /// Fold in one completed read.
    ///
    /// The first-IO timestamp is set only once; the last-IO timestamp is
    /// always overwritten.
    pub fn record(&mut self, started: Instant, stopped: Instant, bytes: usize) {
        self.first_io.get_or_insert(started);
        self.last_io = Some(stopped);
        self.io_elapsed += stopped.saturating_duration_since(started);
        self.bytes_received += bytes as u64;
        self.reads += 1;
    }

    /// When the first successful read started, if any read happened.
    pub fn first_io(&self) -> Option<Instant> {
        self.first_io
    }

    /// When the most recent read finished.
    pub fn last_io(&self) -> Option<Instant> {
        self.last_io
    }

    /// Total wall time spent inside reads, including waits.
    pub fn io_elapsed(&self) -> Duration {
        self.io_elapsed
    }

    /// Total bytes received across all reads.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Number of reads performed.
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_io_is_set_once() {
        let mut metrics = RecvMetrics::default();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(5);
        let t2 = t0 + Duration::from_millis(20);
        let t3 = t0 + Duration::from_millis(30);

        metrics.record(t0, t1, 10);
        metrics.record(t2, t3, 7);

        assert_eq!(metrics.first_io(), Some(t0));
        assert_eq!(metrics.last_io(), Some(t3));
    }

    #[test]
    fn totals_accumulate() {
        let mut metrics = RecvMetrics::default();
        let t0 = Instant::now();
        metrics.record(t0, t0 + Duration::from_millis(3), 16);
        metrics.record(t0, t0 + Duration::from_millis(4), 2);

        assert_eq!(metrics.bytes_received(), 18);
        assert_eq!(metrics.reads(), 2);
        assert_eq!(metrics.io_elapsed(), Duration::from_millis(7));
    }

    #[test]
    fn untouched_metrics_are_empty() {
        let metrics = RecvMetrics::default();
        assert!(metrics.first_io().is_none());
        assert!(metrics.last_io().is_none());
        assert_eq!(metrics.bytes_received(), 0);
        assert_eq!(metrics.reads(), 0);
    }
}
