//! Server-wide metric aggregation.
//!
//! # Metrics
//! - `http1d_requests_total` (counter): completed request receives
//! - `http1d_recv_bytes_total` (counter): request bytes received
//! - `http1d_recv_reads_total` (counter): socket reads performed
//! - `http1d_recv_io_seconds` (histogram): per-request IO time
//! - `http1d_recv_errors_total` (counter, by `kind`): failed receives
//!
//! The receive core only produces a finished per-request value; this sink
//! folds those into process-wide aggregates through the `metrics` facade, so
//! the core never touches shared mutable state.

use metrics::{counter, histogram};

use crate::http::error::RecvError;
use crate::http::metrics::RecvMetrics;

/// Fold one completed receive into the aggregates.
pub fn record_receive(recv: &RecvMetrics) {
    counter!("http1d_requests_total").increment(1);
    counter!("http1d_recv_bytes_total").increment(recv.bytes_received());
    counter!("http1d_recv_reads_total").increment(recv.reads());
    histogram!("http1d_recv_io_seconds").record(recv.io_elapsed().as_secs_f64());
}

/// Count one failed receive by error kind.
pub fn record_recv_error(error: &RecvError) {
    counter!("http1d_recv_errors_total", "kind" => error.kind_label()).increment(1);
}
