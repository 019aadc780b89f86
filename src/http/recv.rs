//! The receive-parse loop.
//!
//! # Data Flow
//! ```text
//! read (raced against the remaining budget and against cancellation)
//!     → record metrics, charge the budget
//!     → parse the buffered bytes
//!     → need more: compact the buffer, read again
//!     → completed:  yield (Request, RecvMetrics)
//!     → any failure: yield one classified RecvError
//! ```
//!
//! One receive owns its buffer, budget, metrics, and parser exclusively; no
//! two iterations for the same connection ever run concurrently. The only
//! suspension points are the read await and the wait inside the deadline
//! race.

use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::broadcast;
use tokio::time;

use crate::http::buffer::RecvBuffer;
use crate::http::budget::TimeBudget;
use crate::http::error::{ParseError, RecvError, RecvPhase};
use crate::http::metrics::RecvMetrics;
use crate::http::parser::{ParseRequest, ParseStatus, RequestParser};
use crate::http::request::Request;

/// Immutable configuration for one receive.
#[derive(Debug, Clone)]
pub struct RecvOptions {
    /// Budget for a reused connection waiting on its next request. `None`
    /// is the unlimited sentinel: fall back to `total_timeout`.
    pub keepalive_timeout: Option<Duration>,
    /// Budget when no keepalive limit applies.
    pub total_timeout: Duration,
    /// Fixed receive buffer capacity in bytes.
    pub buffer_capacity: usize,
}

impl Default for RecvOptions {
    fn default() -> Self {
        Self {
            keepalive_timeout: None,
            total_timeout: Duration::from_secs(30),
            buffer_capacity: 8192,
        }
    }
}

/// A successfully received request with its IO metrics.
#[derive(Debug)]
pub struct Received {
    /// The parsed request.
    pub request: Request,
    /// Per-request IO accounting.
    pub metrics: RecvMetrics,
}

/// Receive one complete request from the transport.
///
/// Drives zero or more read-then-parse iterations under a shrinking time
/// budget. Returns exactly one of a parsed request with metrics or a
/// classified error; timeouts are not retried here. A fresh receive is a
/// new call, decided by the caller's keepalive policy.
///
/// Any resolution of `cancel` (a shutdown broadcast, or its sender going
/// away) cancels the in-flight read and yields [`RecvError::Cancelled`]. A
/// cancelled read contributes zero bytes: the read future is dropped before
/// anything is committed to the buffer.
pub async fn recv_request<T>(
    transport: &mut T,
    options: &RecvOptions,
    cancel: &mut broadcast::Receiver<()>,
) -> Result<Received, RecvError>
where
    T: AsyncRead + Unpin,
{
    drive(transport, RequestParser::new(), options, cancel).await
}

async fn drive<T, P>(
    transport: &mut T,
    mut parser: P,
    options: &RecvOptions,
    cancel: &mut broadcast::Receiver<()>,
) -> Result<Received, RecvError>
where
    T: AsyncRead + Unpin,
    P: ParseRequest,
{
    let mut buffer = RecvBuffer::new(options.buffer_capacity);
    let mut budget = TimeBudget::new(options.keepalive_timeout, options.total_timeout);
    let mut metrics = RecvMetrics::default();

    loop {
        if buffer.is_full() {
            return Err(RecvError::Oversized {
                capacity: buffer.capacity(),
            });
        }

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.recv() => return Err(RecvError::Cancelled),
            outcome = time::timeout(budget.remaining(), transport.read(buffer.writable())) => outcome,
        };
        let stopped = Instant::now();

        let received = match outcome {
            Err(_elapsed) => return Err(timeout_in(&parser)),
            Ok(Ok(0)) => return Err(RecvError::EndOfStream(phase_of(&parser))),
            Ok(Ok(len)) => len,
            Ok(Err(source)) => return Err(RecvError::Transport(source)),
        };

        buffer.commit(received);
        metrics.record(started, stopped, received);
        if !budget.charge(stopped.duration_since(started)) {
            return Err(timeout_in(&parser));
        }

        let (consumed, status) = parser.parse(buffer.unparsed())?;
        buffer.consume(consumed);

        if status == ParseStatus::Completed {
            let request = parser.take_request().ok_or(ParseError::StaleParser)?;
            tracing::trace!(
                bytes = metrics.bytes_received(),
                reads = metrics.reads(),
                "Request received"
            );
            return Ok(Received { request, metrics });
        }
    }
}

fn phase_of<P: ParseRequest>(parser: &P) -> RecvPhase {
    // The loop stops reading once the parser completes, so a failed read
    // always has an incomplete state to classify.
    RecvPhase::classify(parser.state()).unwrap_or(RecvPhase::Body)
}

fn timeout_in<P: ParseRequest>(parser: &P) -> RecvError {
    RecvError::Timeout(phase_of(parser))
}
