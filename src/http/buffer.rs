//! Fixed-capacity receive buffer.
//!
//! # Responsibilities
//! - Hold the unparsed prefix of bytes the parser has not yet consumed
//! - Expose the writable suffix as the target region for the next read
//! - Compact leftover bytes to the buffer start after each parse attempt
//!
//! The capacity is fixed at construction. A buffer that fills up without the
//! parser completing a request is the oversized-message condition, decided by
//! the receive loop, not here.

/// Receive buffer with an unparsed prefix and a writable suffix.
///
/// Invariant: `unparsed <= capacity` at all times.
#[derive(Debug)]
pub struct RecvBuffer {
    bytes: Box<[u8]>,
    unparsed: usize,
}

impl RecvBuffer {
    /// Allocate a buffer with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
            unparsed: 0,
        }
    }

    /// Total capacity, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Number of buffered bytes not yet consumed by the parser.
    pub fn unparsed_len(&self) -> usize {
        self.unparsed
    }

    /// True when no writable space remains for the next read.
    pub fn is_full(&self) -> bool {
        self.unparsed == self.bytes.len()
    }

    /// The bytes awaiting a parse attempt.
    pub fn unparsed(&self) -> &[u8] {
        &self.bytes[..self.unparsed]
    }

    /// The region the next read should fill.
    pub fn writable(&mut self) -> &mut [u8] {
        &mut self.bytes[self.unparsed..]
    }

    /// Extend the unparsed prefix by `received` bytes just read into
    /// [`writable`](Self::writable).
    pub fn commit(&mut self, received: usize) {
        debug_assert!(received <= self.bytes.len() - self.unparsed);
        self.unparsed += received;
    }

    /// Discard the consumed prefix after a parse attempt, shifting the
    /// remaining tail to the buffer start.
    ///
    /// Precondition: `parsed <= unparsed_len()`.
    pub fn consume(&mut self, parsed: usize) {
        debug_assert!(parsed <= self.unparsed);
        if parsed == 0 {
            return;
        }
        if parsed < self.unparsed {
            self.bytes.copy_within(parsed..self.unparsed, 0);
        }
        self.unparsed -= parsed;
    }
}
