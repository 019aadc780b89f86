//! Error taxonomy for the receive pipeline.
//!
//! # Responsibilities
//! - Structural parse errors with a diagnosable cause
//! - Receive errors classified by the protocol phase in progress
//! - Keep transport faults separate from protocol errors: callers close the
//!   connection on the former and may still answer the latter
//!
//! The phase classification lets operators tell "client opened a connection
//! and sent nothing" apart from "client is slow mid-body", which drive
//! different remediation (idle-connection reaping vs slow-client limits).

use std::fmt;
use std::io;

use thiserror::Error;

use crate::http::parser::ParseState;

/// Structural errors reported by the request parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line did not end with CRLF.
    #[error("bad line ending")]
    BadLineEnding,
    /// The request method is not a valid token.
    #[error("bad method")]
    BadMethod,
    /// The request target is not a valid URI.
    #[error("bad request target")]
    BadTarget,
    /// The version field is not `HTTP/1.0` or `HTTP/1.1`.
    #[error("bad HTTP version")]
    BadVersion,
    /// A header field name is malformed.
    #[error("bad header name")]
    BadHeaderName,
    /// A header field value is malformed.
    #[error("bad header value")]
    BadHeaderValue,
    /// `Content-Length` is present but not a decimal integer.
    #[error("bad Content-Length")]
    BadContentLength,
    /// Conflicting `Content-Length` values.
    #[error("multiple Content-Length values")]
    MultipleContentLength,
    /// `Transfer-Encoding` framing is not supported.
    #[error("Transfer-Encoding is not supported")]
    BadTransferEncoding,
    /// The declared `Content-Length` exceeds the body size limit.
    #[error("declared body length exceeds the limit")]
    BodyTooLarge,
    /// The parser was asked for a request it has not completed.
    #[error("stale parser")]
    StaleParser,
}

/// The protocol phase a receive was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvPhase {
    /// No request bytes had arrived yet.
    Idle,
    /// The request line was being read.
    RequestLine,
    /// Header fields were being read.
    Headers,
    /// The message body was being read.
    Body,
}

impl RecvPhase {
    /// Classify a parser state into the phase reported by receive errors.
    ///
    /// Total over the state set; `Completed` yields `None` because a
    /// completed parse is never an error path.
    pub fn classify(state: ParseState) -> Option<Self> {
        match state {
            ParseState::NothingYet => Some(Self::Idle),
            ParseState::StartLine | ParseState::ExpectingNewline => Some(Self::RequestLine),
            ParseState::Header => Some(Self::Headers),
            ParseState::Body => Some(Self::Body),
            ParseState::Completed => None,
        }
    }
}

impl fmt::Display for RecvPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Self::Idle => "before any request bytes arrived",
            Self::RequestLine => "while reading the request line",
            Self::Headers => "while reading headers",
            Self::Body => "while reading the body",
        };
        f.write_str(phase)
    }
}

/// Why a request receive terminated without a request.
#[derive(Debug, Error)]
pub enum RecvError {
    /// The time budget ran out in the given phase.
    #[error("timed out {0}")]
    Timeout(RecvPhase),
    /// The transport closed in the given phase, before a complete request.
    #[error("connection closed {0}")]
    EndOfStream(RecvPhase),
    /// The byte stream is structurally invalid.
    #[error("malformed request: {0}")]
    Malformed(#[from] ParseError),
    /// The receive buffer filled without a completed parse.
    #[error("request exceeded the {capacity}-byte receive buffer")]
    Oversized {
        /// Configured buffer capacity.
        capacity: usize,
    },
    /// The surrounding task was cancelled; not a protocol error.
    #[error("receive cancelled by shutdown")]
    Cancelled,
    /// The transport itself failed at the OS level.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

impl RecvError {
    /// Stable label for aggregate error metrics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Timeout(RecvPhase::Idle) => "timeout_idle",
            Self::Timeout(RecvPhase::RequestLine) => "timeout_request_line",
            Self::Timeout(RecvPhase::Headers) => "timeout_headers",
            Self::Timeout(RecvPhase::Body) => "timeout_body",
            Self::EndOfStream(_) => "end_of_stream",
            Self::Malformed(_) => "malformed",
            Self::Oversized { .. } => "oversized",
            Self::Cancelled => "cancelled",
            Self::Transport(_) => "transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_covers_every_state() {
        assert_eq!(
            RecvPhase::classify(ParseState::NothingYet),
            Some(RecvPhase::Idle)
        );
        assert_eq!(
            RecvPhase::classify(ParseState::StartLine),
            Some(RecvPhase::RequestLine)
        );
        assert_eq!(
            RecvPhase::classify(ParseState::ExpectingNewline),
            Some(RecvPhase::RequestLine)
        );
        assert_eq!(
            RecvPhase::classify(ParseState::Header),
            Some(RecvPhase::Headers)
        );
        assert_eq!(RecvPhase::classify(ParseState::Body), Some(RecvPhase::Body));
        assert_eq!(RecvPhase::classify(ParseState::Completed), None);
    }

    #[test]
    fn timeout_messages_name_the_phase() {
        assert_eq!(
            RecvError::Timeout(RecvPhase::Headers).to_string(),
            "timed out while reading headers"
        );
        assert_eq!(
            RecvError::Timeout(RecvPhase::Idle).to_string(),
            "timed out before any request bytes arrived"
        );
        assert_eq!(
            RecvError::EndOfStream(RecvPhase::Body).to_string(),
            "connection closed while reading the body"
        );
    }

    #[test]
    fn kind_labels_distinguish_timeout_phases() {
        let labels = [
            RecvError::Timeout(RecvPhase::Idle).kind_label(),
            RecvError::Timeout(RecvPhase::RequestLine).kind_label(),
            RecvError::Timeout(RecvPhase::Headers).kind_label(),
            RecvError::Timeout(RecvPhase::Body).kind_label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
