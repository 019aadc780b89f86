//! Incremental HTTP/1.x request parser.
//!
//! # Responsibilities
//! - Consume already-buffered bytes, never block or read
//! - Advance through the coarse message states and report how many bytes of
//!   the input were consumed
//! - Build the [`Request`] incrementally as a side effect, visible once the
//!   parser reports completion
//!
//! The parser only consumes complete grammar units (a full line, or body
//! bytes). A partial line is left unconsumed so the receive loop can compact
//! the buffer and present the same bytes again, extended, after the next
//! read.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderName, HeaderValue, Method, Uri, Version};

use crate::http::error::ParseError;
use crate::http::request::Request;

/// Largest `Content-Length` the parser accepts. The receive buffer only
/// bounds how much arrives per read; this bounds the assembled body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Coarse parser state, readable by the receive loop for error
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    /// No bytes seen yet.
    #[default]
    NothingYet,
    /// Reading the request line.
    StartLine,
    /// Right after the request line: either the final CRLF or the first
    /// header field starts here.
    ExpectingNewline,
    /// Reading header fields.
    Header,
    /// Reading the message body.
    Body,
    /// The request is fully parsed.
    Completed,
}

/// Outcome of a parse attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The buffered bytes are insufficient for the current grammar unit.
    NeedMore,
    /// The request is fully parsed.
    Completed,
}

/// Capability contract for an incremental request parser.
///
/// The receive loop consumes the parser purely through this interface; the
/// concrete grammar is an implementation detail.
pub trait ParseRequest {
    /// Feed the currently buffered bytes. Returns how many bytes were
    /// consumed and whether the message is complete.
    fn parse(&mut self, input: &[u8]) -> Result<(usize, ParseStatus), ParseError>;

    /// Current coarse state.
    fn state(&self) -> ParseState;

    /// Move the finished request out. `None` unless the parser has
    /// completed.
    fn take_request(&mut self) -> Option<Request>;
}

/// The concrete HTTP/1.x parser.
///
/// Body framing is `Content-Length` only; a `Transfer-Encoding` header is
/// reported as a structural error rather than silently mis-framed. Declared
/// bodies above [`MAX_BODY_BYTES`] are rejected before any body byte is
/// buffered.
#[derive(Debug, Default)]
pub struct RequestParser {
    state: ParseState,
    request: Request,
    body: Vec<u8>,
    content_length: usize,
}

impl RequestParser {
    /// A fresh parser in the `NothingYet` state.
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_request_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        // Multiple spaces between fields are tolerated.
        let mut parts = line.split(|&b| b == b' ').filter(|part| !part.is_empty());
        let method = parts.next().ok_or(ParseError::BadMethod)?;
        let target = parts.next().ok_or(ParseError::BadTarget)?;
        let version = parts.next().ok_or(ParseError::BadVersion)?;
        if parts.next().is_some() {
            return Err(ParseError::BadVersion);
        }

        self.request.method = Method::from_bytes(method).map_err(|_| ParseError::BadMethod)?;
        self.request.uri = Uri::try_from(target).map_err(|_| ParseError::BadTarget)?;
        self.request.version = match version {
            b"HTTP/1.1" => Version::HTTP_11,
            b"HTTP/1.0" => Version::HTTP_10,
            _ => return Err(ParseError::BadVersion),
        };
        Ok(())
    }

    fn parse_header_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or(ParseError::BadHeaderName)?;
        let name =
            HeaderName::from_bytes(&line[..colon]).map_err(|_| ParseError::BadHeaderName)?;
        let value = HeaderValue::from_bytes(trim_ows(&line[colon + 1..]))
            .map_err(|_| ParseError::BadHeaderValue)?;
        self.request.headers.append(name, value);
        Ok(())
    }

    /// Decide body framing once the header section ends.
    fn finish_headers(&mut self) -> Result<(), ParseError> {
        if self.request.headers.contains_key(TRANSFER_ENCODING) {
            return Err(ParseError::BadTransferEncoding);
        }

        let mut lengths = self.request.headers.get_all(CONTENT_LENGTH).iter();
        self.content_length = match lengths.next() {
            None => 0,
            Some(first) => {
                if lengths.any(|value| value != first) {
                    return Err(ParseError::MultipleContentLength);
                }
                first
                    .to_str()
                    .ok()
                    .and_then(|raw| raw.trim().parse::<usize>().ok())
                    .ok_or(ParseError::BadContentLength)?
            }
        };

        if self.content_length > MAX_BODY_BYTES {
            return Err(ParseError::BodyTooLarge);
        }

        if self.content_length > 0 {
            self.state = ParseState::Body;
        } else {
            self.state = ParseState::Completed;
        }
        Ok(())
    }
}

impl ParseRequest for RequestParser {
    fn parse(&mut self, input: &[u8]) -> Result<(usize, ParseStatus), ParseError> {
        let mut consumed = 0;
        loop {
            let rest = &input[consumed..];
            match self.state {
                ParseState::NothingYet => {
                    if rest.is_empty() {
                        return Ok((consumed, ParseStatus::NeedMore));
                    }
                    self.state = ParseState::StartLine;
                }
                ParseState::StartLine => match take_line(rest)? {
                    None => return Ok((consumed, ParseStatus::NeedMore)),
                    Some((line, len)) => {
                        self.parse_request_line(line)?;
                        consumed += len;
                        self.state = ParseState::ExpectingNewline;
                    }
                },
                ParseState::ExpectingNewline => {
                    match rest.first() {
                        None => return Ok((consumed, ParseStatus::NeedMore)),
                        Some(b'\r') => {
                            if rest.len() < 2 {
                                return Ok((consumed, ParseStatus::NeedMore));
                            }
                            if rest[1] != b'\n' {
                                return Err(ParseError::BadLineEnding);
                            }
                            // Empty header section.
                            consumed += 2;
                            self.finish_headers()?;
                        }
                        Some(_) => self.state = ParseState::Header,
                    }
                }
                ParseState::Header => match take_line(rest)? {
                    None => return Ok((consumed, ParseStatus::NeedMore)),
                    Some((line, len)) => {
                        consumed += len;
                        if line.is_empty() {
                            self.finish_headers()?;
                        } else {
                            self.parse_header_line(line)?;
                        }
                    }
                },
                ParseState::Body => {
                    let wanted = self.content_length - self.body.len();
                    let take = wanted.min(rest.len());
                    self.body.extend_from_slice(&rest[..take]);
                    consumed += take;
                    if self.body.len() < self.content_length {
                        return Ok((consumed, ParseStatus::NeedMore));
                    }
                    self.state = ParseState::Completed;
                }
                ParseState::Completed => return Ok((consumed, ParseStatus::Completed)),
            }
        }
    }

    fn state(&self) -> ParseState {
        self.state
    }

    fn take_request(&mut self) -> Option<Request> {
        if self.state != ParseState::Completed {
            return None;
        }
        let mut request = std::mem::take(&mut self.request);
        request.body = Bytes::from(std::mem::take(&mut self.body));
        self.state = ParseState::NothingYet;
        self.content_length = 0;
        Some(request)
    }
}

/// Split one CRLF-terminated line off the input, without the terminator.
///
/// `Ok(None)` means no complete line is buffered yet. A bare LF, or an LF
/// not preceded by CR, is a structural error.
fn take_line(input: &[u8]) -> Result<Option<(&[u8], usize)>, ParseError> {
    match input.iter().position(|&b| b == b'\n') {
        None => Ok(None),
        Some(0) => Err(ParseError::BadLineEnding),
        Some(at) if input[at - 1] == b'\r' => Ok(Some((&input[..at - 1], at + 1))),
        Some(_) => Err(ParseError::BadLineEnding),
    }
}

fn trim_ows(mut value: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = value {
        value = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = value {
        value = rest;
    }
    value
}
