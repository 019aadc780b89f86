//! Minimal HTTP/1.1 response for the session's send side.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

/// An outgoing response.
///
/// `Content-Length` and `Connection` are written by the encoder and must not
/// be set as explicit headers.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Additional header fields.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl Response {
    /// A response with the given status and no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A `200 OK` response with no body.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header field.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Serialize the response, including the `Connection` directive the
    /// session decided on.
    pub fn encode(&self, keep_alive: bool) -> Vec<u8> {
        let mut wire = Vec::with_capacity(128 + self.body.len());
        wire.extend_from_slice(b"HTTP/1.1 ");
        wire.extend_from_slice(self.status.as_str().as_bytes());
        wire.push(b' ');
        wire.extend_from_slice(self.status.canonical_reason().unwrap_or("Unknown").as_bytes());
        wire.extend_from_slice(b"\r\n");

        for (name, value) in &self.headers {
            wire.extend_from_slice(name.as_str().as_bytes());
            wire.extend_from_slice(b": ");
            wire.extend_from_slice(value.as_bytes());
            wire.extend_from_slice(b"\r\n");
        }

        wire.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        wire.extend_from_slice(if keep_alive {
            b"Connection: keep-alive\r\n".as_slice()
        } else {
            b"Connection: close\r\n".as_slice()
        });
        wire.extend_from_slice(b"\r\n");
        wire.extend_from_slice(&self.body);
        wire
    }
}
