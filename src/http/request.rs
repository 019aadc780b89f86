//! Parsed HTTP/1.x request.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};

/// A fully received request.
///
/// Built incrementally by the parser; ownership transfers to the caller only
/// once the parser reports completion.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Request target.
    pub uri: Uri,
    /// Protocol version (`HTTP/1.0` or `HTTP/1.1`).
    pub version: Version,
    /// Header fields in arrival order.
    pub headers: HeaderMap,
    /// Message body, framed by `Content-Length`.
    pub body: Bytes,
}
