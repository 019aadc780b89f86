//! Per-connection request/response cycle.
//!
//! # Responsibilities
//! - Drive receive → handle → respond until the connection stops being
//!   reusable
//! - Apply the total timeout to a connection's first request and the
//!   keepalive timeout to every subsequent one
//! - Map receive failures to an HTTP error response when one can still be
//!   sent, and to a silent close otherwise
//!
//! An idle keepalive timeout (the client sent nothing at all) closes
//! silently: there is no request to answer. Other timeouts, malformed
//! requests and oversized requests are answered before closing, since the
//! client is mid-conversation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use http::{header, StatusCode, Version};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use crate::config::RecvConfig;
use crate::http::error::{ParseError, RecvError, RecvPhase};
use crate::http::recv::{recv_request, RecvOptions};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::net::connection::ConnectionId;
use crate::observability::metrics;

/// Application-side request handler.
pub trait Handler: Send + Sync + 'static {
    /// Produce the response for one request.
    fn handle(&self, request: Request) -> impl Future<Output = Response> + Send;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send,
{
    fn handle(&self, request: Request) -> impl Future<Output = Response> + Send {
        (self)(request)
    }
}

/// One client connection's conversation with the server.
pub struct Session<T, H> {
    transport: T,
    peer: SocketAddr,
    id: ConnectionId,
    handler: Arc<H>,
    config: RecvConfig,
}

impl<T, H> Session<T, H>
where
    T: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    /// Wrap an accepted transport.
    pub fn new(transport: T, peer: SocketAddr, handler: Arc<H>, config: RecvConfig) -> Self {
        Self {
            transport,
            peer,
            id: ConnectionId::new(),
            handler,
            config,
        }
    }

    /// Serve requests until the connection closes, errors, hits the reuse
    /// cap, or shutdown cancels it.
    pub async fn run(mut self, mut cancel: broadcast::Receiver<()>) {
        let mut served: usize = 0;
        loop {
            let options = RecvOptions {
                // The keepalive budget only applies once the connection is
                // being reused.
                keepalive_timeout: if served == 0 {
                    None
                } else {
                    self.config.keepalive_timeout()
                },
                total_timeout: self.config.total_timeout(),
                buffer_capacity: self.config.buffer_capacity,
            };

            match recv_request(&mut self.transport, &options, &mut cancel).await {
                Ok(received) => {
                    metrics::record_receive(&received.metrics);
                    served += 1;

                    let at_reuse_cap = self.config.max_requests_per_connection != 0
                        && served >= self.config.max_requests_per_connection;
                    let keep_alive = wants_keepalive(&received.request) && !at_reuse_cap;

                    tracing::debug!(
                        connection_id = %self.id,
                        peer = %self.peer,
                        method = %received.request.method,
                        target = %received.request.uri,
                        bytes = received.metrics.bytes_received(),
                        "Request received"
                    );

                    let response = self.handler.handle(received.request).await;
                    if let Err(error) = self
                        .transport
                        .write_all(&response.encode(keep_alive))
                        .await
                    {
                        tracing::debug!(
                            connection_id = %self.id,
                            error = %error,
                            "Failed to write response"
                        );
                        return;
                    }
                    if !keep_alive {
                        break;
                    }
                }
                Err(error) => {
                    metrics::record_recv_error(&error);
                    match reject_status(&error) {
                        Some(status) => {
                            tracing::debug!(
                                connection_id = %self.id,
                                peer = %self.peer,
                                error = %error,
                                "Rejecting request"
                            );
                            let response = Response::new(status).with_body(error.to_string());
                            let _ = self.transport.write_all(&response.encode(false)).await;
                        }
                        None => {
                            tracing::trace!(
                                connection_id = %self.id,
                                error = %error,
                                "Closing connection"
                            );
                        }
                    }
                    return;
                }
            }
        }
        let _ = self.transport.shutdown().await;
    }
}

/// Status to answer a failed receive with, or `None` for a silent close.
fn reject_status(error: &RecvError) -> Option<StatusCode> {
    match error {
        // Nothing arrived; there is no conversation to answer.
        RecvError::Timeout(RecvPhase::Idle) => None,
        RecvError::Timeout(_) => Some(StatusCode::REQUEST_TIMEOUT),
        RecvError::Malformed(ParseError::BodyTooLarge) => Some(StatusCode::PAYLOAD_TOO_LARGE),
        RecvError::Malformed(_) => Some(StatusCode::BAD_REQUEST),
        RecvError::Oversized { .. } => Some(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE),
        RecvError::EndOfStream(_) | RecvError::Cancelled | RecvError::Transport(_) => None,
    }
}

/// Connection reuse per the request's `Connection` header: HTTP/1.1 defaults
/// to keep-alive, HTTP/1.0 to close.
fn wants_keepalive(request: &Request) -> bool {
    let mut close = false;
    let mut keep_alive = false;
    if let Some(value) = request
        .headers
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
    {
        for token in value.split(',') {
            let token = token.trim();
            if token.eq_ignore_ascii_case("close") {
                close = true;
            } else if token.eq_ignore_ascii_case("keep-alive") {
                keep_alive = true;
            }
        }
    }
    if close {
        return false;
    }
    match request.version {
        Version::HTTP_11 => true,
        _ => keep_alive,
    }
}
