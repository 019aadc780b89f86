//! http1d: an HTTP/1.x server built around a budget-aware request-receive
//! pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//! TCP connection
//!     → net (listener with connection limits, connection tracking)
//!     → http::server (accept loop, one session task per connection)
//!     → http::session (receive → handle → respond, keepalive policy)
//!     → http::recv (read ⇄ parse loop under a shrinking time budget)
//!
//! Cross-cutting: config (TOML schema + validation), lifecycle (shutdown
//! broadcast, doubling as receive cancellation), observability (tracing,
//! aggregate metrics).
//! ```
//!
//! The heart of the crate is [`http::recv_request`]: it pulls bytes off a
//! socket, incrementally feeds an HTTP/1.x parser, enforces one shrinking
//! wall-clock budget across however many partial reads the request needs,
//! records IO metrics, and terminates with either a parsed request or an
//! error classified by the protocol phase that was in progress.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::{load_config, ServerConfig};
pub use http::{
    recv_request, Handler, HttpServer, Received, RecvError, RecvOptions, Request, Response,
};
pub use lifecycle::Shutdown;
