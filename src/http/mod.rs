//! HTTP/1.x protocol core.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → recv.rs (read ⇄ parse loop under a shrinking time budget)
//!       ├── buffer.rs  (fixed-capacity receive buffer, compaction)
//!       ├── budget.rs  (remaining-time accounting per receive)
//!       ├── metrics.rs (per-request IO metrics)
//!       └── parser.rs  (incremental six-state request parser)
//!     → session.rs (keepalive cycle: receive → handle → respond)
//!     → server.rs  (accept loop, session tasks, graceful drain)
//! ```

pub mod budget;
pub mod buffer;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod recv;
pub mod request;
pub mod response;
pub mod server;
pub mod session;

pub use error::{ParseError, RecvError, RecvPhase};
pub use recv::{recv_request, Received, RecvOptions};
pub use request::Request;
pub use response::Response;
pub use server::HttpServer;
pub use session::Handler;
