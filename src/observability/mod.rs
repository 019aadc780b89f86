//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! receive loop → per-request RecvMetrics
//!     → metrics.rs (fold into process-wide counters/histograms)
//! all subsystems → logging.rs (structured tracing events)
//! ```

pub mod logging;
pub mod metrics;
