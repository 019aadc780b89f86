//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Level selection comes from `RUST_LOG`, defaulting to debug for this
/// crate. Call once at startup.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "http1d=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
