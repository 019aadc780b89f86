//! Configuration schema.
//!
//! All types derive Serde traits for deserialization from TOML files, with
//! per-struct defaults so a partial file is enough.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener settings (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Request-receive settings (timeouts, buffer, keepalive).
    pub recv: RecvConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g. "127.0.0.1:8080").
    pub bind_address: String,

    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Request-receive configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecvConfig {
    /// Time budget for receiving a connection's first request, seconds.
    pub total_timeout_secs: u64,

    /// Time budget for the next request on a reused connection, seconds.
    /// Absent means unlimited: fall back to the total timeout.
    pub keepalive_timeout_secs: Option<u64>,

    /// Receive buffer capacity in bytes; a request whose head outgrows this
    /// is rejected as oversized.
    pub buffer_capacity: usize,

    /// Requests served per connection before forcing close (0 = unlimited).
    pub max_requests_per_connection: usize,
}

impl Default for RecvConfig {
    fn default() -> Self {
        Self {
            total_timeout_secs: 30,
            keepalive_timeout_secs: Some(75),
            buffer_capacity: 8192,
            max_requests_per_connection: 100,
        }
    }
}

impl RecvConfig {
    /// Total timeout as a duration.
    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_secs)
    }

    /// Keepalive timeout as a duration, if limited.
    pub fn keepalive_timeout(&self) -> Option<Duration> {
        self.keepalive_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.recv.buffer_capacity, 8192);
        assert_eq!(config.recv.total_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.recv.keepalive_timeout(),
            Some(Duration::from_secs(75))
        );
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [recv]
            total_timeout_secs = 5
            "#,
        )
        .expect("parse");
        assert_eq!(config.recv.total_timeout_secs, 5);
        assert_eq!(config.recv.buffer_capacity, 8192);
        assert_eq!(config.listener.max_connections, 10_000);
    }

    #[test]
    fn keepalive_can_be_unlimited() {
        let config: ServerConfig = toml::from_str(
            r#"
            [recv]
            keepalive_timeout_secs = 9
            "#,
        )
        .expect("parse");
        assert_eq!(config.recv.keepalive_timeout(), Some(Duration::from_secs(9)));

        let config: ServerConfig = toml::from_str("[recv]\n").expect("parse");
        // Serde default, not absence-of-section behavior.
        assert_eq!(config.recv.keepalive_timeout_secs, Some(75));
    }
}
