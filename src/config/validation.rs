//! Configuration validation.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The bind address does not parse as `host:port`.
    #[error("bind_address '{0}' is not a valid socket address")]
    BadBindAddress(String),
    /// The connection limit is zero.
    #[error("max_connections must be greater than zero")]
    ZeroMaxConnections,
    /// The receive buffer has no capacity.
    #[error("buffer_capacity must be greater than zero")]
    ZeroBufferCapacity,
}

/// Check a loaded configuration, collecting every failure.
pub fn validate(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.recv.buffer_capacity == 0 {
        errors.push(ValidationError::ZeroBufferCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
