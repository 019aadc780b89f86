//! TCP accept loop with connection limits.
//!
//! # Responsibilities
//! - Bind the configured address
//! - Enforce `max_connections` through a semaphore before accepting
//! - Hand each connection out with an owned permit that releases its slot on
//!   drop, even if the session task panics

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ListenerConfig;

/// Listener failures.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Binding the configured address failed.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// The configured bind address.
        address: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Accepting a connection failed.
    #[error("failed to accept connection: {0}")]
    Accept(#[from] std::io::Error),
}

/// A bound TCP listener that caps concurrent connections.
#[derive(Debug)]
pub struct BoundListener {
    inner: TcpListener,
    slots: Arc<Semaphore>,
    local_addr: SocketAddr,
}

impl BoundListener {
    /// Bind the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let bind_error = |source| ListenerError::Bind {
            address: config.bind_address.clone(),
            source,
        };
        let inner = TcpListener::bind(&config.bind_address)
            .await
            .map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner,
            slots: Arc::new(Semaphore::new(config.max_connections)),
            local_addr,
        })
    }

    /// The address actually bound, which differs from the configured one
    /// when port 0 was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Connection slots currently available.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Accept the next connection, waiting for a free slot first so a full
    /// server applies backpressure instead of accepting unboundedly.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .expect("connection semaphore closed");

        let (stream, peer) = self.inner.accept().await?;
        tracing::debug!(
            peer = %peer,
            available_slots = self.slots.available_permits(),
            "Connection accepted"
        );
        Ok((stream, peer, ConnectionPermit { _permit: permit }))
    }
}

/// Holds one connection slot; dropping it releases the slot.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            max_connections: 4,
        };
        let listener = BoundListener::bind(&config).await.expect("bind");
        assert_ne!(listener.local_addr().port(), 0);
        assert_eq!(listener.available_slots(), 4);
    }

    #[tokio::test]
    async fn bind_failure_names_the_address() {
        let config = ListenerConfig {
            bind_address: "256.0.0.1:80".to_string(),
            max_connections: 4,
        };
        let error = BoundListener::bind(&config).await.expect_err("bad address");
        assert!(error.to_string().contains("256.0.0.1:80"));
    }

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            max_connections: 1,
        };
        let listener = BoundListener::bind(&config).await.expect("bind");
        let addr = listener.local_addr();

        let _client = TcpStream::connect(addr).await.expect("connect");
        let (_stream, _peer, permit) = listener.accept().await.expect("accept");
        assert_eq!(listener.available_slots(), 0);
        drop(permit);
        assert_eq!(listener.available_slots(), 1);
    }
}
