//! HTTP server: accept loop and session dispatch.
//!
//! # Responsibilities
//! - Bind the bounded listener
//! - Spawn one session task per accepted connection
//! - Stop accepting on shutdown, then drain live sessions with a deadline

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time;

use crate::config::ServerConfig;
use crate::http::session::{Handler, Session};
use crate::lifecycle::Shutdown;
use crate::net::{BoundListener, ConnectionTracker, ListenerError};

/// How long shutdown waits for in-flight sessions before giving up.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Server failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be set up.
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// The HTTP/1.x server.
pub struct HttpServer<H> {
    config: ServerConfig,
    handler: Arc<H>,
    listener: BoundListener,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
}

impl<H: Handler> HttpServer<H> {
    /// Bind the configured address and prepare to serve with `handler`.
    pub async fn bind(config: ServerConfig, handler: H) -> Result<Self, ServerError> {
        let listener = BoundListener::bind(&config.listener).await?;
        Ok(Self {
            config,
            handler: Arc::new(handler),
            listener,
            shutdown: Shutdown::new(),
            tracker: ConnectionTracker::new(),
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Handle for triggering shutdown from outside `run`.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Accept and serve connections until shutdown is triggered, then drain.
    pub async fn run(self) -> Result<(), ServerError> {
        let mut shutdown_rx = self.shutdown.subscribe();
        tracing::info!(address = %self.listener.local_addr(), "HTTP server starting");

        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer, permit) = match accepted {
                Ok(accepted) => accepted,
                Err(error) => {
                    tracing::warn!(error = %error, "Accept failed");
                    continue;
                }
            };

            let guard = self.tracker.track();
            let cancel = self.shutdown.subscribe();
            let session = Session::new(
                stream,
                peer,
                Arc::clone(&self.handler),
                self.config.recv.clone(),
            );
            tokio::spawn(async move {
                let _permit = permit;
                let _guard = guard;
                session.run(cancel).await;
            });
        }

        tracing::info!(active = self.tracker.active(), "Draining connections");
        if time::timeout(DRAIN_TIMEOUT, self.tracker.drained())
            .await
            .is_err()
        {
            tracing::warn!(active = self.tracker.active(), "Drain timed out");
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Request;
    use crate::http::response::Response;

    #[tokio::test]
    async fn shutdown_stops_an_idle_server() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();

        let server = HttpServer::bind(config, |_request: Request| async { Response::ok() })
            .await
            .expect("bind");
        let shutdown = server.shutdown_handle();
        let task = tokio::spawn(server.run());

        shutdown.trigger();
        time::timeout(Duration::from_secs(5), task)
            .await
            .expect("run did not stop")
            .expect("task")
            .expect("run");
    }
}
