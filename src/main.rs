//! Demo HTTP/1.x server binary.

use std::path::PathBuf;

use clap::Parser;

use http1d::http::HttpServer;
use http1d::http::{Request, Response};
use http1d::{load_config, observability, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "http1d", about = "HTTP/1.x server with a budget-aware receive pipeline")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind address from the config.
    #[arg(long)]
    listen: Option<String>,
}

async fn echo(request: Request) -> Response {
    Response::ok().with_body(format!("{} {}\n", request.method, request.uri))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::logging::init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.listener.bind_address = listen;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        total_timeout_secs = config.recv.total_timeout_secs,
        buffer_capacity = config.recv.buffer_capacity,
        "Configuration loaded"
    );

    let server = HttpServer::bind(config, echo).await?;
    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    server.run().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
