//! sslwatch server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use sslwatch_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod report;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        wait_window_secs = config.wait_window_secs,
        lookback_secs = config.lookback_secs,
        "Starting sslwatch server on stdio transport"
    );

    let state = state::AppState::connect(&config).await?;
    let handler = handler::SslWatchServer::new(state);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
