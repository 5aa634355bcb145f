//! Binary Ninja multi-instance MCP bridge
//!
//! Exposes every running Binary Ninja MCP plugin instance (one HTTP server per loaded binary)
//! behind a single stdio MCP server. Tool calls take an optional `binary_id`; without one they
//! go to the live instance with the lowest port.
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "binja": {
//!       "command": "binja-mcp",
//!       "env": { "BINJA_BASE_PORT": "9009", "BINJA_MAX_SERVERS": "10" }
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use binja_bridge::{Bridge, BridgeConfig, ReqwestTransport};
use rmcp::transport::stdio;
use rmcp::ServiceExt;

pub mod tools;

use tools::BinjaBridgeService;

pub async fn main_entry() -> Result<()> {
    // stdout carries MCP frames
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = BridgeConfig::load().context("failed to load bridge configuration")?;
    let service = BinjaBridgeService::from_config(&config)?;
    log_startup_discovery(service.bridge()).await;

    log::info!("Starting Binary Ninja MCP bridge on stdio");
    let server = service.serve(stdio()).await?;
    server.waiting().await?;

    log::info!("Binary Ninja MCP bridge stopped");
    Ok(())
}

async fn log_startup_discovery(bridge: &Bridge<ReqwestTransport>) {
    let servers = bridge.registry().force_discover().await;
    if servers.is_empty() {
        log::warn!("No Binary Ninja MCP servers found");
        log::info!("Servers will be discovered on the first tool call");
        return;
    }

    log::info!("Found {} Binary Ninja MCP servers:", servers.len());
    for record in servers.values() {
        log::info!(
            "  - {} at {} (ID: {})",
            record.filename,
            record.url,
            record.id
        );
    }
}
