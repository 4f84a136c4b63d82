// Standalone MCP server binary speaking JSON-RPC over stdio

use anyhow::{Context, Result};
use smartlead_core::config::DEFAULT_CONFIG_FILE;
use smartlead_core::GatewayConfig;
use smartlead_mcp::{build_server, init_tracing};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("smartlead=info");

    let path = std::env::var("SMARTLEAD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = GatewayConfig::load(Some(&path)).context("failed to load configuration")?;

    tracing::info!("Smartlead MCP server starting...");
    let server = build_server(&config)?;
    Arc::new(server).serve_stdio().await
}
