use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smartlead_core::GatewayConfig;
use std::path::PathBuf;
use std::sync::Arc;

mod api;
mod config;

use config::{AppState, CliOverrides};

#[derive(Parser, Debug)]
#[command(name = "smartlead-mcp")]
#[command(about = "Smartlead MCP server: marketing API tools over stdio or HTTP", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Smartlead API key
    #[arg(long, global = true, env = "SMARTLEAD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// License key for paid tiers
    #[arg(long, global = true, env = "SMARTLEAD_LICENSE_KEY", hide_env_values = true)]
    license_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP over stdin/stdout (default)
    Start,

    /// Serve MCP over HTTP and SSE
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "SSE_PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Print the effective configuration and license status
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    smartlead_mcp::init_tracing("smartlead=info,tower_http=info");

    let cli = Cli::parse();
    let mut overrides = CliOverrides {
        config: cli.config,
        api_key: cli.api_key,
        license_key: cli.license_key,
        port: None,
    };

    match cli.command.unwrap_or(Command::Start) {
        Command::Start => {
            let config = config::load(&overrides)?;
            let server = smartlead_mcp::build_server(&config)?;
            tracing::info!("Starting Smartlead MCP server on stdio");
            Arc::new(server).serve_stdio().await?;
        }
        Command::Serve { port, host } => {
            overrides.port = port;
            let config = config::load(&overrides)?;
            let addr = format!("{}:{}", host, config.server.sse_port);
            let state = AppState::new(&config)?;

            tracing::info!("Starting Smartlead MCP HTTP bridge on {}", addr);
            api::serve(&addr, state).await?;
        }
        Command::Config => {
            let config = config::load(&overrides)?;
            print_config(&config).await?;
        }
    }

    Ok(())
}

async fn print_config(config: &GatewayConfig) -> Result<()> {
    let rendered =
        toml::to_string_pretty(&config.redacted()).context("Failed to render configuration")?;
    println!("{}", rendered);

    match smartlead_mcp::build_server(config) {
        Ok(server) => {
            let license = &server.router().context().license;
            let decision = license.resolve().await;
            println!("# License");
            println!("tier = {:?}", decision.tier.to_string());
            println!("status = {:?}", format!("{:?}", decision.status));
            println!("valid = {}", decision.valid);
            println!("client_id = {:?}", license.client_id());
            println!("message = {:?}", decision.message);
        }
        Err(e) => println!("# License\n# unavailable: {:#}", e),
    }

    Ok(())
}
