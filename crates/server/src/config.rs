use crate::api::sse::SessionRegistry;
use anyhow::{Context, Result};
use smartlead_core::config::DEFAULT_CONFIG_FILE;
use smartlead_core::GatewayConfig;
use smartlead_mcp::McpServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Values given on the command line; each wins over file and environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub api_key: Option<String>,
    pub license_key: Option<String>,
    pub port: Option<u16>,
}

impl CliOverrides {
    pub fn config_path(&self) -> &Path {
        self.config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE))
    }
}

/// Load the effective configuration: defaults, file, environment, then CLI
pub fn load(overrides: &CliOverrides) -> Result<GatewayConfig> {
    let mut config = GatewayConfig::load(Some(overrides.config_path()))
        .context("Failed to load configuration")?;
    apply(&mut config, overrides);
    Ok(config)
}

fn apply(config: &mut GatewayConfig, overrides: &CliOverrides) {
    if let Some(key) = &overrides.api_key {
        config.api.key = Some(key.clone());
    }
    if let Some(key) = &overrides.license_key {
        config.license.key = Some(key.clone());
    }
    if let Some(port) = overrides.port {
        config.server.sse_port = port;
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
    pub sessions: SessionRegistry,
    /// Printable copy: keys are masked
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mcp = smartlead_mcp::build_server(config).context("Failed to build MCP server")?;
        Ok(Self {
            mcp: Arc::new(mcp),
            sessions: SessionRegistry::default(),
            config: Arc::new(config.redacted()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_values_win() {
        let mut config = GatewayConfig::default();
        config.api.key = Some("from-env".to_string());

        apply(
            &mut config,
            &CliOverrides {
                api_key: Some("from-cli".to_string()),
                port: Some(4000),
                ..Default::default()
            },
        );

        assert_eq!(config.api.key.as_deref(), Some("from-cli"));
        assert_eq!(config.server.sse_port, 4000);
        assert!(config.license.key.is_none());
    }

    #[test]
    fn test_default_config_path() {
        assert_eq!(
            CliOverrides::default().config_path(),
            Path::new(DEFAULT_CONFIG_FILE)
        );
    }
}
