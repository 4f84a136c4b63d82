// Wiring: configuration in, a ready dispatch router out

use crate::adapter::{RestAdapter, WorkflowAdapter};
use crate::protocol::ServerInfo;
use crate::server::McpServer;
use crate::tools;
use anyhow::{Context, Result};
use smartlead_client::{ClientConfig, HttpLicenseServer, SmartleadClient, WorkflowClient};
use smartlead_core::license::{machine_id, LicenseServer};
use smartlead_core::{
    Catalog, Category, DispatchRouter, EnablementFilter, GatewayConfig, GatewayContext,
    LicenseEvaluator,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the router every transport dispatches through.
///
/// Fails when the configuration cannot serve (no API key, bad URLs).
pub fn build_router(config: &GatewayConfig) -> Result<DispatchRouter> {
    config.validate().context("invalid configuration")?;

    let catalog = Arc::new(Catalog::new());
    tools::register_catalog(&catalog);
    info!(operations = catalog.len(), "Catalog loaded");

    let license = Arc::new(build_license(config)?);

    let filter = EnablementFilter::new(catalog.clone(), license.clone())
        .with_overrides(config.features.tools.clone());
    let context = GatewayContext::new(catalog, license.clone()).with_filter(filter);

    let client_config =
        ClientConfig::from_gateway(config).context("invalid Smartlead API settings")?;
    let client = SmartleadClient::from_config(client_config)
        .context("failed to build the Smartlead API client")?;

    let mut router = DispatchRouter::new(context);
    for category in Category::ALL {
        if category == Category::WorkflowAutomation {
            continue;
        }
        let adapter = RestAdapter::new(client.clone(), tools::rest_tools_for(category));
        router = router.with_adapter(category, Arc::new(adapter));
    }

    let workflows = match &config.api.workflow_url {
        Some(url) => Some(
            WorkflowClient::new(url, config.license.key.clone())
                .context("invalid workflow engine URL")?,
        ),
        None => None,
    };
    router = router.with_adapter(
        Category::WorkflowAutomation,
        Arc::new(WorkflowAdapter::new(workflows, license)),
    );

    Ok(router)
}

fn build_license(config: &GatewayConfig) -> Result<LicenseEvaluator> {
    let settings = config.license_settings();

    let server: Option<Arc<dyn LicenseServer>> = match &config.license.server_url {
        Some(url) => {
            let backend =
                HttpLicenseServer::new(url, Duration::from_secs(config.license.timeout_secs))
                    .context("invalid license server URL")?;
            Some(Arc::new(backend))
        }
        None => {
            if settings.license_key.is_some() {
                warn!("License key set but no license server configured; running in free mode");
            }
            None
        }
    };

    let evaluator = LicenseEvaluator::new(settings, server, machine_id());

    #[cfg(feature = "operator-override")]
    let evaluator = evaluator.with_operator_override(
        smartlead_core::license::OperatorOverride::from_env(|k| std::env::var(k).ok()),
    );

    Ok(evaluator)
}

/// Build the MCP handler for `config`
pub fn build_server(config: &GatewayConfig) -> Result<McpServer> {
    let router = build_router(config)?;
    Ok(McpServer::new(
        Arc::new(router),
        ServerInfo {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
        },
    ))
}

/// Install the tracing subscriber; logs always go to stderr.
///
/// `RUST_LOG` wins over `default_filter`. `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.api.key = Some("test-key".to_string());
        config
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = build_router(&GatewayConfig::default()).err().unwrap();
        assert!(format!("{:#}", err).contains("SMARTLEAD_API_KEY"));
    }

    #[tokio::test]
    async fn test_free_mode_lists_free_categories() {
        let router = build_router(&config()).unwrap();
        let listed = router.list_operations().await;

        assert!(!listed.is_empty());
        assert!(listed.iter().all(|d| matches!(
            d.category,
            Category::CampaignManagement | Category::LeadManagement
        )));
    }

    #[tokio::test]
    async fn test_configured_override_enables_tool() {
        let mut config = config();
        config
            .features
            .tools
            .insert("smartlead_get_vendors".to_string(), true);
        config
            .features
            .tools
            .insert("smartlead_delete_campaign".to_string(), false);

        let router = build_router(&config).unwrap();
        let names: Vec<String> = router
            .list_operations()
            .await
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert!(names.contains(&"smartlead_get_vendors".to_string()));
        assert!(!names.contains(&"smartlead_delete_campaign".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_reaches_upstream() {
        let mut config = config();
        // Unreachable upstream: reaching the adapter shows as an upstream failure
        config.api.url = "http://127.0.0.1:1/api/v1".to_string();
        config.api.retry.max_attempts = 1;

        let router = build_router(&config).unwrap();
        let envelope = router
            .dispatch("smartlead_list_campaigns", json!({}))
            .await;
        assert!(!envelope.succeeded);
        let message = envelope.error_message.unwrap();
        assert!(message.starts_with("API Error"), "{}", message);
        assert!(!message.contains("no adapter"));
    }
}
