//! Main client for the Smartlead API.

use crate::config::{parse_base, ClientConfig, RetryConfig};
use crate::error::{ClientError, ClientResult};
use crate::transport::HttpTransport;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Which Smartlead service a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiBase {
    Core,
    SmartDelivery,
    SmartSenders,
}

/// Client for the Smartlead REST services.
#[derive(Debug, Clone)]
pub struct SmartleadClient {
    config: Arc<ClientConfig>,
    http: HttpTransport,
}

impl SmartleadClient {
    /// Create a new client builder.
    pub fn builder() -> SmartleadClientBuilder {
        SmartleadClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let http = HttpTransport::new(
            config.timeout,
            config.retry_config.clone(),
            Some(config.api_key.clone()),
        )?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn base_url(&self, base: ApiBase) -> &Url {
        match base {
            ApiBase::Core => &self.config.core_url,
            ApiBase::SmartDelivery => &self.config.delivery_url,
            ApiBase::SmartSenders => &self.config.senders_url,
        }
    }

    /// Build a URL for the given path on one of the services.
    pub fn build_url(&self, base: ApiBase, path: &str) -> ClientResult<Url> {
        Ok(self.base_url(base).join(path.trim_start_matches('/'))?)
    }

    /// Issue one request against a Smartlead service.
    pub async fn request(
        &self,
        base: ApiBase,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        let url = self.build_url(base, path)?;
        self.http
            .send(method, url, query, body, HeaderMap::new())
            .await
    }
}

/// Builder for creating a SmartleadClient.
pub struct SmartleadClientBuilder {
    api_key: Option<String>,
    core_url: Option<String>,
    delivery_url: Option<String>,
    senders_url: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl SmartleadClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            api_key: None,
            core_url: None,
            delivery_url: None,
            senders_url: None,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the main API base URL.
    pub fn core_url(mut self, url: impl Into<String>) -> Self {
        self.core_url = Some(url.into());
        self
    }

    /// Override the SmartDelivery base URL.
    pub fn delivery_url(mut self, url: impl Into<String>) -> Self {
        self.delivery_url = Some(url.into());
        self
    }

    /// Override the SmartSenders base URL.
    pub fn senders_url(mut self, url: impl Into<String>) -> Self {
        self.senders_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<SmartleadClient> {
        let api_key = self
            .api_key
            .ok_or_else(|| ClientError::Config("api_key is required".to_string()))?;

        let mut config = ClientConfig::new(api_key)?;
        if let Some(url) = self.core_url {
            config.core_url = parse_base(&url)?;
        }
        if let Some(url) = self.delivery_url {
            config.delivery_url = parse_base(&url)?;
        }
        if let Some(url) = self.senders_url {
            config.senders_url = parse_base(&url)?;
        }
        config.timeout = self.timeout;
        config.retry_config = self.retry_config;

        SmartleadClient::from_config(config)
    }
}

impl Default for SmartleadClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
