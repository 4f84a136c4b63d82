//! Configuration types for the Smartlead client.

use crate::error::{ClientError, ClientResult};
use smartlead_core::config::{GatewayConfig, RetrySettings};
use std::time::Duration;
use url::Url;

/// Configuration for the Smartlead API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key, sent as the `api_key` query parameter.
    pub api_key: String,
    /// Base URL of the main API.
    pub core_url: Url,
    /// Base URL of the SmartDelivery API.
    pub delivery_url: Url,
    /// Base URL of the SmartSenders API.
    pub senders_url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry_config: RetryConfig,
}

impl ClientConfig {
    /// Create a configuration with the default service URLs.
    pub fn new(api_key: impl Into<String>) -> ClientResult<Self> {
        let defaults = smartlead_core::config::ApiConfig::default();
        Ok(Self {
            api_key: api_key.into(),
            core_url: parse_base(&defaults.url)?,
            delivery_url: parse_base(&defaults.delivery_url)?,
            senders_url: parse_base(&defaults.senders_url)?,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        })
    }

    /// Build from the gateway configuration; the API key must be present.
    pub fn from_gateway(config: &GatewayConfig) -> ClientResult<Self> {
        let api_key = config
            .api
            .key
            .clone()
            .ok_or_else(|| ClientError::Config("SMARTLEAD_API_KEY is required".to_string()))?;

        Ok(Self {
            api_key,
            core_url: parse_base(&config.api.url)?,
            delivery_url: parse_base(&config.api.delivery_url)?,
            senders_url: parse_base(&config.api.senders_url)?,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::from(&config.api.retry),
        })
    }
}

/// Parse a base URL, making sure relative joins append to its path.
pub fn parse_base(raw: &str) -> ClientResult<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// HTTP status codes to retry on.
    pub retry_on_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_backoff: Duration::from_millis(settings.initial_delay_ms),
            max_backoff: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.backoff_factor,
            retry_on_status_codes: vec![429, 503],
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        std::cmp::min(backoff, self.max_backoff)
    }

    /// Check if a status code should trigger a retry.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status_codes.contains(&status)
    }

    /// Whether another attempt is allowed after `attempt` (zero-based) failed.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let config = RetryConfig::default();

        assert_eq!(config.backoff_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_backoff_capped_at_max() {
        let config = RetryConfig {
            max_backoff: Duration::from_millis(500),
            ..Default::default()
        };

        assert_eq!(config.backoff_for_attempt(10), Duration::from_millis(500));
    }

    #[test]
    fn test_should_retry_status() {
        let config = RetryConfig::default();

        assert!(config.should_retry_status(429));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(500));
        assert!(!config.should_retry_status(404));
    }

    #[test]
    fn test_attempt_budget() {
        let config = RetryConfig::default();
        assert!(config.can_retry(0));
        assert!(config.can_retry(1));
        assert!(!config.can_retry(2));
        assert!(!RetryConfig::no_retry().can_retry(0));
    }

    #[test]
    fn test_parse_base_appends_slash() {
        let url = parse_base("https://server.smartlead.ai/api/v1").unwrap();
        assert_eq!(url.as_str(), "https://server.smartlead.ai/api/v1/");
        assert_eq!(
            url.join("campaigns/1").unwrap().as_str(),
            "https://server.smartlead.ai/api/v1/campaigns/1"
        );
    }

    #[test]
    fn test_from_gateway_requires_key() {
        let mut gateway = GatewayConfig::default();
        assert!(ClientConfig::from_gateway(&gateway).is_err());

        gateway.api.key = Some("key".to_string());
        gateway.api.retry.max_attempts = 5;
        let config = ClientConfig::from_gateway(&gateway).unwrap();
        assert_eq!(config.retry_config.max_attempts, 5);
        assert_eq!(config.delivery_url.host_str(), Some("smartdelivery.smartlead.ai"));
    }
}
