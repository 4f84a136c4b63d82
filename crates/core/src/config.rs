// Gateway configuration: built-in defaults, then an optional TOML file, then
// environment variables.

use crate::error::GateError;
use crate::license::{LicenseSettings, MAX_CACHE_HOLD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "smartlead.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl From<ConfigError> for GateError {
    fn from(e: ConfigError) -> Self {
        GateError::Configuration(e.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub license: LicenseConfig,

    #[serde(default)]
    pub features: FeatureConfig,

    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default = "default_api_url")]
    pub url: String,

    #[serde(default = "default_delivery_url")]
    pub delivery_url: String,

    #[serde(default = "default_senders_url")]
    pub senders_url: String,

    /// Workflow engine used by the premium automation tools
    #[serde(default)]
    pub workflow_url: Option<String>,

    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_api_url() -> String {
    "https://server.smartlead.ai/api/v1".to_string()
}

fn default_delivery_url() -> String {
    "https://smartdelivery.smartlead.ai/api/v1".to_string()
}

fn default_senders_url() -> String {
    "https://smart-senders.smartlead.ai/api/v1".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            url: default_api_url(),
            delivery_url: default_delivery_url(),
            senders_url: default_senders_url(),
            workflow_url: None,
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseConfig {
    #[serde(default)]
    pub key: Option<String>,

    /// No server means every check takes the fallback path
    #[serde(default)]
    pub server_url: Option<String>,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_failure_backoff_secs")]
    pub failure_backoff_secs: u64,

    #[serde(default = "default_report_every")]
    pub report_every: u64,
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_failure_backoff_secs() -> u64 {
    60
}

fn default_report_every() -> u64 {
    10
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            key: None,
            server_url: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            failure_backoff_secs: default_failure_backoff_secs(),
            report_every: default_report_every(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Per-operation overrides: `true` forces on, `false` forces off
    #[serde(default)]
    pub tools: HashMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_name")]
    pub name: String,

    #[serde(default = "default_server_version")]
    pub version: String,

    #[serde(default = "default_sse_port")]
    pub sse_port: u16,
}

fn default_server_name() -> String {
    "smartlead-mcp".to_string()
}

fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_sse_port() -> u16 {
    3001
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
            sse_port: default_sse_port(),
        }
    }
}

impl GatewayConfig {
    /// Load from `path` (if it exists) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::load`] with an explicit environment lookup
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "Loaded configuration file");
            config
        } else {
            tracing::debug!(path = %path.display(), "Configuration file not found, using defaults");
            Self::default()
        };

        config.apply_env(lookup)?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Overlay environment variables onto the current values
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("SMARTLEAD_API_KEY") {
            self.api.key = Some(v);
        }
        if let Some(v) = get("SMARTLEAD_API_URL") {
            self.api.url = v;
        }
        if let Some(v) = get("SMART_DELIVERY_API_URL") {
            self.api.delivery_url = v;
        }
        if let Some(v) = get("SMART_SENDERS_API_URL") {
            self.api.senders_url = v;
        }
        if let Some(v) = get("N8N_API_URL") {
            self.api.workflow_url = Some(v);
        }

        let retry = &mut self.api.retry;
        if let Some(v) = get("SMARTLEAD_RETRY_MAX_ATTEMPTS") {
            retry.max_attempts = parse("SMARTLEAD_RETRY_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = get("SMARTLEAD_RETRY_INITIAL_DELAY") {
            retry.initial_delay_ms = parse("SMARTLEAD_RETRY_INITIAL_DELAY", &v)?;
        }
        if let Some(v) = get("SMARTLEAD_RETRY_MAX_DELAY") {
            retry.max_delay_ms = parse("SMARTLEAD_RETRY_MAX_DELAY", &v)?;
        }
        if let Some(v) = get("SMARTLEAD_RETRY_BACKOFF_FACTOR") {
            retry.backoff_factor = parse("SMARTLEAD_RETRY_BACKOFF_FACTOR", &v)?;
        }

        if let Some(v) = get("SMARTLEAD_LICENSE_KEY") {
            self.license.key = Some(v);
        }
        if let Some(v) = get("LICENSE_SERVER_URL") {
            self.license.server_url = Some(v);
        }
        if let Some(v) = get("LICENSE_CACHE_TTL_SECS") {
            self.license.cache_ttl_secs = parse("LICENSE_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = get("LICENSE_TIMEOUT_SECS") {
            self.license.timeout_secs = parse("LICENSE_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = get("SMARTLEAD_ENABLED_TOOLS") {
            for name in split_list(&v) {
                self.features.tools.insert(name, true);
            }
        }
        if let Some(v) = get("SMARTLEAD_DISABLED_TOOLS") {
            for name in split_list(&v) {
                self.features.tools.insert(name, false);
            }
        }

        if let Some(v) = get("SSE_PORT") {
            self.server.sse_port = parse("SSE_PORT", &v)?;
        }

        Ok(())
    }

    /// Reject configurations the gateway cannot serve with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(ConfigError::Missing("SMARTLEAD_API_KEY"));
        }
        if self.api.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "api.retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.api.retry.backoff_factor < 1.0 {
            return Err(ConfigError::Invalid {
                key: "api.retry.backoff_factor",
                reason: "must be at least 1.0".to_string(),
            });
        }
        if self.license.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "license.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        let max_hold = MAX_CACHE_HOLD.as_secs();
        for (key, value) in [
            ("license.cache_ttl_secs", self.license.cache_ttl_secs),
            ("license.failure_backoff_secs", self.license.failure_backoff_secs),
        ] {
            if value > max_hold {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("must be at most {} seconds", max_hold),
                });
            }
        }
        Ok(())
    }

    pub fn license_settings(&self) -> LicenseSettings {
        LicenseSettings {
            license_key: self.license.key.clone(),
            cache_ttl: Duration::from_secs(self.license.cache_ttl_secs),
            request_timeout: Duration::from_secs(self.license.timeout_secs),
            failure_backoff: Duration::from_secs(self.license.failure_backoff_secs),
            report_every: self.license.report_every,
        }
    }

    /// Copy safe to print: keys are masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api.key = copy.api.key.as_deref().map(redact);
        copy.license.key = copy.license.key.as_deref().map(redact);
        copy
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Keep a short prefix so operators can tell keys apart
pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "********".to_string()
    } else {
        format!("{}********", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn missing_file() -> PathBuf {
        PathBuf::from("/nonexistent/smartlead.toml")
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::load_with(Some(&missing_file()), env(&[])).unwrap();

        assert_eq!(config.api.url, "https://server.smartlead.ai/api/v1");
        assert_eq!(config.api.retry.max_attempts, 3);
        assert_eq!(config.api.retry.initial_delay_ms, 1000);
        assert_eq!(config.license.cache_ttl_secs, 3600);
        assert_eq!(config.server.sse_port, 3001);
        assert!(config.license.server_url.is_none());
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let config = GatewayConfig::load_with(Some(&missing_file()), env(&[])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SMARTLEAD_API_KEY")));

        let gate: GateError = err.into();
        assert_eq!(gate.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
key = "file-key"
url = "http://file.example/api"

[api.retry]
max_attempts = 5

[license]
server_url = "http://license.example"

[features.tools]
smartlead_list_webhooks = true
"#
        )
        .unwrap();

        let config = GatewayConfig::load_with(
            Some(file.path()),
            env(&[
                ("SMARTLEAD_API_KEY", "env-key"),
                ("SMARTLEAD_RETRY_MAX_DELAY", "2500"),
                ("SMARTLEAD_DISABLED_TOOLS", "smartlead_list_webhooks, smartlead_delete_campaign"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api.key.as_deref(), Some("env-key"));
        assert_eq!(config.api.url, "http://file.example/api");
        assert_eq!(config.api.retry.max_attempts, 5);
        assert_eq!(config.api.retry.max_delay_ms, 2500);
        assert_eq!(config.license.server_url.as_deref(), Some("http://license.example"));
        assert_eq!(config.features.tools.get("smartlead_list_webhooks"), Some(&false));
        assert_eq!(config.features.tools.get("smartlead_delete_campaign"), Some(&false));
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = GatewayConfig::load_with(
            Some(&missing_file()),
            env(&[("SMARTLEAD_RETRY_MAX_ATTEMPTS", "lots")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SMARTLEAD_RETRY_MAX_ATTEMPTS",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_license_durations_are_rejected() {
        let config = GatewayConfig::load_with(
            Some(&missing_file()),
            env(&[
                ("SMARTLEAD_API_KEY", "key"),
                ("LICENSE_CACHE_TTL_SECS", "18446744073709551615"),
            ]),
        )
        .unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid {
                key: "license.cache_ttl_secs",
                ..
            }
        ));

        let mut config = GatewayConfig::load_with(
            Some(&missing_file()),
            env(&[("SMARTLEAD_API_KEY", "key")]),
        )
        .unwrap();
        config.license.failure_backoff_secs = u64::MAX;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid {
                key: "license.failure_backoff_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nkey = ").unwrap();

        let err = GatewayConfig::load_with(Some(file.path()), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_license_settings_conversion() {
        let config = GatewayConfig::load_with(
            Some(&missing_file()),
            env(&[("SMARTLEAD_LICENSE_KEY", "lic"), ("LICENSE_TIMEOUT_SECS", "2")]),
        )
        .unwrap();
        let settings = config.license_settings();

        assert_eq!(settings.license_key.as_deref(), Some("lic"));
        assert_eq!(settings.request_timeout, Duration::from_secs(2));
        assert_eq!(settings.cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.report_every, 10);
    }

    #[test]
    fn test_redaction() {
        let mut config = GatewayConfig::default();
        config.api.key = Some("sk_live_1234567890".to_string());
        config.license.key = Some("short".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.api.key.as_deref(), Some("sk_l********"));
        assert_eq!(redacted.license.key.as_deref(), Some("********"));
        assert_eq!(config.api.key.as_deref(), Some("sk_live_1234567890"));
    }
}
