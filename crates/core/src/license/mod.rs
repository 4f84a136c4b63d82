// License gating: tiers, the remote license-server boundary, and the evaluator

mod evaluator;
mod identity;
mod operator;
mod tier;

pub use evaluator::{
    DecisionStatus, LicenseDecision, LicenseEvaluator, LicenseSettings, MAX_CACHE_HOLD,
};
pub use identity::{machine_id, machine_id_from};
pub use operator::OperatorOverride;
pub use tier::{Tier, TierFeatures, TierPolicy};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failures talking to the license server
#[derive(Debug, Clone, thiserror::Error)]
pub enum LicenseError {
    #[error("license server unreachable: {0}")]
    Transport(String),

    #[error("license server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed license server response: {0}")]
    Malformed(String),
}

/// Body of a `/validate` answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(default)]
    pub level: Option<Tier>,
    #[serde(default)]
    pub usage: u64,
    #[serde(default)]
    pub feature_token: Option<String>,
    /// Token lifetime in seconds
    #[serde(default)]
    pub token_expires: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Batched usage report sent to `/track`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub key: String,
    pub tool: String,
    pub count: u64,
    pub machine_id: String,
}

/// Short-lived credential for premium-only integrations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl FeatureToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// The remote license service
#[async_trait::async_trait]
pub trait LicenseServer: Send + Sync {
    /// Validate `license_key` for the caller identified by `client_id`
    async fn validate(
        &self,
        license_key: &str,
        client_id: &str,
    ) -> Result<ValidationResponse, LicenseError>;

    /// Report a batch of usage; best effort
    async fn track(&self, report: UsageReport) -> Result<(), LicenseError>;

    /// Request a fresh feature token
    async fn issue_token(&self, license_key: &str) -> Result<FeatureToken, LicenseError>;
}
