use crate::license::Tier;
use crate::types::Category;
use serde::{Deserialize, Serialize};

/// Result type for gateway operations
pub type GateResult<T> = Result<T, GateError>;

/// Errors surfaced by the gateway core
#[derive(Debug, Clone, thiserror::Error)]
pub enum GateError {
    /// Required settings are absent; fatal at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation's category is not part of the current license
    #[error(
        "Tool '{operation}' belongs to category '{category}', which is not included in your {tier} license. Upgrade your license to use it."
    )]
    NotLicensed {
        operation: String,
        category: Category,
        tier: Tier,
    },

    /// Usage counter reached the tier's request quota
    #[error("Request quota exceeded: {used} of {quota} calls used on the {tier} license. Wait for the next billing window or upgrade.")]
    QuotaExceeded { used: u64, quota: u64, tier: Tier },

    /// Explicitly switched off by a per-operation override
    #[error("Tool '{0}' is disabled by configuration")]
    Disabled(String),

    /// Name not present in the catalog
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    /// Arguments violate the operation's input contract
    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    /// The upstream call failed
    #[error("API Error: {0}")]
    Upstream(String),
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::NotLicensed { .. } | Self::Disabled(_) => ErrorKind::Forbidden,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::UnknownOperation(_) => ErrorKind::NotFound,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::Upstream(_) => ErrorKind::UpstreamFailure,
        }
    }
}

/// Stable classification carried in failure envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    QuotaExceeded,
    InvalidArguments,
    UpstreamFailure,
    Configuration,
}

impl ErrorKind {
    /// Both license rejections are forbidden-class; they differ in the remedy
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ErrorKind::Forbidden | ErrorKind::QuotaExceeded)
    }
}
