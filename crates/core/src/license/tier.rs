use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Ordered license level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Basic,
    Premium,
}

impl Tier {
    /// The unbounded tier
    pub const TOP: Tier = Tier::Premium;

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Basic => "basic",
            Tier::Premium => "premium",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "basic" => Ok(Tier::Basic),
            "premium" => Ok(Tier::Premium),
            other => Err(format!("unknown license tier: {}", other)),
        }
    }
}

/// What a tier unlocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierFeatures {
    pub allowed_categories: BTreeSet<Category>,
    /// Calls per billing window; `None` is unbounded
    pub request_quota: Option<u64>,
    pub workflow_integration: bool,
}

/// Feature table for every tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    free: TierFeatures,
    basic: TierFeatures,
    premium: TierFeatures,
}

impl TierPolicy {
    pub fn features(&self, tier: Tier) -> &TierFeatures {
        match tier {
            Tier::Free => &self.free,
            Tier::Basic => &self.basic,
            Tier::Premium => &self.premium,
        }
    }

    /// Replace the features of one tier
    pub fn with_features(mut self, tier: Tier, features: TierFeatures) -> Self {
        match tier {
            Tier::Free => self.free = features,
            Tier::Basic => self.basic = features,
            Tier::Premium => self.premium = features,
        }
        self
    }

    /// Quota enforced for `tier`; the top tier is never bounded
    pub fn quota(&self, tier: Tier) -> Option<u64> {
        if tier == Tier::TOP {
            None
        } else {
            self.features(tier).request_quota
        }
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        let free: BTreeSet<Category> = [Category::CampaignManagement, Category::LeadManagement]
            .into_iter()
            .collect();

        let mut basic = free.clone();
        basic.extend([
            Category::CampaignStatistics,
            Category::SmartDelivery,
            Category::Webhooks,
            Category::ClientManagement,
            Category::SmartSenders,
            Category::EmailAccountManagement,
        ]);

        Self {
            free: TierFeatures {
                allowed_categories: free,
                request_quota: Some(100),
                workflow_integration: false,
            },
            basic: TierFeatures {
                allowed_categories: basic,
                request_quota: Some(1000),
                workflow_integration: false,
            },
            premium: TierFeatures {
                allowed_categories: Category::ALL.into_iter().collect(),
                request_quota: None,
                workflow_integration: true,
            },
        }
    }
}
