use super::{FeatureToken, LicenseServer, OperatorOverride, Tier, TierPolicy, UsageReport, ValidationResponse};
use crate::error::{GateError, GateResult};
use crate::types::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Longest a decision is held before the server is asked again
pub const MAX_CACHE_HOLD: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Tunables for license resolution
#[derive(Debug, Clone)]
pub struct LicenseSettings {
    pub license_key: Option<String>,
    /// How long a successful check is trusted
    pub cache_ttl: Duration,
    /// Upper bound on every license-server call
    pub request_timeout: Duration,
    /// How long a fallback decision is served before the server is retried
    pub failure_backoff: Duration,
    /// One usage report per this many calls; 0 disables reporting
    pub report_every: u64,
}

impl Default for LicenseSettings {
    fn default() -> Self {
        Self {
            license_key: None,
            cache_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(5),
            failure_backoff: Duration::from_secs(60),
            report_every: 10,
        }
    }
}

/// Where a decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// Answered by the license server
    Fresh,
    /// Previous server answer reused while the server is unreachable
    CachedStale,
    /// No usable answer; lowest tier
    DefaultFallback,
    /// Forced by the operator override
    Override,
}

/// Resolved entitlement for the current caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseDecision {
    pub tier: Tier,
    pub allowed_categories: BTreeSet<Category>,
    /// `None` is unbounded
    pub request_quota: Option<u64>,
    pub usage_count: u64,
    /// True only when backed by a successful remote check
    pub valid: bool,
    pub resolved_at: DateTime<Utc>,
    pub status: DecisionStatus,
    pub message: String,
}

impl LicenseDecision {
    pub fn allows(&self, category: Category) -> bool {
        self.allowed_categories.contains(&category)
    }

    pub fn quota_exhausted(&self) -> bool {
        matches!(self.request_quota, Some(quota) if self.usage_count >= quota)
    }
}

/// Outcome of one pass through the resolution pipeline
enum Resolution {
    Fresh(LicenseDecision),
    CachedStale(LicenseDecision),
    DefaultFallback(LicenseDecision),
}

struct CachedDecision {
    decision: LicenseDecision,
    refresh_after: Instant,
}

/// Resolves the caller's license tier with a TTL cache and an offline
/// fallback ladder, and meters usage against the tier's quota.
pub struct LicenseEvaluator {
    settings: LicenseSettings,
    policy: TierPolicy,
    server: Option<Arc<dyn LicenseServer>>,
    client_id: String,
    operator: Option<(OperatorOverride, DateTime<Utc>)>,
    cache: RwLock<Option<CachedDecision>>,
    refresh: tokio::sync::Mutex<()>,
    usage: AtomicU64,
    report_counts: Mutex<HashMap<String, u64>>,
    token: RwLock<Option<FeatureToken>>,
}

impl LicenseEvaluator {
    /// `server` is `None` when no license server is configured
    pub fn new(
        settings: LicenseSettings,
        server: Option<Arc<dyn LicenseServer>>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            policy: TierPolicy::default(),
            server,
            client_id: client_id.into(),
            operator: None,
            cache: RwLock::new(None),
            refresh: tokio::sync::Mutex::new(()),
            usage: AtomicU64::new(0),
            report_counts: Mutex::new(HashMap::new()),
            token: RwLock::new(None),
        }
    }

    pub fn with_policy(mut self, policy: TierPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_operator_override(mut self, operator: Option<OperatorOverride>) -> Self {
        if let Some(operator) = &operator {
            warn!(tier = %operator.tier(), "Operator tier override active; license server bypassed");
        }
        self.operator = operator.map(|o| (o, Utc::now()));
        self
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Calls consumed in the current window
    pub fn usage_count(&self) -> u64 {
        self.usage.load(Ordering::SeqCst)
    }

    /// Resolve the current decision.
    ///
    /// Within the TTL this never touches the network. Concurrent callers
    /// that find the cache stale share one validation request.
    pub async fn resolve(&self) -> LicenseDecision {
        if let Some((operator, decided_at)) = &self.operator {
            return self.build(
                operator.tier(),
                true,
                DecisionStatus::Override,
                format!("Using license override: {}", operator.tier()),
                *decided_at,
            );
        }

        if let Some(decision) = self.cached_if_fresh() {
            return decision;
        }

        let _guard = self.refresh.lock().await;
        if let Some(decision) = self.cached_if_fresh() {
            return decision;
        }

        let resolution = self.run_pipeline().await;
        self.settle(resolution)
    }

    fn cached_if_fresh(&self) -> Option<LicenseDecision> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|c| Instant::now() < c.refresh_after)
            .map(|c| self.with_current_usage(c.decision.clone()))
    }

    async fn run_pipeline(&self) -> Resolution {
        let Some(key) = self.settings.license_key.clone() else {
            return Resolution::DefaultFallback(self.build(
                Tier::Free,
                false,
                DecisionStatus::DefaultFallback,
                "No license key provided. Running in free mode with limited features.",
                Utc::now(),
            ));
        };

        let failure = match &self.server {
            None => "license server is not configured".to_string(),
            Some(server) => {
                match tokio::time::timeout(
                    self.settings.request_timeout,
                    server.validate(&key, &self.client_id),
                )
                .await
                {
                    Ok(Ok(response)) => return Resolution::Fresh(self.from_response(response)),
                    Ok(Err(e)) => e.to_string(),
                    Err(_) => format!(
                        "validation timed out after {:?}",
                        self.settings.request_timeout
                    ),
                }
            }
        };

        self.fall_back(failure)
    }

    fn from_response(&self, response: ValidationResponse) -> LicenseDecision {
        let now = Utc::now();
        if !response.valid {
            return self.build(
                Tier::Free,
                false,
                DecisionStatus::Fresh,
                response
                    .message
                    .unwrap_or_else(|| "Invalid license key".to_string()),
                now,
            );
        }

        let tier = response.level.unwrap_or(Tier::Free);
        self.usage.fetch_max(response.usage, Ordering::SeqCst);

        if let Some(token) = response.feature_token {
            let lifetime = response.token_expires.unwrap_or(3600).min(MAX_CACHE_HOLD.as_secs());
            let expires_at = now + chrono::Duration::seconds(lifetime as i64);
            *self.token.write().unwrap_or_else(|e| e.into_inner()) =
                Some(FeatureToken { token, expires_at });
        }

        self.build(
            tier,
            true,
            DecisionStatus::Fresh,
            format!("License validated: {} tier", tier),
            now,
        )
    }

    /// Previous server answer if there is one, otherwise the free tier
    fn fall_back(&self, reason: String) -> Resolution {
        let previous = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.decision.clone())
            .filter(|d| matches!(d.status, DecisionStatus::Fresh | DecisionStatus::CachedStale));

        match previous {
            Some(mut decision) => {
                warn!(reason = %reason, tier = %decision.tier, "License server unavailable, using cached decision");
                decision.status = DecisionStatus::CachedStale;
                decision.message = "Using cached license information (offline mode)".to_string();
                Resolution::CachedStale(decision)
            }
            None => {
                warn!(reason = %reason, "License server unavailable, falling back to free tier");
                Resolution::DefaultFallback(self.build(
                    Tier::Free,
                    false,
                    DecisionStatus::DefaultFallback,
                    "License validation service unavailable. Running in limited mode.",
                    Utc::now(),
                ))
            }
        }
    }

    fn settle(&self, resolution: Resolution) -> LicenseDecision {
        let (decision, hold_for) = match resolution {
            Resolution::Fresh(decision) => {
                debug!(tier = %decision.tier, valid = decision.valid, "License resolved");
                (decision, self.settings.cache_ttl)
            }
            Resolution::CachedStale(decision) | Resolution::DefaultFallback(decision) => {
                (decision, self.settings.failure_backoff)
            }
        };

        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(CachedDecision {
            decision: decision.clone(),
            refresh_after: Instant::now() + hold_for.min(MAX_CACHE_HOLD),
        });

        self.with_current_usage(decision)
    }

    fn build(
        &self,
        tier: Tier,
        valid: bool,
        status: DecisionStatus,
        message: impl Into<String>,
        resolved_at: DateTime<Utc>,
    ) -> LicenseDecision {
        let features = self.policy.features(tier);
        LicenseDecision {
            tier,
            allowed_categories: features.allowed_categories.clone(),
            request_quota: self.policy.quota(tier),
            usage_count: self.usage_count(),
            valid,
            resolved_at,
            status,
            message: message.into(),
        }
    }

    fn with_current_usage(&self, mut decision: LicenseDecision) -> LicenseDecision {
        decision.usage_count = self.usage_count();
        decision
    }

    /// Atomically charge one call against the quota and track it.
    ///
    /// Overlapping calls cannot push a bounded counter past its quota.
    pub fn admit(&self, decision: &LicenseDecision, operation: &str) -> GateResult<u64> {
        let used = match decision.request_quota {
            None => self.usage.fetch_add(1, Ordering::SeqCst) + 1,
            Some(quota) => self
                .usage
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                    (used < quota).then_some(used + 1)
                })
                .map(|previous| previous + 1)
                .map_err(|used| GateError::QuotaExceeded {
                    used,
                    quota,
                    tier: decision.tier,
                })?,
        };
        self.report_usage(operation);
        Ok(used)
    }

    /// Count one call of `operation` without a quota check
    pub fn track_usage(&self, operation: &str) -> u64 {
        let used = self.usage.fetch_add(1, Ordering::SeqCst) + 1;
        self.report_usage(operation);
        used
    }

    fn caller_key(&self) -> String {
        let key_prefix: String = self
            .settings
            .license_key
            .as_deref()
            .unwrap_or("anonymous")
            .chars()
            .take(8)
            .collect();
        format!("{}:{}", key_prefix, self.client_id)
    }

    /// Every `report_every` calls per caller, fire one report at the server
    fn report_usage(&self, operation: &str) {
        let every = self.settings.report_every;
        if every == 0 {
            return;
        }

        let count = {
            let mut counts = self.report_counts.lock().unwrap_or_else(|e| e.into_inner());
            let count = counts.entry(self.caller_key()).or_insert(0);
            *count += 1;
            *count
        };
        if count % every != 0 {
            return;
        }

        let (Some(server), Some(key)) = (self.server.clone(), self.settings.license_key.clone())
        else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime available, skipping usage report");
            return;
        };

        let report = UsageReport {
            key,
            tool: operation.to_string(),
            count: every,
            machine_id: self.client_id.clone(),
        };
        let timeout = self.settings.request_timeout;
        runtime.spawn(async move {
            match tokio::time::timeout(timeout, server.track(report)).await {
                Ok(Ok(())) => debug!("Usage report delivered"),
                Ok(Err(e)) => debug!(error = %e, "Usage report failed"),
                Err(_) => debug!("Usage report timed out"),
            }
        });
    }

    /// Feature token for premium-only integrations.
    ///
    /// `None` when the current tier lacks the integration or the server
    /// cannot issue one.
    pub async fn feature_token(&self) -> Option<FeatureToken> {
        let decision = self.resolve().await;
        if !self.policy.features(decision.tier).workflow_integration {
            return None;
        }

        if let Some(token) = self
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|t| !t.is_expired())
        {
            return Some(token.clone());
        }

        let (Some(server), Some(key)) = (&self.server, &self.settings.license_key) else {
            return None;
        };
        match tokio::time::timeout(self.settings.request_timeout, server.issue_token(key)).await {
            Ok(Ok(token)) => {
                info!("Feature token issued");
                *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());
                Some(token)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Feature token request failed");
                None
            }
            Err(_) => {
                warn!("Feature token request timed out");
                None
            }
        }
    }
}
