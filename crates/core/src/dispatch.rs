// Dispatch router: resolves a call, re-checks license and quota, and hands
// the validated arguments to the adapter registered for the category.

use crate::catalog::Catalog;
use crate::enablement::EnablementFilter;
use crate::error::{ErrorKind, GateError, GateResult};
use crate::license::LicenseEvaluator;
use crate::types::{Category, OperationDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Failure reported by an adapter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterError {
    /// Upstream HTTP status, when there was a response
    pub status: Option<u16>,
    /// Upstream-provided message, when there was one
    pub message: Option<String>,
}

impl AdapterError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.message, self.status) {
            (Some(message), _) => write!(f, "{}", message),
            (None, Some(status)) => write!(f, "upstream request failed with status {}", status),
            (None, None) => write!(f, "upstream request failed"),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Performs the upstream call for one category of operations
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn call(
        &self,
        operation: &OperationDescriptor,
        arguments: Value,
    ) -> Result<Value, AdapterError>;
}

/// Uniform result of a dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchEnvelope {
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl DispatchEnvelope {
    pub fn success(payload: Value) -> Self {
        Self {
            succeeded: true,
            payload: Some(payload),
            error_message: None,
            error_kind: None,
        }
    }

    pub fn failure(error: &GateError) -> Self {
        Self {
            succeeded: false,
            payload: None,
            error_message: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// Shared state every transport dispatches against
#[derive(Clone)]
pub struct GatewayContext {
    pub catalog: Arc<Catalog>,
    pub license: Arc<LicenseEvaluator>,
    pub filter: Arc<EnablementFilter>,
}

impl GatewayContext {
    pub fn new(catalog: Arc<Catalog>, license: Arc<LicenseEvaluator>) -> Self {
        let filter = Arc::new(EnablementFilter::new(catalog.clone(), license.clone()));
        Self {
            catalog,
            license,
            filter,
        }
    }

    pub fn with_filter(mut self, filter: EnablementFilter) -> Self {
        self.filter = Arc::new(filter);
        self
    }
}

pub struct DispatchRouter {
    context: GatewayContext,
    adapters: HashMap<Category, Arc<dyn Adapter>>,
}

impl DispatchRouter {
    pub fn new(context: GatewayContext) -> Self {
        Self {
            context,
            adapters: HashMap::new(),
        }
    }

    /// Register the adapter serving `category`, replacing any previous one
    pub fn with_adapter(mut self, category: Category, adapter: Arc<dyn Adapter>) -> Self {
        self.adapters.insert(category, adapter);
        self
    }

    pub fn context(&self) -> &GatewayContext {
        &self.context
    }

    /// Operations the current caller may invoke
    pub async fn list_operations(&self) -> Arc<Vec<OperationDescriptor>> {
        self.context.filter.enabled_operations().await
    }

    /// Run one call end to end; never fails past this boundary
    pub async fn dispatch(&self, name: &str, arguments: Value) -> DispatchEnvelope {
        match self.try_dispatch(name, arguments).await {
            Ok(payload) => DispatchEnvelope::success(payload),
            Err(e) => {
                match e.kind() {
                    ErrorKind::UpstreamFailure => warn!(tool = %name, error = %e, "Tool call failed"),
                    _ => info!(tool = %name, error = %e, "Tool call rejected"),
                }
                DispatchEnvelope::failure(&e)
            }
        }
    }

    async fn try_dispatch(&self, name: &str, arguments: Value) -> GateResult<Value> {
        let descriptor = self
            .context
            .catalog
            .get_by_name(name)
            .ok_or_else(|| GateError::UnknownOperation(name.to_string()))?;

        let decision = self.context.license.resolve().await;
        if !self.context.filter.descriptor_enabled(&descriptor, &decision) {
            if decision.allows(descriptor.category) {
                return Err(GateError::Disabled(descriptor.name));
            }
            return Err(GateError::NotLicensed {
                operation: descriptor.name,
                category: descriptor.category,
                tier: decision.tier,
            });
        }

        let arguments = descriptor
            .input_contract
            .validate(arguments)
            .map_err(|reason| GateError::InvalidArguments {
                operation: descriptor.name.clone(),
                reason,
            })?;

        let adapter = self
            .adapters
            .get(&descriptor.category)
            .cloned()
            .ok_or_else(|| {
                GateError::Upstream(format!(
                    "no adapter registered for category {}",
                    descriptor.category
                ))
            })?;

        let used = self.context.license.admit(&decision, &descriptor.name)?;
        debug!(tool = %descriptor.name, category = %descriptor.category, used, "Dispatching tool call");

        // Run on its own task so a panicking adapter becomes a failed envelope
        let task = tokio::spawn(async move { adapter.call(&descriptor, arguments).await });
        match task.await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(e)) => Err(GateError::Upstream(e.to_string())),
            Err(join) if join.is_panic() => {
                Err(GateError::Upstream("adapter panicked while handling the call".to_string()))
            }
            Err(_) => Err(GateError::Upstream("adapter call was cancelled".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::{
        FeatureToken, LicenseError, LicenseServer, LicenseSettings, Tier, TierFeatures,
        TierPolicy, UsageReport, ValidationResponse,
    };
    use crate::types::InputContract;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAdapter {
        calls: AtomicUsize,
        outcome: Result<Value, AdapterError>,
    }

    impl CountingAdapter {
        fn ok(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome: Ok(payload),
            })
        }

        fn failing(error: AdapterError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                outcome: Err(error),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Adapter for CountingAdapter {
        async fn call(&self, _op: &OperationDescriptor, _args: Value) -> Result<Value, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    struct PanickingAdapter;

    #[async_trait]
    impl Adapter for PanickingAdapter {
        async fn call(&self, _op: &OperationDescriptor, _args: Value) -> Result<Value, AdapterError> {
            panic!("boom")
        }
    }

    #[derive(Default)]
    struct CountingLicenseServer {
        validations: AtomicUsize,
    }

    #[async_trait]
    impl LicenseServer for CountingLicenseServer {
        async fn validate(&self, _key: &str, _client: &str) -> Result<ValidationResponse, LicenseError> {
            self.validations.fetch_add(1, Ordering::SeqCst);
            Ok(ValidationResponse {
                valid: true,
                level: Some(Tier::Basic),
                ..Default::default()
            })
        }

        async fn track(&self, _report: UsageReport) -> Result<(), LicenseError> {
            Ok(())
        }

        async fn issue_token(&self, _key: &str) -> Result<FeatureToken, LicenseError> {
            Err(LicenseError::Transport("unsupported".to_string()))
        }
    }

    fn catalog() -> Arc<Catalog> {
        let catalog = Arc::new(Catalog::new());
        catalog.register_many(vec![
            OperationDescriptor::new(
                "opA",
                "campaign op",
                Category::CampaignManagement,
                InputContract::new(json!({
                    "type": "object",
                    "properties": { "campaign_id": { "type": "number" } },
                    "required": ["campaign_id"]
                })),
            ),
            OperationDescriptor::new("opB", "webhook op", Category::Webhooks, InputContract::any()),
        ]);
        catalog
    }

    fn free_license(quota: u64) -> Arc<LicenseEvaluator> {
        let policy = TierPolicy::default().with_features(
            Tier::Free,
            TierFeatures {
                allowed_categories: [Category::CampaignManagement].into_iter().collect(),
                request_quota: Some(quota),
                workflow_integration: false,
            },
        );
        Arc::new(LicenseEvaluator::new(LicenseSettings::default(), None, "test").with_policy(policy))
    }

    fn router(license: Arc<LicenseEvaluator>, adapter: Arc<dyn Adapter>) -> DispatchRouter {
        DispatchRouter::new(GatewayContext::new(catalog(), license))
            .with_adapter(Category::CampaignManagement, adapter.clone())
            .with_adapter(Category::Webhooks, adapter)
    }

    #[tokio::test]
    async fn test_list_operations_is_license_filtered() {
        let router = router(free_license(100), CountingAdapter::ok(json!({})));
        let names: Vec<_> = router
            .list_operations()
            .await
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(names, vec!["opA"]);
    }

    #[tokio::test]
    async fn test_successful_dispatch() {
        let adapter = CountingAdapter::ok(json!({ "id": 7 }));
        let router = router(free_license(100), adapter.clone());

        let envelope = router.dispatch("opA", json!({ "campaign_id": 7 })).await;
        assert!(envelope.succeeded);
        assert_eq!(envelope.payload, Some(json!({ "id": 7 })));
        assert_eq!(adapter.calls(), 1);
        assert_eq!(router.context().license.usage_count(), 1);
    }

    #[tokio::test]
    async fn test_quota_exceeded_skips_adapter() {
        let adapter = CountingAdapter::ok(json!({}));
        let license = free_license(2);
        let router = router(license.clone(), adapter.clone());

        license.track_usage("opA");
        license.track_usage("opA");
        let envelope = router.dispatch("opA", json!({ "campaign_id": 1 })).await;

        assert!(!envelope.succeeded);
        assert_eq!(envelope.error_kind, Some(ErrorKind::QuotaExceeded));
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_operation_skips_license_check() {
        let server = Arc::new(CountingLicenseServer::default());
        let settings = LicenseSettings {
            license_key: Some("key".to_string()),
            ..Default::default()
        };
        let backend: Arc<dyn LicenseServer> = server.clone();
        let license = Arc::new(LicenseEvaluator::new(settings, Some(backend), "test"));
        let router = router(license, CountingAdapter::ok(json!({})));

        let envelope = router.dispatch("nonexistent", json!({})).await;
        assert_eq!(envelope.error_kind, Some(ErrorKind::NotFound));
        assert_eq!(envelope.error_message.as_deref(), Some("Unknown tool: nonexistent"));
        assert_eq!(server.validations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unlicensed_category_is_forbidden() {
        let adapter = CountingAdapter::ok(json!({}));
        let router = router(free_license(100), adapter.clone());

        let envelope = router.dispatch("opB", json!({})).await;
        assert_eq!(envelope.error_kind, Some(ErrorKind::Forbidden));
        assert!(envelope.error_message.unwrap().contains("webhooks"));
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn test_overrides_apply_to_dispatch() {
        let adapter = CountingAdapter::ok(json!({}));
        let router = router(free_license(100), adapter.clone());
        router.context().filter.set_override("opB", true);
        router.context().filter.set_override("opA", false);

        assert!(router.dispatch("opB", json!({})).await.succeeded);
        let disabled = router.dispatch("opA", json!({ "campaign_id": 1 })).await;
        assert_eq!(disabled.error_kind, Some(ErrorKind::Forbidden));
        assert!(disabled.error_message.unwrap().contains("disabled"));
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_arguments_do_not_charge_quota() {
        let adapter = CountingAdapter::ok(json!({}));
        let router = router(free_license(100), adapter.clone());

        let envelope = router.dispatch("opA", json!({ "campaign_id": "seven" })).await;
        assert_eq!(envelope.error_kind, Some(ErrorKind::InvalidArguments));
        assert_eq!(router.context().license.usage_count(), 0);
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_carries_message() {
        let adapter = CountingAdapter::failing(AdapterError::new(Some(404), "Campaign not found"));
        let router = router(free_license(100), adapter);

        let envelope = router.dispatch("opA", json!({ "campaign_id": 1 })).await;
        assert_eq!(envelope.error_kind, Some(ErrorKind::UpstreamFailure));
        assert_eq!(envelope.error_message.as_deref(), Some("API Error: Campaign not found"));

        let generic = CountingAdapter::failing(AdapterError::default());
        let router = self::router(free_license(100), generic);
        let envelope = router.dispatch("opA", json!({ "campaign_id": 1 })).await;
        assert_eq!(envelope.error_message.as_deref(), Some("API Error: upstream request failed"));
    }

    #[tokio::test]
    async fn test_adapter_panic_becomes_failed_envelope() {
        let router = router(free_license(100), Arc::new(PanickingAdapter));

        let envelope = router.dispatch("opA", json!({ "campaign_id": 1 })).await;
        assert!(!envelope.succeeded);
        assert_eq!(envelope.error_kind, Some(ErrorKind::UpstreamFailure));

        // The router keeps serving afterwards
        let again = router.dispatch("nonexistent", json!({})).await;
        assert_eq!(again.error_kind, Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_envelope_wire_format() {
        let ok = serde_json::to_value(DispatchEnvelope::success(json!([1]))).unwrap();
        assert_eq!(ok, json!({ "succeeded": true, "payload": [1] }));

        let failed = serde_json::to_value(DispatchEnvelope::failure(&GateError::UnknownOperation(
            "x".to_string(),
        )))
        .unwrap();
        assert_eq!(failed["errorKind"], "not_found");
        assert_eq!(failed["succeeded"], false);
    }
}
