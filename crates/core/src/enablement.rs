// Enablement filter: the live, license-filtered view of the catalog

use crate::catalog::Catalog;
use crate::license::{LicenseDecision, LicenseEvaluator, Tier};
use crate::types::{Category, OperationDescriptor};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Whether one descriptor is callable.
///
/// An explicit override always wins; otherwise the category decides.
pub fn operation_enabled(
    descriptor: &OperationDescriptor,
    allowed: &BTreeSet<Category>,
    overrides: &HashMap<String, bool>,
) -> bool {
    overrides
        .get(&descriptor.name)
        .copied()
        .unwrap_or_else(|| allowed.contains(&descriptor.category))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    catalog_generation: u64,
    override_generation: u64,
    resolved_at: DateTime<Utc>,
    tier: Tier,
}

struct EnabledSet {
    key: CacheKey,
    operations: Arc<Vec<OperationDescriptor>>,
}

/// Derives the enabled set from the catalog, the current license decision
/// and the per-operation override map.
pub struct EnablementFilter {
    catalog: Arc<Catalog>,
    license: Arc<LicenseEvaluator>,
    overrides: RwLock<HashMap<String, bool>>,
    override_generation: AtomicU64,
    cache: RwLock<Option<EnabledSet>>,
}

impl EnablementFilter {
    pub fn new(catalog: Arc<Catalog>, license: Arc<LicenseEvaluator>) -> Self {
        Self {
            catalog,
            license,
            overrides: RwLock::new(HashMap::new()),
            override_generation: AtomicU64::new(0),
            cache: RwLock::new(None),
        }
    }

    /// Seed the override map, typically from configuration
    pub fn with_overrides(self, overrides: HashMap<String, bool>) -> Self {
        *self.overrides.write().unwrap_or_else(|e| e.into_inner()) = overrides;
        self.override_generation.fetch_add(1, Ordering::SeqCst);
        self
    }

    /// Force an operation on (`true`) or off (`false`) regardless of license
    pub fn set_override(&self, name: impl Into<String>, enabled: bool) {
        self.overrides
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), enabled);
        self.override_generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Drop an override so the category decides again
    pub fn clear_override(&self, name: &str) {
        let removed = self
            .overrides
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
        if removed.is_some() {
            self.override_generation.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn overrides(&self) -> HashMap<String, bool> {
        self.overrides
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Operations the current caller may invoke, in catalog order
    pub async fn enabled_operations(&self) -> Arc<Vec<OperationDescriptor>> {
        let decision = self.license.resolve().await;
        self.enabled_for(&decision)
    }

    /// False for unknown names
    pub async fn is_enabled(&self, name: &str) -> bool {
        let Some(descriptor) = self.catalog.get_by_name(name) else {
            return false;
        };
        let decision = self.license.resolve().await;
        self.descriptor_enabled(&descriptor, &decision)
    }

    /// Single-descriptor check against an already resolved decision
    pub fn descriptor_enabled(
        &self,
        descriptor: &OperationDescriptor,
        decision: &LicenseDecision,
    ) -> bool {
        let overrides = self.overrides.read().unwrap_or_else(|e| e.into_inner());
        operation_enabled(descriptor, &decision.allowed_categories, &overrides)
    }

    /// Enabled set for a given decision, served from cache when nothing changed
    pub fn enabled_for(&self, decision: &LicenseDecision) -> Arc<Vec<OperationDescriptor>> {
        let key = CacheKey {
            catalog_generation: self.catalog.generation(),
            override_generation: self.override_generation.load(Ordering::SeqCst),
            resolved_at: decision.resolved_at,
            tier: decision.tier,
        };

        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|c| c.key == key)
        {
            return cached.operations.clone();
        }

        let operations = {
            let overrides = self.overrides.read().unwrap_or_else(|e| e.into_inner());
            Arc::new(
                self.catalog
                    .all()
                    .into_iter()
                    .filter(|d| operation_enabled(d, &decision.allowed_categories, &overrides))
                    .collect::<Vec<_>>(),
            )
        };
        debug!(
            tier = %decision.tier,
            enabled = operations.len(),
            total = self.catalog.len(),
            "Recomputed enabled operations"
        );

        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(EnabledSet {
            key,
            operations: operations.clone(),
        });
        operations
    }
}
