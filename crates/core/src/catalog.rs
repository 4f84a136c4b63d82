// Capability catalog: the static table of operations a caller may invoke

use crate::types::{Category, OperationDescriptor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Central catalog of operation descriptors, keyed by name and kept in
/// insertion order so listings are deterministic.
pub struct Catalog {
    inner: RwLock<CatalogInner>,
    generation: AtomicU64,
}

#[derive(Default)]
struct CatalogInner {
    entries: Vec<OperationDescriptor>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CatalogInner::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Insert or overwrite a descriptor by name.
    ///
    /// Overwriting keeps the original listing position. Every call bumps the
    /// generation, which invalidates derived enabled sets.
    pub fn register(&self, descriptor: OperationDescriptor) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match inner.index.get(&descriptor.name).copied() {
            Some(position) => inner.entries[position] = descriptor,
            None => {
                let position = inner.entries.len();
                inner.index.insert(descriptor.name.clone(), position);
                inner.entries.push(descriptor);
            }
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Register descriptors in the order given
    pub fn register_many(&self, descriptors: impl IntoIterator<Item = OperationDescriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    pub fn get_by_name(&self, name: &str) -> Option<OperationDescriptor> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .index
            .get(name)
            .map(|&position| inner.entries[position].clone())
    }

    pub fn get_by_category(&self, category: Category) -> Vec<OperationDescriptor> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .entries
            .iter()
            .filter(|d| d.category == category)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<OperationDescriptor> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .index
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Monotonic counter bumped on every registration
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
