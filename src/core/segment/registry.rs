//! Directory of the current handle for each segment id.
//!
//! The registry records handles, it does not own their resources and
//! never closes them. Replacing an id's entry leaves the previous handle
//! untouched: borrowers holding it keep a valid handle until they release
//! or invalidate it themselves.

use crate::core::config::RegistryConfig;
use crate::core::segment::handle::{HandleSnapshot, RefCountedHandle};
use crate::core::segment::metrics::{MetricsSnapshot, RegistryMetrics};
use crate::core::segment::resource::SegmentResource;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Result of [`HandleRegistry::lookup_state`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HandleState {
    Known(HandleSnapshot),
    Unknown,
}

impl HandleState {
    /// Whether the registry had an entry for the id
    pub fn is_known(&self) -> bool {
        matches!(self, HandleState::Known(_))
    }

    /// The snapshot, if any
    pub fn snapshot(&self) -> Option<&HandleSnapshot> {
        match self {
            HandleState::Known(snapshot) => Some(snapshot),
            HandleState::Unknown => None,
        }
    }
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleState::Known(snapshot) => fmt::Display::fmt(snapshot, f),
            HandleState::Unknown => f.write_str("<UNKNOWN>"),
        }
    }
}

/// Table of segment handles keyed by segment id
pub struct HandleRegistry<R> {
    table: RwLock<HashMap<String, Arc<RefCountedHandle<R>>>>,
    config: RegistryConfig,
    metrics: Arc<RegistryMetrics>,
}

impl<R: SegmentResource> HandleRegistry<R> {
    /// Create an empty registry
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            config,
            metrics: Arc::new(RegistryMetrics::default()),
        }
    }

    /// Wrap `resource` in a fresh handle and make it the entry for `id`
    ///
    /// The new handle starts with zero references; callers acquire it
    /// themselves.
    pub fn register(&self, id: impl Into<String>, resource: R) -> Arc<RefCountedHandle<R>> {
        let id = id.into();
        let handle = Arc::new(RefCountedHandle::with_policy(
            id.clone(),
            resource,
            self.config.negative_count_policy,
            Arc::clone(&self.metrics),
        ));

        let previous = self.table.write().insert(id.clone(), Arc::clone(&handle));
        if previous.is_some() {
            self.metrics.record_replaced();
            tracing::debug!(segment = %id, "replacing segment handle");
        }

        if !self.config.retain_closed {
            self.prune_closed();
        }

        handle
    }

    /// Current handle for `id`
    pub fn get(&self, id: &str) -> Option<Arc<RefCountedHandle<R>>> {
        self.table.read().get(id).cloned()
    }

    /// Diagnostic view of the entry for `id`
    pub fn lookup_state(&self, id: &str) -> HandleState {
        match self.get(id) {
            Some(handle) => HandleState::Known(handle.snapshot()),
            None => HandleState::Unknown,
        }
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.table.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Snapshots of every entry, sorted by id
    pub fn snapshot_all(&self) -> Vec<HandleSnapshot> {
        let mut snapshots: Vec<HandleSnapshot> =
            self.handles().iter().map(|handle| handle.snapshot()).collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    /// Drop entries whose handle has closed
    ///
    /// An entry replaced in the meantime is kept. Returns the number of
    /// entries removed.
    pub fn prune_closed(&self) -> usize {
        let entries: Vec<(String, Arc<RefCountedHandle<R>>)> = self
            .table
            .read()
            .iter()
            .map(|(id, handle)| (id.clone(), Arc::clone(handle)))
            .collect();
        let closed: Vec<_> = entries
            .into_iter()
            .filter(|(_, handle)| handle.is_closed())
            .collect();

        if closed.is_empty() {
            return 0;
        }

        let mut table = self.table.write();
        let mut removed = 0;
        for (id, handle) in closed {
            if table.get(&id).is_some_and(|current| Arc::ptr_eq(current, &handle)) {
                table.remove(&id);
                removed += 1;
            }
        }
        drop(table);

        tracing::debug!(removed, "pruned closed segment handles");
        removed
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Lifecycle counters for every handle this registry created
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Every registered handle
    ///
    /// Cloned out of the table so callers never hold the table lock while
    /// taking a handle's lock.
    pub fn handles(&self) -> Vec<Arc<RefCountedHandle<R>>> {
        self.table.read().values().cloned().collect()
    }
}

impl<R: SegmentResource> Default for HandleRegistry<R> {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl<R> fmt::Debug for HandleRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("entries", &self.table.read().len())
            .field("config", &self.config)
            .finish()
    }
}
