//! Registry-backed view of a tantivy index directory.
//!
//! The catalog opens an index with a manually reloaded reader and keeps
//! one registry handle per live segment. After the index changes,
//! [`SegmentCatalog::refresh`] registers new segments and invalidates
//! the ones that were merged away or deleted. Queries already holding a
//! retired handle finish against it; the segment is released when they
//! let go.

use crate::core::error::{Result, SegrefError};
use crate::core::segment::{HandleRegistry, RefCountedHandle, SegmentLease};
use crate::core::storage::tantivy::{SegmentStats, TantivySegment};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tantivy::schema::Field;
use tantivy::{Index, IndexReader, ReloadPolicy, Term};

/// Segments that changed during a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Newly registered segment ids
    pub added: Vec<String>,

    /// Segment ids invalidated because they left the index
    pub retired: Vec<String>,

    /// Retired segment ids whose close failed
    pub close_failures: Vec<String>,
}

impl RefreshReport {
    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.retired.is_empty()
    }
}

/// Live segments of one index, tracked in a shared registry
pub struct SegmentCatalog {
    index_dir: PathBuf,
    index: Index,
    reader: IndexReader,
    registry: Arc<HandleRegistry<TantivySegment>>,

    /// Segment ids this catalog registered and still considers live
    live: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for SegmentCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentCatalog")
            .field("index_dir", &self.index_dir)
            .field("live", &self.live.lock().len())
            .finish()
    }
}

impl SegmentCatalog {
    /// Open the index at `index_dir` and register its segments
    pub fn open(index_dir: &Path, registry: Arc<HandleRegistry<TantivySegment>>) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .map_err(|e| SegrefError::StorageError(format!("Failed to open index: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SegrefError::StorageError(format!("Failed to create reader: {e}")))?;

        let catalog = Self {
            index_dir: index_dir.to_path_buf(),
            index,
            reader,
            registry,
            live: Mutex::new(HashSet::new()),
        };

        let report = catalog.sync()?;
        tracing::info!(
            "Opened segment catalog at {:?} with {} segment(s)",
            catalog.index_dir,
            report.added.len()
        );

        Ok(catalog)
    }

    /// Reload the reader and reconcile registered segments
    pub fn refresh(&self) -> Result<RefreshReport> {
        self.reader
            .reload()
            .map_err(|e| SegrefError::StorageError(format!("Failed to reload reader: {e}")))?;

        let report = self.sync()?;
        if !report.is_empty() {
            tracing::info!(
                "Refreshed {:?}: {} added, {} retired",
                self.index_dir,
                report.added.len(),
                report.retired.len()
            );
        }
        Ok(report)
    }

    fn sync(&self) -> Result<RefreshReport> {
        let searcher = self.reader.searcher();
        let mut live = self.live.lock();
        let mut current = HashSet::new();
        let mut report = RefreshReport::default();

        for segment_reader in searcher.segment_readers() {
            let segment = TantivySegment::new(segment_reader.clone());
            let id = segment.id().to_string();
            current.insert(id.clone());

            // Someone else may have invalidated or replaced our entry.
            let usable = self
                .registry
                .get(&id)
                .is_some_and(|handle| !handle.is_invalid_for_reuse());
            if !live.contains(&id) || !usable {
                self.registry.register(id.clone(), segment);
                report.added.push(id);
            }
        }

        for id in live.difference(&current) {
            if let Some(handle) = self.registry.get(id) {
                match handle.invalidate() {
                    Ok(()) => {}
                    Err(e) if e.is_closed() => {}
                    Err(e) => {
                        tracing::warn!("Retiring segment {} failed: {}", id, e);
                        report.close_failures.push(id.clone());
                    }
                }
            }
            report.retired.push(id.clone());
        }

        *live = current;
        report.added.sort();
        report.retired.sort();
        report.close_failures.sort();
        Ok(report)
    }

    /// Handles for the live segments, sorted by id
    pub fn handles(&self) -> Vec<Arc<RefCountedHandle<TantivySegment>>> {
        let mut ids: Vec<String> = self.live.lock().iter().cloned().collect();
        ids.sort();
        ids.iter().filter_map(|id| self.registry.get(id)).collect()
    }

    /// Lease every live segment
    ///
    /// A segment retired and closed by a concurrent refresh between
    /// listing and leasing is skipped; its replacement, if any, is already
    /// registered under a new id.
    pub fn leases(&self) -> Result<Vec<SegmentLease<TantivySegment>>> {
        lease_open(self.handles())
    }

    /// Document counts for every live segment
    pub fn segment_stats(&self) -> Result<Vec<SegmentStats>> {
        self.leases()?.iter().map(|lease| lease.stats()).collect()
    }

    /// Look up a schema field by name
    pub fn field(&self, name: &str) -> Result<Field> {
        self.index
            .schema()
            .get_field(name)
            .map_err(|e| SegrefError::StorageError(format!("Unknown field '{name}': {e}")))
    }

    /// Documents containing `text` in `field_name`, summed over live segments
    ///
    /// Each segment is leased for the duration of its lookup, so a
    /// concurrent refresh cannot release it mid-read.
    pub fn doc_freq(&self, field_name: &str, text: &str) -> Result<u64> {
        let term = Term::from_field_text(self.field(field_name)?, text);
        let mut total = 0u64;
        for lease in self.leases()? {
            total += u64::from(lease.doc_freq(&term)?);
        }
        Ok(total)
    }

    /// Index directory
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Registry the segments are tracked in
    pub fn registry(&self) -> &Arc<HandleRegistry<TantivySegment>> {
        &self.registry
    }
}

fn lease_open(
    handles: Vec<Arc<RefCountedHandle<TantivySegment>>>,
) -> Result<Vec<SegmentLease<TantivySegment>>> {
    let mut leases = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.lease() {
            Ok(lease) => leases.push(lease),
            Err(e) if e.is_closed() => {
                tracing::debug!(segment = %handle.id(), "skipping segment closed before lease");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(leases)
}
