//! Unified service container for segref
//!
//! Owns the handle registry so its lifetime follows the embedding
//! service's startup and shutdown.

use crate::core::config::Config;
use crate::core::error::{Result, SegrefError};
use crate::core::segment::HandleRegistry;
use crate::core::storage::{SegmentCatalog, TantivySegment};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Outcome of [`Services::shutdown`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Handles that closed during shutdown
    pub closed: usize,

    /// Handles left open because borrowers still hold them
    pub still_borrowed: Vec<String>,

    /// Handles whose close failed
    pub close_failures: Vec<String>,
}

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Segment handle registry
    pub registry: Arc<HandleRegistry<TantivySegment>>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(HandleRegistry::new(config.registry.clone()));

        Self {
            registry,
            config: Arc::new(config),
        }
    }

    /// Open a catalog over `index_dir`, or the configured directory
    pub fn open_catalog(&self, index_dir: Option<&Path>) -> Result<SegmentCatalog> {
        let dir = index_dir.unwrap_or(&self.config.storage.index_dir);
        SegmentCatalog::open(dir, Arc::clone(&self.registry))
    }

    /// Invalidate every registered handle and prune the closed ones
    ///
    /// Borrowed handles close when their last borrower releases. A handle
    /// whose count went negative through unmatched releases is closed with
    /// [`crate::RefCountedHandle::force_close`].
    pub fn shutdown(&self) -> ShutdownReport {
        let mut report = ShutdownReport::default();

        for handle in self.registry.handles() {
            if handle.is_closed() {
                continue;
            }
            let outcome = match handle.invalidate() {
                // Nobody borrows it, but unmatched releases left the count
                // below zero, so it never becomes eligible on its own.
                Ok(()) if handle.reference_count() < 0 => {
                    tracing::warn!(
                        "Segment {} has reference count {} at shutdown, forcing close",
                        handle.id(),
                        handle.reference_count()
                    );
                    handle.force_close()
                }
                other => other,
            };

            match outcome {
                Ok(()) if handle.is_closed() => report.closed += 1,
                Ok(()) => report.still_borrowed.push(handle.id().to_string()),
                // Closed concurrently by its last borrower
                Err(e) if e.is_closed() => report.closed += 1,
                // Re-borrowed between the count check and the close
                Err(SegrefError::HandleInUse { .. }) => {
                    report.still_borrowed.push(handle.id().to_string())
                }
                Err(e) => {
                    tracing::warn!("Closing segment {} at shutdown failed: {}", handle.id(), e);
                    report.close_failures.push(handle.id().to_string());
                }
            }
        }

        self.registry.prune_closed();
        report.still_borrowed.sort();
        report.close_failures.sort();

        tracing::info!(
            "Segment registry shut down: {} closed, {} still borrowed",
            report.closed,
            report.still_borrowed.len()
        );
        report
    }
}
