//! Lifecycle counters shared by a registry and its handles.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for segment handle state transitions
///
/// Advisory only: nothing in the handle state machine reads them.
#[derive(Debug, Default)]
pub struct RegistryMetrics {
    created: AtomicU64,
    replaced: AtomicU64,
    acquired: AtomicU64,
    released: AtomicU64,
    invalidated: AtomicU64,
    closed: AtomicU64,
    close_failures: AtomicU64,
    negative_count_anomalies: AtomicU64,
}

/// Point-in-time copy of [`RegistryMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub created: u64,
    pub replaced: u64,
    pub acquired: u64,
    pub released: u64,
    pub invalidated: u64,
    pub closed: u64,
    pub close_failures: u64,
    pub negative_count_anomalies: u64,
}

impl RegistryMetrics {
    pub(crate) fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replaced(&self) {
        self.replaced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_acquired(&self) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidated(&self) {
        self.invalidated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_closed(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_close_failure(&self) {
        self.close_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_negative_count(&self) {
        self.negative_count_anomalies.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            replaced: self.replaced.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
            negative_count_anomalies: self.negative_count_anomalies.load(Ordering::Relaxed),
        }
    }
}
