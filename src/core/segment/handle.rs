//! Reference-counted handle onto one read-only index segment.
//!
//! A handle is created with zero references. Borrowers bracket their use
//! with [`RefCountedHandle::acquire`] and [`RefCountedHandle::release`]; a
//! maintenance path calls [`RefCountedHandle::invalidate`] once the segment
//! has been superseded. The wrapped resource is closed exactly once, by
//! whichever call leaves the handle with zero references while invalid.
//!
//! ```text
//! created(0) --acquire--> acquired(n) --release--> released(n-1)
//!      |                                                |
//!      +-------------------invalidate-------------------+
//!                              |
//!                  refs == 0 && invalid
//!                              v
//!                          closed (terminal)
//! ```

use crate::core::config::NegativeCountPolicy;
use crate::core::error::{Result, SegrefError};
use crate::core::segment::metrics::RegistryMetrics;
use crate::core::segment::resource::SegmentResource;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Mutable handle state, guarded by the handle's mutex
#[derive(Debug, Default)]
struct Lifecycle {
    /// Signed so an unmatched release stays visible
    references: i64,
    invalid_for_reuse: bool,
    closed: bool,
}

/// Read-only view of a handle's state at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleSnapshot {
    pub id: String,
    pub reference_count: i64,
    pub invalid_for_reuse: bool,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for HandleSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Id = {} References = {} Invalid = {} Closed = {}",
            self.id, self.reference_count, self.invalid_for_reuse, self.closed
        )
    }
}

/// Shared, read-only handle onto an index segment
pub struct RefCountedHandle<R> {
    id: String,
    resource: R,
    lifecycle: Mutex<Lifecycle>,
    created_at: DateTime<Utc>,
    policy: NegativeCountPolicy,
    metrics: Arc<RegistryMetrics>,
}

/// Name of the calling thread for transition events
fn caller() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}

impl<R: SegmentResource> RefCountedHandle<R> {
    /// Wrap `resource` in a standalone handle with zero references
    ///
    /// Handles created through [`super::HandleRegistry::register`] share
    /// the registry's counters and policy instead.
    pub fn new(id: impl Into<String>, resource: R) -> Self {
        Self::with_policy(
            id,
            resource,
            NegativeCountPolicy::default(),
            Arc::new(RegistryMetrics::default()),
        )
    }

    pub(crate) fn with_policy(
        id: impl Into<String>,
        resource: R,
        policy: NegativeCountPolicy,
        metrics: Arc<RegistryMetrics>,
    ) -> Self {
        let id = id.into();
        metrics.record_created();
        tracing::debug!(segment = %id, thread = %caller(), "segment handle created");

        Self {
            id,
            resource,
            lifecycle: Mutex::new(Lifecycle::default()),
            created_at: Utc::now(),
            policy,
            metrics,
        }
    }

    /// Register a new borrower
    ///
    /// Fails with [`SegrefError::HandleClosed`] once the handle is closed;
    /// a dead handle is never resurrected.
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.lifecycle.lock();
        if state.closed {
            return Err(self.closed_error());
        }

        state.references += 1;
        self.metrics.record_acquired();
        tracing::debug!(
            segment = %self.id,
            thread = %caller(),
            references = state.references,
            "segment handle acquired"
        );
        Ok(())
    }

    /// Drop one borrower
    ///
    /// An unmatched release drives the count negative. That is logged and
    /// counted, never returned: the caller's cleanup path must not fail
    /// because of someone else's accounting bug. Fails with
    /// [`SegrefError::HandleClosed`] once closed, leaving the count alone,
    /// and with [`SegrefError::CloseFailed`] when the physical close this
    /// call triggers fails.
    pub fn release(&self) -> Result<()> {
        let mut state = self.lifecycle.lock();
        if state.closed {
            // Every borrower was gone when it closed, so this one is unmatched.
            self.metrics.record_negative_count();
            tracing::error!(
                segment = %self.id,
                thread = %caller(),
                references = state.references,
                "release on closed segment handle"
            );
            return Err(self.closed_error());
        }

        state.references -= 1;
        self.metrics.record_released();
        tracing::debug!(
            segment = %self.id,
            thread = %caller(),
            references = state.references,
            "segment handle released"
        );

        if state.references < 0 {
            self.metrics.record_negative_count();
            tracing::error!(
                segment = %self.id,
                thread = %caller(),
                references = state.references,
                "invalid reference count for segment handle"
            );
            if self.policy == NegativeCountPolicy::Clamp {
                state.references = 0;
            }
        }

        self.close_if_eligible(&mut state)
    }

    /// Mark the segment as superseded
    ///
    /// Does not wait for borrowers. If none remain, the resource is closed
    /// before this returns.
    pub fn invalidate(&self) -> Result<()> {
        let mut state = self.lifecycle.lock();
        if state.closed {
            return Err(self.closed_error());
        }

        if !state.invalid_for_reuse {
            state.invalid_for_reuse = true;
            self.metrics.record_invalidated();
        }
        tracing::debug!(
            segment = %self.id,
            thread = %caller(),
            references = state.references,
            "segment handle invalidated"
        );

        self.close_if_eligible(&mut state)
    }

    /// Close the resource now, regardless of the reuse flag
    ///
    /// Terminal path for shutdown. Refuses while borrowers remain. A
    /// negative count does not block it, so a handle damaged by unmatched
    /// releases can still be released.
    pub fn force_close(&self) -> Result<()> {
        let mut state = self.lifecycle.lock();
        if state.closed {
            return Err(self.closed_error());
        }
        if state.references > 0 {
            return Err(SegrefError::HandleInUse {
                id: self.id.clone(),
                references: state.references,
            });
        }

        state.invalid_for_reuse = true;
        self.close_resource(&mut state)
    }

    fn close_if_eligible(&self, state: &mut Lifecycle) -> Result<()> {
        if state.references == 0 && state.invalid_for_reuse && !state.closed {
            return self.close_resource(state);
        }

        tracing::trace!(
            segment = %self.id,
            thread = %caller(),
            references = state.references,
            invalid_for_reuse = state.invalid_for_reuse,
            "segment handle still open"
        );
        Ok(())
    }

    /// Caller holds the lock and has checked eligibility
    fn close_resource(&self, state: &mut Lifecycle) -> Result<()> {
        // Marked first: a failing close is never retried.
        state.closed = true;
        self.metrics.record_closed();

        match self.resource.close() {
            Ok(()) => {
                tracing::debug!(segment = %self.id, thread = %caller(), "segment handle closed");
                Ok(())
            }
            Err(e) => {
                self.metrics.record_close_failure();
                tracing::error!(
                    segment = %self.id,
                    thread = %caller(),
                    error = %e,
                    "failed to close segment resource"
                );
                Err(SegrefError::CloseFailed {
                    id: self.id.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Borrow the wrapped resource
    ///
    /// Callers are expected to hold an acquired reference while using it.
    pub fn resource(&self) -> Result<&R> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        Ok(&self.resource)
    }

    pub(crate) fn resource_unchecked(&self) -> &R {
        &self.resource
    }

    /// Deletion through a shared read-only handle is never allowed
    pub fn delete_document(&self, doc: u32) -> Result<()> {
        Err(SegrefError::UnsupportedOperation(format!(
            "cannot delete document {doc} from segment {}: handles are read-only",
            self.id
        )))
    }

    /// Segment identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current number of outstanding borrowers
    pub fn reference_count(&self) -> i64 {
        self.lifecycle.lock().references
    }

    /// Whether the segment has been superseded
    pub fn is_invalid_for_reuse(&self) -> bool {
        self.lifecycle.lock().invalid_for_reuse
    }

    /// Whether the resource has been released
    pub fn is_closed(&self) -> bool {
        self.lifecycle.lock().closed
    }

    /// Consistent copy of all observable state
    pub fn snapshot(&self) -> HandleSnapshot {
        let state = self.lifecycle.lock();
        HandleSnapshot {
            id: self.id.clone(),
            reference_count: state.references,
            invalid_for_reuse: state.invalid_for_reuse,
            closed: state.closed,
            created_at: self.created_at,
        }
    }

    fn closed_error(&self) -> SegrefError {
        SegrefError::HandleClosed {
            id: self.id.clone(),
        }
    }
}

impl<R> fmt::Debug for RefCountedHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lifecycle.lock();
        f.debug_struct("RefCountedHandle")
            .field("id", &self.id)
            .field("references", &state.references)
            .field("invalid_for_reuse", &state.invalid_for_reuse)
            .field("closed", &state.closed)
            .finish()
    }
}

// Identity is the segment id, so a replacement handle equals the one it
// replaced. Use `Arc::ptr_eq` to tell instances apart.
impl<R> PartialEq for RefCountedHandle<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<R> Eq for RefCountedHandle<R> {}

impl<R> Hash for RefCountedHandle<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
