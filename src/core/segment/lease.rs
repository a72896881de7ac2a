//! Scoped borrow of a segment handle.

use crate::core::error::Result;
use crate::core::segment::handle::RefCountedHandle;
use crate::core::segment::resource::SegmentResource;
use std::ops::Deref;
use std::sync::Arc;

/// An acquired reference that releases itself
///
/// Dereferences to the wrapped resource. Dropping the lease releases it
/// and logs a failing close; call [`SegmentLease::release`] to observe
/// that failure instead.
#[derive(Debug)]
pub struct SegmentLease<R: SegmentResource> {
    handle: Arc<RefCountedHandle<R>>,
    released: bool,
}

impl<R: SegmentResource> RefCountedHandle<R> {
    /// Acquire a reference scoped to the returned lease
    pub fn lease(self: &Arc<Self>) -> Result<SegmentLease<R>> {
        self.acquire()?;
        Ok(SegmentLease {
            handle: Arc::clone(self),
            released: false,
        })
    }
}

impl<R: SegmentResource> SegmentLease<R> {
    /// The handle this lease borrows from
    pub fn handle(&self) -> &Arc<RefCountedHandle<R>> {
        &self.handle
    }

    /// Release now, surfacing a failing close
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.handle.release()
    }
}

impl<R: SegmentResource> Deref for SegmentLease<R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.handle.resource_unchecked()
    }
}

impl<R: SegmentResource> Drop for SegmentLease<R> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.handle.release() {
            tracing::error!(segment = %self.handle.id(), error = %e, "segment lease release failed");
        }
    }
}
