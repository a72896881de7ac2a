//! Capability interface for the resources a segment handle owns.

use crate::core::error::Result;

/// An already-opened, read-only index segment.
///
/// Implementations are produced elsewhere (see
/// [`crate::core::storage::TantivySegment`]) and handed to a
/// [`super::RefCountedHandle`], which becomes their only owner. The trait
/// carries no mutating operation: read access is whatever the concrete
/// type exposes through `&self`.
pub trait SegmentResource: Send + Sync {
    /// Release the underlying storage.
    ///
    /// Called at most once by the owning handle, inside its critical
    /// section. An error still leaves the handle closed.
    fn close(&self) -> Result<()>;
}
