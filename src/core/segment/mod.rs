//! Shared, reference-counted segment handles.
//!
//! # Architecture
//!
//! - **SegmentResource**: capability trait for an opened segment
//! - **RefCountedHandle**: acquire/release/invalidate state machine
//! - **SegmentLease**: RAII borrow of a handle
//! - **HandleRegistry**: id -> current handle directory
//! - **RegistryMetrics**: transition counters
//!
//! Each handle has its own lock; the registry table has another. The
//! registry never holds its table lock while taking a handle's lock.

mod handle;
mod lease;
mod metrics;
mod registry;
mod resource;

#[cfg(test)]
pub(crate) mod test_support;

pub use handle::{HandleSnapshot, RefCountedHandle};
pub use lease::SegmentLease;
pub use metrics::{MetricsSnapshot, RegistryMetrics};
pub use registry::{HandleRegistry, HandleState};
pub use resource::SegmentResource;
