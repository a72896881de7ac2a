//! segref - shared read-only handles onto search index segments
//!
//! Query executions borrow one opened segment instead of reopening it
//! from storage. A segment superseded by a newer index generation is
//! invalidated and physically released only once its last borrower lets
//! go.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - segment (ref-counted handles, registry, leases, metrics)
//!   - storage (tantivy segment resources, catalog)
//!   - config, error, logging, xdg
//!   - services (service container owning the registry)
//!
//! - **cli**: clap adapter (depends on core)
//!
//! # Example
//!
//! ```no_run
//! use segref::core::segment::HandleRegistry;
//! use segref::core::storage::TantivySegment;
//!
//! # fn demo(reader: tantivy::SegmentReader) -> segref::Result<()> {
//! let registry: HandleRegistry<TantivySegment> = HandleRegistry::default();
//! let segment = TantivySegment::new(reader);
//! let handle = registry.register(segment.id().to_string(), segment);
//!
//! handle.acquire()?;
//! let docs = handle.resource()?.num_docs()?;
//! handle.release()?;
//!
//! // Superseded: closes now, or when the last borrower releases.
//! handle.invalidate()?;
//! # let _ = docs;
//! # Ok(())
//! # }
//! ```

// Core domain logic
pub mod core;

// CLI adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{Result, SegrefError};
pub use core::segment::{HandleRegistry, HandleState, RefCountedHandle, SegmentLease, SegmentResource};
pub use core::services::Services;
