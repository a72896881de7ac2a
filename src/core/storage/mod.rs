//! Storage layer for tantivy-backed segment handles.
//!
//! # Architecture
//!
//! - **TantivySegment**: read-only segment resource over a `SegmentReader`
//! - **SegmentCatalog**: keeps a registry in step with an index directory
//!
//! # Index Directory Structure
//!
//! ```text
//! {index_dir}/
//! ├── meta.json          # Tantivy index metadata (segment list)
//! ├── .managed.json
//! └── [segment files]    # one set per segment uuid
//! ```

mod catalog;
mod tantivy;


pub use catalog::{RefreshReport, SegmentCatalog};
pub use tantivy::{SegmentStats, TantivySegment};
