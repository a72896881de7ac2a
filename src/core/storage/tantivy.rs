//! Tantivy segment resource.
//!
//! Wraps one [`SegmentReader`] so it can be shared through a
//! [`crate::core::segment::RefCountedHandle`]. Only read-only queries are
//! exposed.

use crate::core::error::{Result, SegrefError};
use crate::core::segment::SegmentResource;
use parking_lot::RwLock;
use serde::Serialize;
use tantivy::{SegmentReader, Term};

/// Document counts for one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentStats {
    pub id: String,
    pub num_docs: u32,
    pub max_doc: u32,
    pub num_deleted_docs: u32,
}

/// Read-only tantivy segment
pub struct TantivySegment {
    /// Segment uuid
    id: String,

    /// Taken out on close
    reader: RwLock<Option<SegmentReader>>,
}

impl std::fmt::Debug for TantivySegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivySegment")
            .field("id", &self.id)
            .field("open", &self.reader.read().is_some())
            .finish()
    }
}

impl TantivySegment {
    /// Take ownership of an opened segment reader
    pub fn new(reader: SegmentReader) -> Self {
        Self {
            id: reader.segment_id().uuid_string(),
            reader: RwLock::new(Some(reader)),
        }
    }

    /// Segment uuid string
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of live documents
    pub fn num_docs(&self) -> Result<u32> {
        self.with_reader(|reader| Ok(reader.num_docs()))
    }

    /// Number of documents including deleted ones
    pub fn max_doc(&self) -> Result<u32> {
        self.with_reader(|reader| Ok(reader.max_doc()))
    }

    /// Number of deleted documents
    pub fn num_deleted_docs(&self) -> Result<u32> {
        self.with_reader(|reader| Ok(reader.num_deleted_docs()))
    }

    /// Document counts in one read
    pub fn stats(&self) -> Result<SegmentStats> {
        self.with_reader(|reader| {
            Ok(SegmentStats {
                id: self.id.clone(),
                num_docs: reader.num_docs(),
                max_doc: reader.max_doc(),
                num_deleted_docs: reader.num_deleted_docs(),
            })
        })
    }

    /// Number of documents in this segment containing `term`
    pub fn doc_freq(&self, term: &Term) -> Result<u32> {
        self.with_reader(|reader| {
            let inverted_index = reader.inverted_index(term.field()).map_err(|e| {
                SegrefError::StorageError(format!("Failed to open inverted index: {e}"))
            })?;
            inverted_index
                .doc_freq(term)
                .map_err(|e| SegrefError::StorageError(format!("Failed to read term info: {e}")))
        })
    }

    fn with_reader<T>(&self, f: impl FnOnce(&SegmentReader) -> Result<T>) -> Result<T> {
        let guard = self.reader.read();
        match guard.as_ref() {
            Some(reader) => f(reader),
            None => Err(SegrefError::StorageError(format!(
                "Segment {} is closed",
                self.id
            ))),
        }
    }
}

impl SegmentResource for TantivySegment {
    fn close(&self) -> Result<()> {
        match self.reader.write().take() {
            Some(reader) => {
                drop(reader);
                Ok(())
            }
            None => Err(SegrefError::StorageError(format!(
                "Segment {} already closed",
                self.id
            ))),
        }
    }
}
