//! In-memory segment resource for unit tests.

use crate::core::error::{Result, SegrefError};
use crate::core::segment::SegmentResource;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Segment that only counts how often it was closed
#[derive(Debug)]
pub(crate) struct FakeSegment {
    closes: Arc<AtomicUsize>,
    fail_close: bool,
}

/// Observer kept by the test after the segment moves into a handle
#[derive(Clone)]
pub(crate) struct CloseCounter(Arc<AtomicUsize>);

impl CloseCounter {
    pub(crate) fn closes(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl FakeSegment {
    pub(crate) fn new() -> (Self, CloseCounter) {
        Self::build(false)
    }

    pub(crate) fn failing() -> (Self, CloseCounter) {
        Self::build(true)
    }

    fn build(fail_close: bool) -> (Self, CloseCounter) {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = CloseCounter(Arc::clone(&closes));
        (Self { closes, fail_close }, counter)
    }
}

impl SegmentResource for FakeSegment {
    fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(SegrefError::StorageError("simulated close failure".to_string()));
        }
        Ok(())
    }
}
