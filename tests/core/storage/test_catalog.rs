// Catalog tests against real tantivy indexes

use crate::common::TestIndex;
use segref::core::storage::SegmentCatalog;
use segref::HandleRegistry;
use std::sync::Arc;

fn open(index: &TestIndex) -> SegmentCatalog {
    SegmentCatalog::open(index.dir.path(), Arc::new(HandleRegistry::default()))
        .expect("Failed to open catalog")
}

#[test]
fn test_catalog_registers_segments_idle() {
    let index = TestIndex::small();
    let catalog = open(&index);

    let handles = catalog.handles();
    assert_eq!(handles.len(), 3);
    for handle in &handles {
        assert_eq!(handle.reference_count(), 0);
        assert!(!handle.is_invalid_for_reuse());
        assert!(catalog.registry().lookup_state(handle.id()).is_known());
    }
}

#[test]
fn test_doc_freq_across_segments() {
    let index = TestIndex::small();
    let catalog = open(&index);

    assert_eq!(catalog.doc_freq("body", "search").unwrap(), 3);
    assert_eq!(catalog.doc_freq("body", "reader").unwrap(), 2);
    assert_eq!(catalog.doc_freq("body", "absent").unwrap(), 0);
}

#[test]
fn test_stats_match_documents() {
    let index = TestIndex::small();
    let catalog = open(&index);

    let total: u32 = catalog
        .segment_stats()
        .unwrap()
        .iter()
        .map(|stats| stats.num_docs)
        .sum();
    assert_eq!(total, 6);
}

#[test]
fn test_rebuild_retires_and_replaces_segments() {
    let index = TestIndex::small();
    let catalog = open(&index);
    let before = catalog.handles();

    index.clear();
    index.add_batch(&["fresh segment"]);
    let report = catalog.refresh().unwrap();

    assert_eq!(report.retired.len(), 3);
    assert_eq!(report.added.len(), 1);
    assert!(report.close_failures.is_empty());
    assert!(before.iter().all(|handle| handle.is_closed()));
    assert_eq!(catalog.doc_freq("body", "fresh").unwrap(), 1);
    assert_eq!(catalog.doc_freq("body", "search").unwrap(), 0);
}

#[test]
fn test_query_in_flight_survives_refresh() {
    let index = TestIndex::small();
    let catalog = open(&index);
    let term = index.term("search");

    let leases: Vec<_> = catalog
        .handles()
        .iter()
        .map(|handle| handle.lease().unwrap())
        .collect();

    index.clear();
    catalog.refresh().unwrap();

    // Retired but still readable through the leases
    let mut found = 0;
    for lease in &leases {
        assert!(lease.handle().is_invalid_for_reuse());
        assert!(!lease.handle().is_closed());
        found += lease.doc_freq(&term).unwrap();
    }
    assert_eq!(found, 3);

    let handles: Vec<_> = leases.iter().map(|lease| Arc::clone(lease.handle())).collect();
    drop(leases);
    assert!(handles.iter().all(|handle| handle.is_closed()));
}

#[test]
fn test_shared_registry_between_catalogs() {
    let first_index = TestIndex::with_batches(&[&["one"]]);
    let second_index = TestIndex::with_batches(&[&["two"], &["three"]]);
    let registry = Arc::new(HandleRegistry::default());

    let first = SegmentCatalog::open(first_index.dir.path(), Arc::clone(&registry)).unwrap();
    let second = SegmentCatalog::open(second_index.dir.path(), Arc::clone(&registry)).unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(first.handles().len(), 1);
    assert_eq!(second.handles().len(), 2);
}

#[test]
fn test_doc_freq_ignores_segment_closed_behind_catalog() {
    let index = TestIndex::small();
    let catalog = open(&index);
    let handles = catalog.handles();

    // Another owner of the shared registry retires one segment.
    handles[0].invalidate().unwrap();

    let leases = catalog.leases().unwrap();
    assert_eq!(leases.len(), 2);
    assert!(leases.iter().all(|lease| !lease.handle().is_closed()));
    drop(leases);

    let expected: u32 = handles[1..]
        .iter()
        .map(|handle| handle.lease().unwrap().doc_freq(&index.term("search")).unwrap())
        .sum();
    assert_eq!(catalog.doc_freq("body", "search").unwrap(), u64::from(expected));
}
