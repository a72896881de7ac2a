// Registry tests: replacement, lookup and pruning

use crate::common::CountingSegment;
use segref::core::config::{NegativeCountPolicy, RegistryConfig};
use segref::{HandleRegistry, HandleState};
use std::sync::Arc;

#[test]
fn test_register_and_get() {
    let registry = HandleRegistry::default();
    let (segment, _counter) = CountingSegment::new();

    let handle = registry.register("seg-1", segment);

    assert!(Arc::ptr_eq(&registry.get("seg-1").unwrap(), &handle));
    assert!(registry.get("seg-2").is_none());
    assert_eq!(registry.ids(), vec!["seg-1".to_string()]);
}

#[test]
fn test_lookup_state_of_unknown_id() {
    let registry: HandleRegistry<CountingSegment> = HandleRegistry::default();

    assert_eq!(registry.lookup_state("nope"), HandleState::Unknown);
}

#[test]
fn test_lookup_state_json() {
    let registry = HandleRegistry::default();
    let (segment, _counter) = CountingSegment::new();
    registry.register("seg-json", segment).acquire().unwrap();

    let value = serde_json::to_value(registry.lookup_state("seg-json")).unwrap();
    assert_eq!(value["state"], "known");
    assert_eq!(value["id"], "seg-json");
    assert_eq!(value["reference_count"], 1);

    let unknown = serde_json::to_value(registry.lookup_state("other")).unwrap();
    assert_eq!(unknown["state"], "unknown");
}

#[test]
fn test_replaced_handle_closes_independently() {
    let registry = HandleRegistry::default();
    let (old_segment, old_counter) = CountingSegment::new();
    let (new_segment, new_counter) = CountingSegment::new();

    let old = registry.register("seg-r", old_segment);
    old.acquire().unwrap();
    let new = registry.register("seg-r", new_segment);

    // The registry does not close what it replaced.
    assert!(!old.is_closed());
    assert_eq!(old_counter.closes(), 0);

    old.invalidate().unwrap();
    old.release().unwrap();
    assert_eq!(old_counter.closes(), 1);

    assert!(Arc::ptr_eq(&registry.get("seg-r").unwrap(), &new));
    assert!(!new.is_closed());
    assert_eq!(new_counter.closes(), 0);
}

#[test]
fn test_closed_entries_stay_visible_until_pruned() {
    let registry = HandleRegistry::default();
    let (segment, _counter) = CountingSegment::new();
    registry.register("seg-old", segment).invalidate().unwrap();

    let snapshot = registry.lookup_state("seg-old");
    assert!(snapshot.snapshot().unwrap().closed);

    assert_eq!(registry.prune_closed(), 1);
    assert!(registry.is_empty());
}

#[test]
fn test_metrics_track_lifecycle() {
    let registry = HandleRegistry::default();
    let (a, _) = CountingSegment::new();
    let (b, _) = CountingSegment::failing();

    let first = registry.register("seg-a", a);
    first.acquire().unwrap();
    first.invalidate().unwrap();
    first.release().unwrap();

    let second = registry.register("seg-b", b);
    assert!(second.invalidate().is_err());
    // Unmatched release after close: refused and counted
    assert!(second.release().unwrap_err().is_closed());

    let metrics = registry.metrics();
    assert_eq!(metrics.created, 2);
    assert_eq!(metrics.acquired, 1);
    assert_eq!(metrics.released, 1);
    assert_eq!(metrics.invalidated, 2);
    assert_eq!(metrics.closed, 2);
    assert_eq!(metrics.close_failures, 1);
    assert_eq!(metrics.negative_count_anomalies, 1);
}

#[test]
fn test_clamp_policy_restores_zero() {
    let registry = HandleRegistry::new(RegistryConfig {
        negative_count_policy: NegativeCountPolicy::Clamp,
        ..RegistryConfig::default()
    });
    let (segment, counter) = CountingSegment::new();
    let handle = registry.register("seg-clamp", segment);

    handle.release().unwrap();
    assert_eq!(handle.reference_count(), 0);

    // With the count restored, invalidation closes as usual.
    handle.invalidate().unwrap();
    assert!(handle.is_closed());
    assert_eq!(counter.closes(), 1);
}
