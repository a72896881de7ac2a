// Concurrency tests: racing borrowers and invalidation close exactly once

use crate::common::CountingSegment;
use segref::{HandleRegistry, RefCountedHandle};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const ROUNDS: usize = 200;

#[test]
fn test_racing_release_and_invalidate_close_once() {
    for _ in 0..ROUNDS {
        let (segment, counter) = CountingSegment::new();
        let handle = Arc::new(RefCountedHandle::new("seg-race", segment));
        for _ in 0..THREADS {
            handle.acquire().unwrap();
        }

        let barrier = Arc::new(Barrier::new(THREADS + 1));
        let mut workers = Vec::new();
        for _ in 0..THREADS {
            let handle = Arc::clone(&handle);
            let barrier = Arc::clone(&barrier);
            workers.push(thread::spawn(move || {
                barrier.wait();
                handle.release().unwrap();
            }));
        }

        let invalidator = {
            let handle = Arc::clone(&handle);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Loses the race once the last borrower already closed it
                let _ = handle.invalidate();
            })
        };

        for worker in workers {
            worker.join().unwrap();
        }
        invalidator.join().unwrap();

        // An invalidate that ran after every release closed it directly.
        assert_eq!(handle.reference_count(), 0);
        assert!(handle.is_closed());
        assert_eq!(counter.closes(), 1);
    }
}

#[test]
fn test_borrowers_never_observe_closed_resource() {
    let (segment, counter) = CountingSegment::new();
    let handle = Arc::new(RefCountedHandle::new("seg-busy", segment));
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let handle = Arc::clone(&handle);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut completed = 0usize;
                for _ in 0..ROUNDS {
                    match handle.lease() {
                        Ok(lease) => {
                            assert!(!lease.handle().is_closed());
                            completed += 1;
                        }
                        Err(e) => {
                            assert!(e.is_closed());
                            break;
                        }
                    }
                }
                completed
            })
        })
        .collect();

    thread::sleep(std::time::Duration::from_millis(1));
    let _ = handle.invalidate();

    let completed: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert!(completed <= THREADS * ROUNDS);

    // Either the last lease or the invalidate closed it.
    assert!(handle.is_closed());
    assert_eq!(handle.reference_count(), 0);
    assert_eq!(counter.closes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tasks_share_registry_handles() {
    let registry = Arc::new(HandleRegistry::default());
    let mut counters = Vec::new();
    for i in 0..4 {
        let (segment, counter) = CountingSegment::new();
        registry.register(format!("seg-{i}"), segment);
        counters.push(counter);
    }

    let mut tasks = Vec::new();
    for task in 0..16 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let handle = registry.get(&format!("seg-{}", task % 4)).unwrap();
            for _ in 0..50 {
                let lease = handle.lease().unwrap();
                tokio::task::yield_now().await;
                lease.release().unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    for handle in registry.handles() {
        assert_eq!(handle.reference_count(), 0);
        assert!(!handle.is_closed());
        handle.invalidate().unwrap();
    }
    assert!(counters.iter().all(|counter| counter.closes() == 1));
    assert_eq!(registry.prune_closed(), 4);
}
