/*!
 * Set Stress Tests
 * Concurrent stress tests for the shared value set
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uniqset::{InsertOutcome, RemoveOutcome, ValueSet};

// Test constants for stress testing
const WRITER_TASKS: usize = 8;
const READER_TASKS: usize = 4;
const VALUES_PER_WRITER: i64 = 256;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_100_concurrent_inserts_then_iterate() {
    let set = Arc::new(ValueSet::new());
    let mut handles = vec![];

    for v in 0..100 {
        let set = Arc::clone(&set);
        handles.push(tokio::spawn(async move {
            set.insert(v).unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), InsertOutcome::Inserted);
    }

    // Exactly 100 distinct entries, each observed exactly once.
    let mut observed: Vec<i64> = set.iterate("A").values().collect();
    assert_eq!(observed.len(), 100);
    observed.sort_unstable();
    assert_eq!(observed, (0..100).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_duplicate_inserts_collapse() {
    let set = Arc::new(ValueSet::new());
    let inserted = Arc::new(AtomicU64::new(0));
    let already = Arc::new(AtomicU64::new(0));

    let mut handles = vec![];
    for _ in 0..WRITER_TASKS {
        let set = Arc::clone(&set);
        let inserted = Arc::clone(&inserted);
        let already = Arc::clone(&already);

        handles.push(tokio::spawn(async move {
            for v in 0..64 {
                match set.insert(v).unwrap() {
                    InsertOutcome::Inserted => inserted.fetch_add(1, Ordering::Relaxed),
                    InsertOutcome::AlreadyPresent => already.fetch_add(1, Ordering::Relaxed),
                };
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Every value won the race exactly once.
    assert_eq!(inserted.load(Ordering::Relaxed), 64);
    assert_eq!(
        inserted.load(Ordering::Relaxed) + already.load(Ordering::Relaxed),
        (WRITER_TASKS * 64) as u64
    );
    assert_eq!(set.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_readers_race_writers() {
    let set = Arc::new(ValueSet::new());
    // Stable population the writers never touch.
    for v in -VALUES_PER_WRITER..0 {
        set.insert(v).unwrap();
    }

    let mut handles = vec![];

    // Readers sweep continuously while writers churn.
    for _ in 0..READER_TASKS {
        let set = Arc::clone(&set);
        handles.push(tokio::spawn(async move {
            for _ in 0..100 {
                let mut last = i64::MIN;
                for value in set.iterate("reader").values() {
                    // Every observed value is one some writer actually
                    // inserted, never torn.
                    assert!(
                        (-VALUES_PER_WRITER..WRITER_TASKS as i64 * VALUES_PER_WRITER)
                            .contains(&value)
                    );
                    // The stable population keeps its insertion order
                    // relative to itself.
                    if value < 0 {
                        assert!(value > last, "stable entries observed out of order");
                        last = value;
                    }
                }
            }
        }));
    }

    // Each writer churns its own disjoint range: insert, then remove a
    // value it inserted a little earlier.
    for writer in 0..WRITER_TASKS as i64 {
        let set = Arc::clone(&set);
        handles.push(tokio::spawn(async move {
            let base = writer * VALUES_PER_WRITER;
            for v in base..base + VALUES_PER_WRITER {
                set.insert(v).unwrap();
                if v - 64 >= base {
                    set.remove(v - 64);
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reader_pinned_across_removal_of_unvisited_entry() {
    let set = Arc::new(ValueSet::new());
    for v in 0..1000 {
        set.insert(v).unwrap();
    }

    let reader_set = Arc::clone(&set);
    let reader = tokio::task::spawn_blocking(move || {
        // A slow reader: begins before the removals below and must observe
        // each surviving entry once or not at all, never a freed one.
        let observed: Vec<i64> = reader_set.iterate("slow").values().collect();
        for window in observed.windows(2) {
            assert!(window[0] < window[1], "insertion order violated");
        }
        observed.len()
    });

    let remover = tokio::task::spawn_blocking(move || {
        for v in (0..1000).step_by(3) {
            set.remove(v);
        }
    });

    let observed_len = reader.await.unwrap();
    remover.await.unwrap();
    // Somewhere between "saw everything" and "saw only survivors".
    assert!((666..=1000).contains(&observed_len));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_uniqueness_holds_under_random_churn() {
    let set = Arc::new(ValueSet::new());

    let mut handles = vec![];
    for seed in 0..WRITER_TASKS as u64 {
        let set = Arc::clone(&set);
        handles.push(tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..2000 {
                let v = rng.gen_range(0..64i64);
                if rng.gen_bool(0.6) {
                    set.insert(v).unwrap();
                } else {
                    set.remove(v);
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // However the races resolved, no value appears twice.
    let observed: Vec<i64> = set.iterate("A").values().collect();
    let mut deduped = observed.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), observed.len(), "duplicate entries: {observed:?}");
    assert_eq!(set.len(), observed.len());
}

#[tokio::test]
async fn test_double_remove_is_idempotent() {
    let set = ValueSet::new();
    set.insert(7).unwrap();

    assert_eq!(set.remove(7), RemoveOutcome::Removed);
    assert_eq!(set.remove(7), RemoveOutcome::NotFound);
    assert!(set.is_empty());
}

#[tokio::test]
async fn test_scenario_insert_insert_duplicate() {
    let set = ValueSet::new();
    set.insert(5).unwrap();
    set.insert(3).unwrap();
    assert_eq!(set.insert(5).unwrap(), InsertOutcome::AlreadyPresent);

    let lines: Vec<String> = set.iterate("A").collect();
    assert_eq!(
        lines,
        vec![
            "This is start of list, (entry name is A)",
            "val is 5",
            "val is 3",
        ]
    );
}

#[tokio::test]
async fn test_scenario_remove_then_list() {
    let set = ValueSet::new();
    set.insert(5).unwrap();
    set.insert(3).unwrap();

    assert_eq!(set.remove(5), RemoveOutcome::Removed);

    let lines: Vec<String> = set.iterate("B").collect();
    assert_eq!(
        lines,
        vec!["This is start of list, (entry name is B)", "val is 3"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_drain_after_concurrent_churn() {
    let set = Arc::new(ValueSet::new());

    let mut handles = vec![];
    for writer in 0..4i64 {
        let set = Arc::clone(&set);
        handles.push(tokio::spawn(async move {
            for v in 0..128 {
                set.insert(writer * 128 + v).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(set.drain(), 512);
    assert!(set.is_empty());
    assert_eq!(set.iterate("A").values().count(), 0);
}
