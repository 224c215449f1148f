//! Stress tests for the engine under high contention: more threads and
//! operations than the correctness tests, pushing well past the cache's
//! capacity so eviction is constantly running alongside reads and writes.
//! These don't check specific outcomes (no assertion on *which* key
//! survives) — they check that nothing deadlocks, nothing panics, and the
//! engine's own invariants (I1, I2 via `len()` bookkeeping) still hold
//! afterward.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytecache::config::EngineConfig;
use bytecache::Engine;
use scoped_threadpool::Pool;

const NUM_THREADS: u32 = 16;
const OPS_PER_THREAD: usize = 10_000;

#[test]
fn stress_high_contention_mixed_store_and_load() {
    let cache = Arc::new(Engine::new(EngineConfig::new(EngineConfig::MIN_CACHE_SIZE_MB)));
    let total_evictions_possible = AtomicUsize::new(0);

    let mut pool = Pool::new(NUM_THREADS);
    pool.scoped(|scope| {
        for thread_id in 0..NUM_THREADS {
            let cache = Arc::clone(&cache);
            let total_evictions_possible = &total_evictions_possible;
            scope.execute(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (thread_id as u64) * 1000 + (i as u64 % 200);
                    let payload = vec![thread_id as u8; 64 + (i % 256)];
                    if i % 4 == 0 {
                        let _ = cache.load(key, 0);
                    } else if i % 37 == 0 {
                        cache.delete(key);
                    } else {
                        cache.store(key, 0, &payload, b"");
                    }
                    total_evictions_possible.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    assert!(cache.used_bytes() <= cache.capacity_bytes());
    assert_eq!(
        total_evictions_possible.load(Ordering::Relaxed),
        (NUM_THREADS as usize) * OPS_PER_THREAD
    );
}

#[test]
fn stress_many_readers_one_writer_no_deadlock() {
    let cache = Arc::new(Engine::new(EngineConfig::new(64)));
    for k in 0..64u64 {
        assert!(cache.store(k, 0, &vec![k as u8; 512], b""));
    }

    let mut pool = Pool::new(NUM_THREADS + 1);
    pool.scoped(|scope| {
        {
            let cache = Arc::clone(&cache);
            scope.execute(move || {
                for k in 0..5_000u64 {
                    cache.store(k % 64, 0, &vec![(k % 251) as u8; 256], b"");
                }
            });
        }
        for _ in 0..NUM_THREADS {
            let cache = Arc::clone(&cache);
            scope.execute(move || {
                for i in 0..OPS_PER_THREAD {
                    let _ = cache.load(i as u64 % 64, 0);
                }
            });
        }
    });

    assert!(cache.used_bytes() <= cache.capacity_bytes());
}

#[test]
fn stress_repeated_eviction_keeps_index_and_list_in_sync() {
    // Single-threaded but adversarial: force continuous eviction by
    // cycling through far more distinct keys than the budget can hold,
    // then assert len() never silently drifts from what's addressable.
    let cache = Engine::new(EngineConfig::new(EngineConfig::MIN_CACHE_SIZE_MB));
    let payload = vec![0u8; 4096];
    for k in 0..50_000u64 {
        cache.store(k, 0, &payload, b"");
        assert!(cache.used_bytes() <= cache.capacity_bytes());
    }
    assert!(cache.len() > 0);
    assert!(cache.load(49_999, 0).is_some());
}
