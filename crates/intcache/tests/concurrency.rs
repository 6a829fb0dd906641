// ==============================================
// INTCACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Many threads hammering one cache. Values always equal their key, so any
// hit returning a different value would be a torn slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use intcache::{CacheConfig, IntCache, RecencyMode, WAYS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_key(rng: &mut StdRng) -> u32 {
    // Avoid the reserved (0, 0) entry
    rng.gen_range(1..=u32::MAX)
}

#[test]
fn parallel_set_get_never_tears() {
    let cache = Arc::new(IntCache::new(12).unwrap());
    let mismatches = Arc::new(AtomicU64::new(0));

    let handles: Vec<_> = (0..16)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let mismatches = Arc::clone(&mismatches);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t);
                for _ in 0..20_000 {
                    let key = random_key(&mut rng);
                    cache.set(key, key).unwrap();
                    if let Some(value) = cache.get(key) {
                        if value != key {
                            mismatches.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(mismatches.load(Ordering::Relaxed), 0);
    assert!(cache.len() <= cache.capacity());
}

#[test]
fn contended_bucket_stays_consistent() {
    // One bucket, every thread colliding on it
    let cache = IntCache::new(0).unwrap();
    let barrier = Barrier::new(8);

    thread::scope(|s| {
        for t in 0..8u32 {
            let cache = &cache;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for i in 0..10_000u32 {
                    let key = t * 1_000_000 + i + 1;
                    cache.set(key, key).unwrap();
                    if let Some(value) = cache.get(key) {
                        assert_eq!(value, key);
                    }
                }
            });
        }
    });

    assert_eq!(cache.len(), WAYS);
    for t in 0..8u32 {
        // Each thread's last write is likely still cached; if so it pairs up
        let key = t * 1_000_000 + 10_000;
        if let Some(value) = cache.get(key) {
            assert_eq!(value, key);
        }
    }
}

#[test]
fn strict_recency_keeps_permutation_under_contention() {
    let cache = IntCache::with_config(CacheConfig::new(0).recency(RecencyMode::Strict)).unwrap();
    for key in 1..=WAYS as u32 {
        cache.set(key, key).unwrap();
    }
    assert!(cache.register(0).is_permutation());

    thread::scope(|s| {
        for t in 0..8 {
            let cache = &cache;
            s.spawn(move || {
                let mut rng = StdRng::seed_from_u64(t);
                for _ in 0..50_000 {
                    cache.touch(0, rng.gen_range(0..WAYS));
                }
            });
        }
    });

    assert!(cache.register(0).is_permutation());
}

#[test]
fn concurrent_readers_see_stable_entries() {
    let cache = IntCache::with_config(CacheConfig::new(6).track_stats(true)).unwrap();
    for key in 1..=256u32 {
        cache.set(key, key.wrapping_mul(3)).unwrap();
    }

    thread::scope(|s| {
        for _ in 0..8 {
            let cache = &cache;
            s.spawn(move || {
                for _ in 0..100 {
                    for key in 1..=256u32 {
                        assert_eq!(cache.get(key), Some(key.wrapping_mul(3)));
                    }
                }
            });
        }
    });

    let stats = cache.stats().unwrap();
    assert_eq!(stats.hits(), 8 * 100 * 256);
    assert_eq!(stats.misses(), 0);
}
