//! Concurrent set/get workload against one shared cache

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use intcache::IntCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Workload shape
#[derive(Debug, Clone, Copy)]
pub struct Workload {
    pub threads: usize,
    pub ops_per_thread: usize,
    /// Keys are drawn from `1..=key_space`
    pub key_space: u32,
    pub seed: u64,
}

/// Raw outcome of one run
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub elapsed: Duration,
    pub sets: u64,
    pub gets: u64,
    pub hits: u64,
    pub torn: u64,
}

/// Each worker repeats `set(k, k); get(k)` with random keys. Any hit whose
/// value differs from its key is counted as torn.
pub fn run(cache: &IntCache, workload: &Workload) -> Result<Outcome> {
    if workload.threads == 0 {
        bail!("thread count must be at least 1");
    }
    if workload.key_space == 0 {
        bail!("key space must be at least 1");
    }

    let hits = AtomicU64::new(0);
    let torn = AtomicU64::new(0);

    info!(
        "Running {} threads x {} ops over {} keys",
        workload.threads, workload.ops_per_thread, workload.key_space
    );

    let start = Instant::now();
    thread::scope(|s| -> Result<()> {
        let handles: Vec<_> = (0..workload.threads)
            .map(|t| {
                let (hits, torn) = (&hits, &torn);
                s.spawn(move || -> Result<()> {
                    let mut rng = StdRng::seed_from_u64(workload.seed.wrapping_add(t as u64));
                    let (mut local_hits, mut local_torn) = (0, 0);
                    for _ in 0..workload.ops_per_thread {
                        let key = rng.gen_range(1..=workload.key_space);
                        cache.set(key, key)?;
                        match cache.get(key) {
                            Some(value) if value == key => local_hits += 1,
                            Some(_) => local_torn += 1,
                            None => {}
                        }
                    }
                    hits.fetch_add(local_hits, Ordering::Relaxed);
                    torn.fetch_add(local_torn, Ordering::Relaxed);
                    debug!("Worker {} done", t);
                    Ok(())
                })
            })
            .collect();

        for (t, handle) in handles.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("worker {} panicked", t))?
                .with_context(|| format!("worker {} failed", t))?;
        }
        Ok(())
    })?;
    let elapsed = start.elapsed();

    let ops = (workload.threads * workload.ops_per_thread) as u64;
    Ok(Outcome {
        elapsed,
        sets: ops,
        gets: ops,
        hits: hits.into_inner(),
        torn: torn.into_inner(),
    })
}
