//! Run summary in text or JSON form

use intcache::{CacheConfig, StatsSnapshot};
use serde::Serialize;

use crate::workload::Outcome;

/// Everything printed after a run
#[derive(Debug, Serialize)]
pub struct Report {
    pub config: CacheConfig,
    pub threads: usize,
    pub ops_per_thread: usize,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
    pub hits: u64,
    pub torn: u64,
    pub occupied: usize,
    pub capacity: usize,
    pub stats: Option<StatsSnapshot>,
}

impl Report {
    pub fn new(
        config: CacheConfig,
        threads: usize,
        ops_per_thread: usize,
        outcome: &Outcome,
        occupied: usize,
        capacity: usize,
        stats: Option<StatsSnapshot>,
    ) -> Self {
        let secs = outcome.elapsed.as_secs_f64();
        let total_ops = (outcome.sets + outcome.gets) as f64;
        Self {
            config,
            threads,
            ops_per_thread,
            elapsed_ms: secs * 1000.0,
            ops_per_sec: if secs > 0.0 { total_ops / secs } else { 0.0 },
            hits: outcome.hits,
            torn: outcome.torn,
            occupied,
            capacity,
            stats,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "buckets: 2^{} x 8 ways ({} slots), recency {:?}\n",
            self.config.size_exponent, self.capacity, self.config.recency
        ));
        out.push_str(&format!(
            "threads: {}, ops/thread: {}\n",
            self.threads, self.ops_per_thread
        ));
        out.push_str(&format!(
            "elapsed: {:.2} ms, throughput: {:.0} ops/sec\n",
            self.elapsed_ms, self.ops_per_sec
        ));
        out.push_str(&format!(
            "read-after-write hits: {}, torn: {}\n",
            self.hits, self.torn
        ));
        out.push_str(&format!("occupied: {}/{}\n", self.occupied, self.capacity));
        if let Some(stats) = &self.stats {
            out.push_str(&format!(
                "stats: hits {} misses {} inserts {} updates {} evictions {} (hit ratio {:.3})\n",
                stats.hits,
                stats.misses,
                stats.inserts,
                stats.updates,
                stats.evictions,
                stats.hit_ratio
            ));
        }
        out
    }
}
