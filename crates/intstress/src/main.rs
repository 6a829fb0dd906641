//! intstress - concurrent load driver for intcache

mod report;
mod workload;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use intcache::{CacheConfig, IntCache, RecencyMode};
use tracing::{info, warn};

use crate::report::Report;
use crate::workload::Workload;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Recency {
    BestEffort,
    Strict,
}

impl From<Recency> for RecencyMode {
    fn from(value: Recency) -> Self {
        match value {
            Recency::BestEffort => RecencyMode::BestEffort,
            Recency::Strict => RecencyMode::Strict,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Table holds 2^size buckets of 8 slots
    #[arg(short, long, default_value_t = 21)]
    size: u8,

    /// Worker threads
    #[arg(short, long, default_value_t = 1000)]
    threads: usize,

    /// set+get pairs per thread
    #[arg(short, long, default_value_t = 300)]
    ops: usize,

    /// Keys drawn from 1..=key_space
    #[arg(short, long, default_value_t = u32::MAX)]
    key_space: u32,

    /// Recency register update strategy
    #[arg(short, long, value_enum, default_value_t = Recency::BestEffort)]
    recency: Recency,

    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Collect hit/miss/eviction counters
    #[arg(long)]
    stats: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = CacheConfig::new(args.size)
        .recency(args.recency.into())
        .track_stats(args.stats);
    let cache = IntCache::with_config(config).context("Failed to allocate cache")?;
    info!(
        "Cache ready: {} buckets, {} slots",
        cache.bucket_count(),
        cache.capacity()
    );

    let workload = Workload {
        threads: args.threads,
        ops_per_thread: args.ops,
        key_space: args.key_space,
        seed: args.seed,
    };
    let outcome = workload::run(&cache, &workload)?;

    if outcome.torn > 0 {
        warn!("Observed {} torn reads", outcome.torn);
    }

    let report = Report::new(
        config,
        args.threads,
        args.ops,
        &outcome,
        cache.len(),
        cache.capacity(),
        cache.stats().map(|s| s.snapshot()),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }

    if outcome.torn > 0 {
        anyhow::bail!("{} torn reads", outcome.torn);
    }
    Ok(())
}
