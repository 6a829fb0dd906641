//! # intcache
//!
//! Fixed-capacity concurrent cache specialized for `u32` keys and `u32` values.
//!
//! ## Architecture
//! - **Bucket table**: `2^b` buckets of 8 slots, chosen by `key & (2^b - 1)`
//! - **Slot codec**: key and value packed into one `AtomicU64`, `0` = empty
//! - **Recency register**: one `u32` per bucket, eight 4-bit LRU ranks
//!
//! No locks anywhere: each step is a single atomic load or store. Recency is
//! exact when single-threaded and best-effort under contention.
//!
//! ```
//! use intcache::IntCache;
//!
//! let cache = IntCache::new(4)?;
//! cache.set(7, 70)?;
//! assert_eq!(cache.get(7), Some(70));
//! assert_eq!(cache.get(8), None);
//! # Ok::<(), intcache::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
pub mod recency;
pub mod slot;
mod stats;

pub use cache::IntCache;
pub use config::{CacheConfig, RecencyMode, MAX_SIZE_EXPONENT};
pub use error::{Error, Result};
pub use recency::{Register, WAYS};
pub use stats::{CacheStats, StatsSnapshot};
