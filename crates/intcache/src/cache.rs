//! IntCache: lock-free set-associative LRU cache for `u32 -> u32`

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::config::{CacheConfig, RecencyMode};
use crate::error::{Error, Result};
use crate::recency::{Register, WAYS};
use crate::slot;
use crate::stats::CacheStats;

/// One set of the table, sized and aligned to a cache line
#[derive(Default)]
#[repr(align(64))]
struct Bucket([AtomicU64; WAYS]);

/// Fixed-capacity concurrent cache mapping `u32` keys to `u32` values.
///
/// The table holds `2^b` buckets of eight slots each. A key can only live in
/// bucket `key & (2^b - 1)`; when all eight slots of that bucket hold other
/// keys, inserting evicts the least recently used one.
///
/// Every slot access is a single atomic load or store of one packed word, so
/// readers never see a key paired with another write's value. The recency
/// bookkeeping is best-effort under contention unless
/// [`RecencyMode::Strict`] is configured, and two concurrent inserts into the
/// same full bucket may pick the same victim, dropping one of them.
pub struct IntCache {
    buckets: Box<[Bucket]>,
    registers: Box<[AtomicU32]>,
    mask: u32,
    size_exponent: u8,
    recency: RecencyMode,
    stats: Option<CacheStats>,
}

impl IntCache {
    /// Create a cache with `2^size_exponent` buckets and default settings
    ///
    /// # Returns
    /// * `Result<IntCache>` - Empty cache, or `SizeExponentTooLarge`
    pub fn new(size_exponent: u8) -> Result<Self> {
        Self::with_config(CacheConfig::new(size_exponent))
    }

    /// Create a cache from a full configuration
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        let bucket_count = config.bucket_count()?;

        let buckets = (0..bucket_count).map(|_| Bucket::default()).collect();
        let registers = (0..bucket_count).map(|_| AtomicU32::new(0)).collect();

        debug!(
            "Allocated {} buckets x {} ways ({} slots), recency {:?}",
            bucket_count,
            WAYS,
            bucket_count * WAYS,
            config.recency
        );

        Ok(Self {
            buckets,
            registers,
            mask: ((1u64 << config.size_exponent) - 1) as u32,
            size_exponent: config.size_exponent,
            recency: config.recency,
            stats: config.track_stats.then(CacheStats::new),
        })
    }

    /// Look up `key`, marking its slot most recently used on a hit
    ///
    /// # Returns
    /// * `Option<u32>` - Last value stored for `key`, if still cached
    pub fn get(&self, key: u32) -> Option<u32> {
        let bucket = self.bucket_index(key);
        let found = self.find(bucket, key);

        if let Some((slot, value)) = found {
            self.touch(bucket, slot);
            self.record(CacheStats::record_hit);
            Some(value)
        } else {
            self.record(CacheStats::record_miss);
            None
        }
    }

    /// Check for `key` without updating recency or statistics
    pub fn contains(&self, key: u32) -> bool {
        self.find(self.bucket_index(key), key).is_some()
    }

    /// Store `value` under `key`
    ///
    /// Overwrites the key's slot if present, otherwise fills the first free
    /// slot of its bucket, otherwise evicts the bucket's least recently used
    /// entry. Eviction is silent.
    ///
    /// # Returns
    /// * `Result<()>` - `InvalidEntry` for the reserved pair `(0, 0)`
    pub fn set(&self, key: u32, value: u32) -> Result<()> {
        if key == 0 && value == 0 {
            return Err(Error::InvalidEntry);
        }

        let bucket = self.bucket_index(key);
        let slots = &self.buckets[bucket].0;
        let word = slot::pack(key, value);

        for (i, cell) in slots.iter().enumerate() {
            let current = cell.load(Ordering::Acquire);
            if slot::is_empty(current) {
                cell.store(word, Ordering::Release);
                self.touch(bucket, i);
                self.record(CacheStats::record_insert);
                return Ok(());
            }
            if slot::key(current) == key {
                cell.store(word, Ordering::Release);
                self.touch(bucket, i);
                self.record(CacheStats::record_update);
                return Ok(());
            }
        }

        let victim = self.register(bucket).victim();
        let evicted = slots[victim].swap(word, Ordering::AcqRel);
        self.touch(bucket, victim);
        self.record(CacheStats::record_eviction);

        trace!(
            "Evicted key {} from bucket {} slot {} for key {}",
            slot::key(evicted),
            bucket,
            victim,
            key
        );
        Ok(())
    }

    /// Mark `slot` of `bucket` as most recently used
    ///
    /// # Panics
    /// Panics if `bucket >= bucket_count()` or `slot >= ways()`.
    pub fn touch(&self, bucket: usize, slot: usize) {
        assert!(slot < WAYS, "slot index {} out of range", slot);
        let cell = &self.registers[bucket];

        match self.recency {
            RecencyMode::BestEffort => {
                let reg = Register::from_bits(cell.load(Ordering::Acquire));
                cell.store(reg.touch(slot).bits(), Ordering::Release);
            }
            RecencyMode::Strict => {
                // Closure never returns None, so this cannot fail
                let _ = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                    Some(Register::from_bits(bits).touch(slot).bits())
                });
            }
        }
    }

    /// Current recency register of `bucket`
    ///
    /// # Panics
    /// Panics if `bucket >= bucket_count()`.
    pub fn register(&self, bucket: usize) -> Register {
        Register::from_bits(self.registers[bucket].load(Ordering::Acquire))
    }

    /// Key held by the most recently used slot of `bucket`, if occupied
    pub fn most_recent_in_bucket(&self, bucket: usize) -> Option<u32> {
        let top = self.register(bucket).most_recent();
        let word = self.buckets[bucket].0[top].load(Ordering::Acquire);
        (!slot::is_empty(word)).then(|| slot::key(word))
    }

    /// Bucket a key maps to
    #[inline]
    pub fn bucket_index(&self, key: u32) -> usize {
        (key & self.mask) as usize
    }

    /// Number of buckets (`2^size_exponent`)
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Slots per bucket
    pub const fn ways(&self) -> usize {
        WAYS
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.bucket_count() * WAYS
    }

    /// Exponent the cache was built with
    pub fn size_exponent(&self) -> u8 {
        self.size_exponent
    }

    /// Recency update strategy
    pub fn recency_mode(&self) -> RecencyMode {
        self.recency
    }

    /// Number of occupied slots.
    ///
    /// Scans the whole table; under concurrent writes the count is only a
    /// snapshot.
    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.0.iter())
            .filter(|cell| !slot::is_empty(cell.load(Ordering::Relaxed)))
            .count()
    }

    /// Check if no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.buckets
            .iter()
            .all(|bucket| slot::is_empty(bucket.0[0].load(Ordering::Relaxed)))
    }

    /// Drop every entry and reset recency and statistics
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            for cell in bucket.0.iter_mut() {
                *cell.get_mut() = slot::EMPTY;
            }
        }
        for reg in self.registers.iter_mut() {
            *reg.get_mut() = 0;
        }
        if let Some(stats) = &self.stats {
            stats.reset();
        }
    }

    /// Get cache statistics, if enabled
    pub fn stats(&self) -> Option<&CacheStats> {
        self.stats.as_ref()
    }

    /// Scan `bucket` for `key`. Stops at the first empty slot: occupied
    /// slots are packed from index 0 because nothing ever clears a single
    /// slot.
    fn find(&self, bucket: usize, key: u32) -> Option<(usize, u32)> {
        for (i, cell) in self.buckets[bucket].0.iter().enumerate() {
            let word = cell.load(Ordering::Acquire);
            if slot::is_empty(word) {
                return None;
            }
            if slot::key(word) == key {
                return Some((i, slot::value(word)));
            }
        }
        None
    }

    #[inline]
    fn record(&self, event: fn(&CacheStats)) {
        if let Some(stats) = &self.stats {
            event(stats);
        }
    }
}

impl fmt::Debug for IntCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntCache")
            .field("size_exponent", &self.size_exponent)
            .field("bucket_count", &self.bucket_count())
            .field("ways", &WAYS)
            .field("recency", &self.recency)
            .field("stats", &self.stats.as_ref().map(CacheStats::snapshot))
            .finish()
    }
}
