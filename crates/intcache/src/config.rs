//! Cache construction settings

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::recency::WAYS;

/// Largest accepted bucket exponent.
///
/// Buckets are selected with `key & (N - 1)`, so a `u32` key never reaches
/// more than `2^32` buckets.
pub const MAX_SIZE_EXPONENT: u8 = 32;

/// How a bucket's recency register is updated on access
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyMode {
    /// Plain load, modify, store. Concurrent touches of one bucket may lose
    /// an update.
    #[default]
    BestEffort,
    /// Compare-and-swap retry loop. Concurrent touches never lose an update.
    Strict,
}

/// Configuration for [`IntCache`](crate::IntCache)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// The table holds `2^size_exponent` buckets
    pub size_exponent: u8,
    /// Register update strategy
    pub recency: RecencyMode,
    /// Count hits, misses, inserts, updates and evictions
    pub track_stats: bool,
}

impl CacheConfig {
    /// Default settings for a table of `2^size_exponent` buckets
    pub fn new(size_exponent: u8) -> Self {
        Self {
            size_exponent,
            recency: RecencyMode::default(),
            track_stats: false,
        }
    }

    /// Set the recency update strategy
    pub fn recency(mut self, mode: RecencyMode) -> Self {
        self.recency = mode;
        self
    }

    /// Enable or disable statistics
    pub fn track_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }

    /// Number of buckets, checked against the key width and the target's
    /// address space.
    pub fn bucket_count(&self) -> Result<usize> {
        let max = max_size_exponent();
        if self.size_exponent > max {
            return Err(Error::SizeExponentTooLarge {
                exponent: self.size_exponent,
                max,
            });
        }
        Ok(1usize << self.size_exponent)
    }

    /// Check the configuration without allocating
    pub fn validate(&self) -> Result<()> {
        self.bucket_count().map(|_| ())
    }
}

/// Largest exponent usable on this target: bounded by the key width and by
/// `usize` having to index every slot.
fn max_size_exponent() -> u8 {
    // WAYS = 2^3 slots per bucket
    let addressable = usize::BITS - WAYS.trailing_zeros() - 1;
    MAX_SIZE_EXPONENT.min(addressable as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::new(4);
        assert_eq!(config.size_exponent, 4);
        assert_eq!(config.recency, RecencyMode::BestEffort);
        assert!(!config.track_stats);
        assert_eq!(config.bucket_count(), Ok(16));
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new(0)
            .recency(RecencyMode::Strict)
            .track_stats(true);
        assert_eq!(config.recency, RecencyMode::Strict);
        assert!(config.track_stats);
        assert_eq!(config.bucket_count(), Ok(1));
    }

    #[test]
    fn test_rejects_oversized_exponent() {
        let err = CacheConfig::new(33).validate().unwrap_err();
        assert!(matches!(err, Error::SizeExponentTooLarge { exponent: 33, .. }));
        assert!(CacheConfig::new(u8::MAX).validate().is_err());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_max_exponent_on_64_bit() {
        assert_eq!(max_size_exponent(), MAX_SIZE_EXPONENT);
        assert!(CacheConfig::new(MAX_SIZE_EXPONENT).validate().is_ok());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = CacheConfig::new(10).recency(RecencyMode::Strict);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"size_exponent":10,"recency":"strict","track_stats":false}"#
        );
        let back: CacheConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
