//! LFU Cache Metrics
//!
//! Adds frequency bookkeeping on top of [`CoreCacheMetrics`].

use super::CoreCacheMetrics;
use std::collections::BTreeMap;

/// LFU-specific metrics (extends CoreCacheMetrics)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LfuCacheMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Total number of promotions (every hit or overwrite bumps a frequency)
    pub total_frequency_increments: u64,

    /// Highest frequency any entry has reached since the last clear
    pub max_frequency: u64,
}

impl LfuCacheMetrics {
    /// Creates zeroed LFU metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry moving from one frequency to the next.
    pub fn record_frequency_increment(&mut self, new_frequency: u64) {
        self.total_frequency_increments += 1;
        self.max_frequency = self.max_frequency.max(new_frequency);
    }

    /// Resets the frequency high-water mark after the cache is cleared.
    pub fn reset_frequencies(&mut self) {
        self.max_frequency = 0;
    }

    /// Builds the report. `min_frequency` and `frequency_buckets` describe the
    /// live bucket chain and are supplied by the cache.
    pub fn to_btreemap(&self, min_frequency: u64, frequency_buckets: usize) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert(
            "frequency_buckets".to_string(),
            frequency_buckets as f64,
        );
        metrics.insert("max_frequency".to_string(), self.max_frequency as f64);
        metrics.insert("min_frequency".to_string(), min_frequency as f64);
        metrics.insert(
            "total_frequency_increments".to_string(),
            self.total_frequency_increments as f64,
        );
        metrics
    }
}
