//! Cache Metrics System
//!
//! Counters maintained by the bounded policies (FIFO, LRU, LFU) and a common
//! [`CacheMetrics`] reporting trait. Reports are `BTreeMap`s so metric names
//! always come out in the same order, which keeps test assertions and log
//! lines stable.

use std::collections::BTreeMap;

pub mod lfu;

pub use lfu::LfuCacheMetrics;

/// Common metrics tracked by every bounded cache policy
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Total number of `get` calls
    pub requests: u64,

    /// Number of `get` calls that found the key
    pub cache_hits: u64,

    /// Number of new keys stored
    pub insertions: u64,

    /// Number of `put` calls that overwrote an existing key
    pub updates: u64,

    /// Number of entries dropped to stay within capacity
    pub evictions: u64,

    /// Number of entries removed explicitly through `remove`
    pub removals: u64,
}

impl CoreCacheMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that missed. Misses are `requests - cache_hits`.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a new key being stored.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records an existing key's value being replaced.
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records a capacity-driven eviction.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records an explicit removal.
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Fraction of lookups that hit, between 0.0 and 1.0; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, between 0.0 and 1.0; 0.0 before any lookup.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters into a report with deterministic key ordering.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics
    }
}

/// Uniform metrics reporting for cache implementations.
pub trait CacheMetrics {
    /// Returns every metric as name/value pairs, sorted by name.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short policy name, e.g. `"LRU"`.
    fn algorithm_name(&self) -> &'static str;
}
