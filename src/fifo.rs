//! First In, First Out (FIFO) Cache Implementation
//!
//! Entries are kept in insertion order. When a new key arrives at a full
//! cache, the entry that was inserted first is evicted, no matter how often it
//! has been read since. Reads never reorder anything, and overwriting an
//! existing key keeps its original position.
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Get/Put/Remove | O(1) |
//! | Contains | O(1), no side effects |
//!
//! # Thread Safety
//!
//! [`FifoCache`] serializes every call through one `parking_lot::Mutex`.
//! Different cache instances never contend with each other.

use crate::config::{self, FifoCacheConfig};
use crate::error::Result;
use crate::list::{List, NodeId};
use crate::metrics::{CacheMetrics, CoreCacheMetrics};
use crate::traits::Cache;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Internal FIFO segment containing the eviction algorithm.
///
/// The list runs from oldest (first) to newest (last) insertion; the map
/// indexes every node by key.
pub(crate) struct FifoSegment<K, V, S = DefaultHashBuilder> {
    config: FifoCacheConfig,
    list: List<(K, V)>,
    map: HashMap<K, NodeId, S>,
    metrics: CoreCacheMetrics,
}

impl<K: Hash + Eq, V, S: BuildHasher> FifoSegment<K, V, S> {
    pub(crate) fn with_hasher(config: FifoCacheConfig, hash_builder: S) -> Self {
        let cap = config.capacity.get();
        FifoSegment {
            config,
            list: List::with_capacity(cap),
            map: HashMap::with_capacity_and_hasher(cap, hash_builder),
            metrics: CoreCacheMetrics::new(),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &CoreCacheMetrics {
        &self.metrics
    }

    /// Looks up `key`. Order is untouched; only the hit/miss counters move.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.map.get(key) {
            Some(&id) => {
                self.metrics.record_hit();
                self.list.get(id).map(|(_, v)| v)
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    pub(crate) fn put(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        if let Some(&id) = self.map.get(&key) {
            self.metrics.record_update();
            return self
                .list
                .get_mut(id)
                .map(|(_, slot)| core::mem::replace(slot, value));
        }

        if self.map.len() >= self.config.capacity.get() {
            self.evict();
        }

        let id = self.list.push_last((key.clone(), value));
        self.map.insert(key, id);
        self.metrics.record_insertion();
        None
    }

    /// Drops the oldest inserted entry.
    fn evict(&mut self) {
        if let Some((old_key, _)) = self.list.remove_first() {
            self.map.remove(&old_key);
            self.metrics.record_eviction();
            tracing::trace!(policy = "fifo", len = self.map.len(), "evicted oldest entry");
        }
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.remove(key)?;
        let (_, value) = self.list.remove(id)?;
        self.metrics.record_removal();
        Some(value)
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }

    /// Keys from oldest to newest insertion.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().map(|(k, _)| k)
    }
}

impl<K, V, S> core::fmt::Debug for FifoSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FifoSegment")
            .field("capacity", &self.config.capacity)
            .field("len", &self.list.len())
            .finish()
    }
}

/// A bounded cache that evicts in insertion order.
///
/// # Examples
///
/// ```
/// use cache_space::FifoCache;
///
/// let cache = FifoCache::try_new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// assert_eq!(cache.get(&"a"), Some(1)); // reading does not protect "a"
/// cache.put("c", 3);
/// assert!(!cache.contains_key(&"a"));
/// assert_eq!(cache.keys(), vec!["b", "c"]);
/// ```
#[derive(Debug)]
pub struct FifoCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<FifoSegment<K, V, S>>,
}

impl<K: Hash + Eq, V> FifoCache<K, V> {
    /// Creates a FIFO cache from a configuration with an optional hasher.
    pub fn init(config: FifoCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        FifoCache::with_hasher(config, hasher.unwrap_or_default())
    }

    /// Creates a FIFO cache holding at most `cap` entries.
    pub fn new(cap: NonZeroUsize) -> Self {
        FifoCache::init(FifoCacheConfig { capacity: cap }, None)
    }

    /// Creates a FIFO cache, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self> {
        Ok(FifoCache::new(config::checked_capacity(capacity)?))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> FifoCache<K, V, S> {
    /// Creates a FIFO cache with a custom hash builder.
    pub fn with_hasher(config: FifoCacheConfig, hash_builder: S) -> Self {
        Self {
            segment: Mutex::new(FifoSegment::with_hasher(config, hash_builder)),
        }
    }

    /// Returns the maximum number of entries.
    pub fn cap(&self) -> NonZeroUsize {
        self.segment.lock().cap()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a clone of the value for `key`. Insertion order is unaffected.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Applies `f` to the value for `key` while the lock is held.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Inserts or overwrites `key`, returning the previous value.
    ///
    /// A new key arriving at a full cache evicts the oldest inserted entry.
    pub fn put(&self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        self.segment.lock().put(key, value)
    }

    /// Stores `value` if `key` is absent; otherwise returns the current value.
    pub fn put_if_absent(&self, key: K, value: V) -> Option<V>
    where
        K: Clone,
        V: Clone,
    {
        let mut segment = self.segment.lock();
        if let Some(current) = segment.get(&key) {
            return Some(current.clone());
        }
        segment.put(key, value)
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().remove(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.segment.lock().clear();
    }

    /// Snapshot of the keys from oldest to newest insertion.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.segment.lock().keys().cloned().collect()
    }
}

impl<K, V, S> Cache<K, V> for FifoCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
    S: BuildHasher + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        FifoCache::get(self, key)
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        FifoCache::put(self, key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        FifoCache::contains_key(self, key)
    }

    fn remove(&self, key: &K) -> Option<V> {
        FifoCache::remove(self, key)
    }

    fn len(&self) -> usize {
        FifoCache::len(self)
    }

    fn clear(&self) {
        FifoCache::clear(self)
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.cap().get())
    }

    fn put_if_absent(&self, key: K, value: V) -> Option<V> {
        FifoCache::put_if_absent(self, key, value)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for FifoCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "FIFO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_fifo<K: Hash + Eq, V>(cap: usize) -> FifoCache<K, V> {
        FifoCache::try_new(cap).unwrap()
    }

    #[test]
    fn test_fifo_scenario_reads_do_not_protect() {
        let cache = make_fifo(3);
        cache.put(1, "111");
        cache.put(2, "222");
        cache.put(3, "333");

        for _ in 0..3 {
            assert_eq!(cache.get(&1), Some("111"));
        }
        for _ in 0..2 {
            assert_eq!(cache.get(&2), Some("222"));
        }
        assert_eq!(cache.get(&3), Some("333"));

        cache.put(4, "444");
        assert!(!cache.contains_key(&1));
        assert_eq!(cache.keys(), vec![2, 3, 4]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_fifo_overwrite_keeps_position() {
        let cache = make_fifo(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.put("a", 10), Some(1));
        cache.put("c", 3);
        // "a" was still the oldest insertion
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.keys(), vec!["b", "c"]);
    }

    #[test]
    fn test_fifo_remove_and_clear() {
        let cache = make_fifo(3);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.remove(&"a"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&"b"), None);
        cache.put("c", 3);
        assert_eq!(cache.keys(), vec!["c"]);
    }

    #[test]
    fn test_fifo_put_if_absent() {
        let cache = make_fifo(2);
        assert_eq!(cache.put_if_absent("a", 1), None);
        assert_eq!(cache.put_if_absent("a", 2), Some(1));
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn test_fifo_borrowed_lookup_and_get_with() {
        let cache: FifoCache<String, Vec<u8>> = make_fifo(2);
        cache.put("blob".to_string(), vec![1, 2, 3]);
        assert_eq!(cache.get_with("blob", |v| v.len()), Some(3));
        assert!(cache.contains_key("blob"));
    }

    #[test]
    fn test_fifo_metrics() {
        let cache = make_fifo(1);
        cache.put(1, 1);
        cache.get(&1);
        cache.get(&2);
        cache.put(2, 2);

        let metrics = cache.metrics();
        assert_eq!(metrics["requests"], 2.0);
        assert_eq!(metrics["cache_hits"], 1.0);
        assert_eq!(metrics["evictions"], 1.0);
        assert_eq!(cache.algorithm_name(), "FIFO");
    }

    #[test]
    fn test_fifo_rejects_zero_capacity() {
        assert!(FifoCache::<u8, u8>::try_new(0).is_err());
    }

    #[test]
    fn test_fifo_segment_directly() {
        let mut segment: FifoSegment<&str, i32, DefaultHashBuilder> = FifoSegment::with_hasher(
            FifoCacheConfig {
                capacity: NonZeroUsize::new(2).unwrap(),
            },
            DefaultHashBuilder::default(),
        );
        segment.put("a", 1);
        segment.put("b", 2);
        segment.put("c", 3);
        assert_eq!(segment.len(), 2);
        assert_eq!(segment.cap().get(), 2);
        assert_eq!(segment.keys().copied().collect::<Vec<_>>(), vec!["b", "c"]);
        segment.list.debug_validate_invariants();
    }
}
