//! Least Recently Used (LRU) Cache Implementation
//!
//! The LRU cache keeps entries in order of last access and evicts the least
//! recently used entry when a new key arrives at a full cache. Both a `get`
//! hit and a `put` (new key or overwrite) count as an access.
//!
//! # Algorithm
//!
//! ```text
//!   first (MRU)                                   last (LRU)
//!      │                                              │
//!      ▼                                              ▼
//!   [key_7] ◄──► [key_3] ◄──► [key_9] ◄──► ... ◄──► [key_1]  ──► evicted next
//! ```
//!
//! A hash map from key to list handle gives O(1) lookup; promotion is an O(1)
//! unlink and relink at the front.
//!
//! # Performance Characteristics
//!
//! - Get: O(1) (mutates order)
//! - Put: O(1)
//! - Remove: O(1)
//! - Contains: O(1), never mutates order
//!
//! # Thread Safety
//!
//! Since `get` is a write to the recency list, [`LruCache`] guards every
//! method with one `parking_lot::Mutex` per instance. Separate instances do
//! not contend.

use crate::config::{self, LruCacheConfig};
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

/// Internal LRU segment containing the actual cache algorithm.
pub(crate) struct LruSegment<K, V, S = DefaultHashBuilder> {
    config: LruCacheConfig,
    list: List<(K, V)>,
    map: HashMap<K, NodeId, S>,
    metrics: CoreCacheMetrics,
}

impl<K: Hash + Eq, V, S: BuildHasher> LruSegment<K, V, S> {
    pub(crate) fn with_hasher(config: LruCacheConfig, hash_builder: S) -> Self {
        let cap = config.capacity.get();
        LruSegment {
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

    /// Returns the value for `key` and moves it to the MRU position.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(&id) = self.map.get(key) else {
            self.metrics.record_miss();
            return None;
        };
        self.metrics.record_hit();
        self.list.move_to_first(id);
        self.list.get(id).map(|(_, v)| v)
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
            self.list.move_to_first(id);
            return self
                .list
                .get_mut(id)
                .map(|(_, slot)| core::mem::replace(slot, value));
        }

        if self.map.len() >= self.config.capacity.get() {
            self.evict();
        }

        let id = self.list.push_first((key.clone(), value));
        self.map.insert(key, id);
        self.metrics.record_insertion();
        None
    }

    /// Drops the least recently used entry.
    fn evict(&mut self) {
        if let Some((old_key, _)) = self.list.remove_last() {
            self.map.remove(&old_key);
            self.metrics.record_eviction();
            tracing::trace!(policy = "lru", len = self.map.len(), "evicted least recently used entry");
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

    /// Keys from most to least recently used.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.list.iter().map(|(k, _)| k)
    }
}

impl<K, V, S> core::fmt::Debug for LruSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruSegment")
            .field("capacity", &self.config.capacity)
            .field("len", &self.list.len())
            .finish()
    }
}

/// A bounded cache that evicts the least recently used entry.
///
/// # Examples
///
/// ```
/// use cache_space::LruCache;
/// use core::num::NonZeroUsize;
///
/// let cache = LruCache::new(NonZeroUsize::new(2).unwrap());
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");      // "a" becomes most recently used
/// cache.put("c", 3);    // "b" evicted (least recently used)
/// assert!(cache.get(&"b").is_none());
/// assert_eq!(cache.keys(), vec!["c", "a"]);
/// ```
#[derive(Debug)]
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<LruSegment<K, V, S>>,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Creates an LRU cache from a configuration with an optional hasher.
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        LruCache::with_hasher(config, hasher.unwrap_or_default())
    }

    /// Creates an LRU cache holding at most `cap` entries.
    pub fn new(cap: NonZeroUsize) -> Self {
        LruCache::init(LruCacheConfig { capacity: cap }, None)
    }

    /// Creates an LRU cache, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self> {
        Ok(LruCache::new(config::checked_capacity(capacity)?))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Creates an LRU cache with a custom hash builder.
    pub fn with_hasher(config: LruCacheConfig, hash_builder: S) -> Self {
        Self {
            segment: Mutex::new(LruSegment::with_hasher(config, hash_builder)),
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

    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Applies `f` to the value for `key` while the lock is held. Counts as an
    /// access.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Returns `true` if `key` is present, without touching recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Inserts or overwrites `key` as the most recently used entry, returning
    /// the previous value.
    pub fn put(&self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        self.segment.lock().put(key, value)
    }

    /// Stores `value` if `key` is absent; otherwise returns the current value.
    /// Either way `key` ends up most recently used.
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

    /// Snapshot of the keys from most to least recently used.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.segment.lock().keys().cloned().collect()
    }
}

impl<K, V, S> Cache<K, V> for LruCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
    S: BuildHasher + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        LruCache::get(self, key)
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        LruCache::put(self, key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        LruCache::contains_key(self, key)
    }

    fn remove(&self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn clear(&self) {
        LruCache::clear(self)
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.cap().get())
    }

    fn put_if_absent(&self, key: K, value: V) -> Option<V> {
        LruCache::put_if_absent(self, key, value)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LruCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}
