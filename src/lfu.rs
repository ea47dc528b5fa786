//! Least Frequently Used Cache Implementation.
//!
//! The LFU (Least Frequently Used) cache evicts the entry with the lowest
//! access count when a new key arrives at a full cache. Among entries sharing
//! the lowest count, the one that reached that count first goes first.
//!
//! Every operation is O(1), independent of the number of entries and of the
//! number of distinct frequencies.
//!
//! # Algorithm
//!
//! Entries are grouped into frequency buckets. Buckets form a chain sorted by
//! strictly increasing frequency and only exist while they hold at least one
//! entry, so the head of the chain is always the eviction candidate's bucket.
//!
//! ```text
//!   chain:  [freq 1] ◄──► [freq 2] ◄──► [freq 5]
//!              │             │             │
//!              ▼             ▼             ▼
//!           C ◄─► D          A             B
//!           ▲
//!           └── evicted next (front of the lowest bucket)
//! ```
//!
//! A hit on an entry at frequency `f` moves it to the back of bucket `f + 1`,
//! creating that bucket right after `f` when missing, and deletes bucket `f`
//! when it becomes empty. New entries join the back of bucket 1.
//!
//! All entry nodes share one arena; each bucket is only a list header over it,
//! so moving an entry between buckets never allocates.
//!
//! # Thread Safety
//!
//! `get` changes frequencies, so [`LfuCache`] guards every method with one
//! `parking_lot::Mutex`.

use crate::config::{self, LfuCacheConfig};
use crate::error::Result;
use crate::list::{LinkedList, NodeArena, NodeId};
use crate::metrics::{CacheMetrics, LfuCacheMetrics};
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

/// Handle to a bucket in the bucket arena.
type BucketId = NodeId;

/// All entries that currently share one access count, oldest arrival first.
#[derive(Debug)]
struct FrequencyBucket {
    frequency: u64,
    entries: LinkedList,
}

impl FrequencyBucket {
    fn new(frequency: u64) -> Self {
        Self {
            frequency,
            entries: LinkedList::new(),
        }
    }
}

/// Internal LFU segment containing the actual cache algorithm.
pub(crate) struct LfuSegment<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,

    /// Entry nodes `(key, value, frequency)` for every bucket.
    nodes: NodeArena<(K, V, u64)>,

    buckets: NodeArena<FrequencyBucket>,

    /// Non-empty buckets in increasing frequency; the head has the minimum.
    chain: LinkedList,

    freq_map: HashMap<u64, BucketId>,

    index: HashMap<K, NodeId, S>,

    metrics: LfuCacheMetrics,
}

impl<K: Hash + Eq, V, S: BuildHasher> LfuSegment<K, V, S> {
    pub(crate) fn with_hasher(config: LfuCacheConfig, hash_builder: S) -> Self {
        let cap = config.capacity.get();
        LfuSegment {
            config,
            nodes: NodeArena::with_capacity(cap),
            buckets: NodeArena::new(),
            chain: LinkedList::new(),
            freq_map: HashMap::default(),
            index: HashMap::with_capacity_and_hasher(cap, hash_builder),
            metrics: LfuCacheMetrics::new(),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.config.capacity
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &LfuCacheMetrics {
        &self.metrics
    }

    /// Lowest access count present, if any.
    pub(crate) fn min_frequency(&self) -> Option<u64> {
        self.chain
            .first()
            .and_then(|bucket| self.buckets.get(bucket))
            .map(|bucket| bucket.frequency)
    }

    /// Number of live frequency buckets.
    pub(crate) fn bucket_count(&self) -> usize {
        self.chain.len()
    }

    /// Unlinks entry `id` from `bucket_id`, dropping the bucket once empty.
    fn detach_entry(&mut self, bucket_id: BucketId, id: NodeId) {
        let Some(bucket) = self.buckets.get_mut(bucket_id) else {
            return;
        };
        bucket.entries.detach(&mut self.nodes, id);
        if bucket.entries.is_empty() {
            let frequency = bucket.frequency;
            self.chain.detach(&mut self.buckets, bucket_id);
            self.buckets.remove(bucket_id);
            self.freq_map.remove(&frequency);
        }
    }

    /// Moves entry `id` from frequency `f` to the back of bucket `f + 1`.
    fn promote(&mut self, id: NodeId) {
        let Some(frequency) = self.nodes.get(id).map(|&(_, _, f)| f) else {
            return;
        };
        let Some(&current) = self.freq_map.get(&frequency) else {
            return;
        };
        let next_frequency = frequency.saturating_add(1);

        // The new bucket is linked after `current` before `current` can be
        // dropped, which keeps the chain sorted.
        let target = match self.freq_map.get(&next_frequency) {
            Some(&bucket) => bucket,
            None => {
                let bucket = self.buckets.insert(FrequencyBucket::new(next_frequency));
                self.chain.attach_after(&mut self.buckets, current, bucket);
                self.freq_map.insert(next_frequency, bucket);
                bucket
            }
        };

        self.detach_entry(current, id);
        if let Some(bucket) = self.buckets.get_mut(target) {
            bucket.entries.attach_last(&mut self.nodes, id);
        }
        if let Some((_, _, f)) = self.nodes.get_mut(id) {
            *f = next_frequency;
        }
        self.metrics.record_frequency_increment(next_frequency);
    }

    /// Returns the value for `key` and bumps its frequency.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(&id) = self.index.get(key) else {
            self.metrics.core.record_miss();
            return None;
        };
        self.metrics.core.record_hit();
        self.promote(id);
        self.nodes.get(id).map(|(_, v, _)| v)
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.index.contains_key(key)
    }

    /// Reads the access count of `key` without bumping it.
    pub(crate) fn frequency_of<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let &id = self.index.get(key)?;
        self.nodes.get(id).map(|&(_, _, f)| f)
    }

    pub(crate) fn put(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        if let Some(&id) = self.index.get(&key) {
            self.metrics.core.record_update();
            let old = self
                .nodes
                .get_mut(id)
                .map(|(_, slot, _)| core::mem::replace(slot, value));
            self.promote(id);
            return old;
        }

        if self.index.len() >= self.config.capacity.get() {
            self.evict();
        }

        let bucket_id = match self.freq_map.get(&1) {
            Some(&bucket) => bucket,
            None => {
                let bucket = self.buckets.insert(FrequencyBucket::new(1));
                self.chain.attach_first(&mut self.buckets, bucket);
                self.freq_map.insert(1, bucket);
                bucket
            }
        };
        let id = self.nodes.insert((key.clone(), value, 1));
        if let Some(bucket) = self.buckets.get_mut(bucket_id) {
            bucket.entries.attach_last(&mut self.nodes, id);
        }
        self.index.insert(key, id);
        self.metrics.core.record_insertion();
        None
    }

    /// Drops the oldest entry of the lowest-frequency bucket.
    fn evict(&mut self) {
        let Some(bucket_id) = self.chain.first() else {
            return;
        };
        let Some(id) = self
            .buckets
            .get(bucket_id)
            .and_then(|bucket| bucket.entries.first())
        else {
            return;
        };
        self.detach_entry(bucket_id, id);
        if let Some((key, _, frequency)) = self.nodes.remove(id) {
            self.index.remove(&key);
            self.metrics.core.record_eviction();
            tracing::trace!(
                policy = "lfu",
                frequency,
                len = self.index.len(),
                "evicted least frequently used entry"
            );
        }
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.index.remove(key)?;
        let frequency = self.nodes.get(id).map(|&(_, _, f)| f)?;
        if let Some(&bucket_id) = self.freq_map.get(&frequency) {
            self.detach_entry(bucket_id, id);
        }
        let (_, value, _) = self.nodes.remove(id)?;
        self.metrics.core.record_removal();
        Some(value)
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.freq_map.clear();
        self.nodes.clear();
        self.buckets.clear();
        self.chain.reset();
        self.metrics.reset_frequencies();
    }

    /// Keys in eviction order: lowest frequency first, oldest arrival first
    /// within a frequency.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.chain
            .ids(&self.buckets)
            .filter_map(|bucket| self.buckets.get(bucket))
            .flat_map(|bucket| bucket.entries.ids(&self.nodes))
            .filter_map(|id| self.nodes.get(id).map(|(k, _, _)| k))
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        self.chain.debug_validate_invariants(&self.buckets);
        assert_eq!(self.chain.len(), self.freq_map.len());

        let mut previous = 0u64;
        let mut total = 0usize;
        for bucket_id in self.chain.ids(&self.buckets) {
            let bucket = self.buckets.get(bucket_id).expect("bucket in chain");
            assert!(bucket.frequency > previous, "bucket chain out of order");
            previous = bucket.frequency;
            assert!(!bucket.entries.is_empty(), "empty bucket left in chain");
            assert_eq!(self.freq_map.get(&bucket.frequency), Some(&bucket_id));
            bucket.entries.debug_validate_invariants(&self.nodes);
            for id in bucket.entries.ids(&self.nodes) {
                let (key, _, frequency) = self.nodes.get(id).expect("entry node");
                assert_eq!(*frequency, bucket.frequency);
                assert_eq!(self.index.get(key), Some(&id));
            }
            total += bucket.entries.len();
        }
        assert_eq!(total, self.index.len());
        assert_eq!(self.nodes.len(), self.index.len());
        assert_eq!(self.buckets.len(), self.chain.len());
    }
}

impl<K, V, S> core::fmt::Debug for LfuSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LfuSegment")
            .field("capacity", &self.config.capacity)
            .field("len", &self.nodes.len())
            .field("buckets", &self.chain.len())
            .finish()
    }
}

/// A bounded cache that evicts the least frequently used entry.
///
/// # Examples
///
/// ```
/// use cache_space::LfuCache;
///
/// let cache = LfuCache::try_new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");      // "a" now has frequency 2
/// cache.put("c", 3);    // "b" (frequency 1) is evicted
///
/// assert!(!cache.contains_key(&"b"));
/// assert_eq!(cache.frequency_of(&"a"), Some(2));
/// assert_eq!(cache.frequency_of(&"c"), Some(1));
/// ```
#[derive(Debug)]
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<LfuSegment<K, V, S>>,
}

impl<K: Hash + Eq, V> LfuCache<K, V> {
    /// Creates an LFU cache from a configuration with an optional hasher.
    pub fn init(config: LfuCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        LfuCache::with_hasher(config, hasher.unwrap_or_default())
    }

    /// Creates an LFU cache holding at most `cap` entries.
    pub fn new(cap: NonZeroUsize) -> Self {
        LfuCache::init(LfuCacheConfig { capacity: cap }, None)
    }

    /// Creates an LFU cache, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self> {
        Ok(LfuCache::new(config::checked_capacity(capacity)?))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LfuCache<K, V, S> {
    /// Creates an LFU cache with a custom hash builder.
    pub fn with_hasher(config: LfuCacheConfig, hash_builder: S) -> Self {
        Self {
            segment: Mutex::new(LfuSegment::with_hasher(config, hash_builder)),
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

    /// Returns a clone of the value for `key` and bumps its frequency.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Applies `f` to the value for `key` while the lock is held. Bumps the
    /// frequency like [`get`](Self::get).
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Returns `true` if `key` is present, without bumping its frequency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Returns the access count of `key` without bumping it.
    pub fn frequency_of<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().frequency_of(key)
    }

    /// Inserts `key` at frequency 1, or overwrites it and bumps its frequency.
    /// Returns the previous value.
    pub fn put(&self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        self.segment.lock().put(key, value)
    }

    /// Stores `value` if `key` is absent; otherwise returns the current value
    /// and bumps its frequency.
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

    /// Removes every entry and every frequency bucket.
    pub fn clear(&self) {
        self.segment.lock().clear();
    }

    /// Snapshot of the keys in eviction order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.segment.lock().keys().cloned().collect()
    }
}

impl<K, V, S> Cache<K, V> for LfuCache<K, V, S>
where
    K: Hash + Eq + Clone + Send,
    V: Clone + Send,
    S: BuildHasher + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        LfuCache::get(self, key)
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        LfuCache::put(self, key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        LfuCache::contains_key(self, key)
    }

    fn remove(&self, key: &K) -> Option<V> {
        LfuCache::remove(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn clear(&self) {
        LfuCache::clear(self)
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.cap().get())
    }

    fn put_if_absent(&self, key: K, value: V) -> Option<V> {
        LfuCache::put_if_absent(self, key, value)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LfuCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let segment = self.segment.lock();
        segment.metrics().to_btreemap(
            segment.min_frequency().unwrap_or(0),
            segment.bucket_count(),
        )
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}
