//! Unbounded Concurrent Map Cache
//!
//! A thread-safe hash map with no eviction and no ordering, for spaces whose
//! size is bounded by the application rather than by the cache.
//!
//! # How It Works
//!
//! Keys are partitioned across independently locked segments (lock striping):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ConcurrentMapCache                        │
//! │                                                              │
//! │  hash(key) % N  ──▶  Segment Selection                       │
//! │                                                              │
//! │  ┌────────────┐ ┌────────────┐       ┌────────────┐          │
//! │  │ Segment 0  │ │ Segment 1  │  ...  │ Segment N-1│          │
//! │  │  RwLock    │ │  RwLock    │       │  RwLock    │          │
//! │  │  HashMap   │ │  HashMap   │       │  HashMap   │          │
//! │  └────────────┘ └────────────┘       └────────────┘          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unlike the LRU and LFU caches, a read here changes nothing, so segments use
//! `parking_lot::RwLock` and readers of the same segment proceed in parallel.
//! Writers only block their own segment.
//!
//! `len()` visits every segment one at a time and is therefore a point-in-time
//! estimate while writers are active.

use crate::config::ConcurrentMapCacheConfig;
use crate::error::{CacheError, Result};
use crate::traits::Cache;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use parking_lot::RwLock;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Returns the default number of lock stripes.
#[inline]
pub fn default_segment_count() -> usize {
    16
}

/// An unbounded, lock-striped concurrent map implementing [`Cache`].
///
/// # Example
///
/// ```
/// use cache_space::{Cache, ConcurrentMapCache};
/// use std::sync::Arc;
/// use std::thread;
///
/// let cache: Arc<ConcurrentMapCache<u32, u32>> = Arc::new(ConcurrentMapCache::new());
///
/// let handles: Vec<_> = (0..4u32)
///     .map(|t| {
///         let cache = Arc::clone(&cache);
///         thread::spawn(move || {
///             for i in 0..100 {
///                 cache.put(t * 1000 + i, i);
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(cache.len(), 400);
/// assert_eq!(cache.capacity(), None);
/// ```
pub struct ConcurrentMapCache<K, V, S = DefaultHashBuilder> {
    segments: Box<[RwLock<HashMap<K, V, S>>]>,
    hash_builder: S,
}

impl<K: Hash + Eq, V> ConcurrentMapCache<K, V> {
    /// Creates a concurrent map from a configuration with an optional hasher.
    ///
    /// Fails with [`CacheError::InvalidArgument`] when `config.segments` is 0.
    pub fn init(
        config: ConcurrentMapCacheConfig,
        hasher: Option<DefaultHashBuilder>,
    ) -> Result<Self> {
        ConcurrentMapCache::with_hasher(config, hasher.unwrap_or_default())
    }

    /// Creates an empty map with the default segment count.
    pub fn new() -> Self {
        ConcurrentMapCache::from_parts(
            ConcurrentMapCacheConfig::default(),
            DefaultHashBuilder::default(),
        )
    }
}

impl<K: Hash + Eq, V> Default for ConcurrentMapCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Clone> ConcurrentMapCache<K, V, S> {
    /// Creates a concurrent map with a custom hash builder, cloned into every
    /// segment.
    pub fn with_hasher(config: ConcurrentMapCacheConfig, hash_builder: S) -> Result<Self> {
        if config.segments == 0 {
            return Err(CacheError::InvalidArgument(
                "segment count must be greater than zero".to_string(),
            ));
        }
        Ok(Self::from_parts(config, hash_builder))
    }

    /// Builds the map, treating a segment count of 0 as 1.
    pub(crate) fn from_parts(config: ConcurrentMapCacheConfig, hash_builder: S) -> Self {
        let segment_count = config.segments.max(1);
        let per_segment = config.initial_capacity.div_ceil(segment_count);
        let segments: Vec<_> = (0..segment_count)
            .map(|_| {
                RwLock::new(HashMap::with_capacity_and_hasher(
                    per_segment,
                    hash_builder.clone(),
                ))
            })
            .collect();

        Self {
            segments: segments.into_boxed_slice(),
            hash_builder,
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ConcurrentMapCache<K, V, S> {
    /// Returns the segment index for the given key.
    #[inline]
    fn segment_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        (self.hash_builder.hash_one(key) as usize) % self.segments.len()
    }

    /// Returns the number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the total number of entries across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.read().len()).sum()
    }

    /// Returns `true` if every segment is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.read().is_empty())
    }

    /// Returns a clone of the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        let idx = self.segment_index(key);
        self.segments[idx].read().get(key).cloned()
    }

    /// Applies `f` to the value for `key` under the segment's read lock.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        let idx = self.segment_index(key);
        self.segments[idx].read().get(key).map(f)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.segment_index(key);
        self.segments[idx].read().contains_key(key)
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let idx = self.segment_index(&key);
        self.segments[idx].write().insert(key, value)
    }

    /// Stores `value` if `key` is absent; otherwise returns the current value.
    /// The check and the insert happen under one segment lock.
    pub fn put_if_absent(&self, key: K, value: V) -> Option<V>
    where
        V: Clone,
    {
        let idx = self.segment_index(&key);
        let mut segment = self.segments[idx].write();
        if let Some(current) = segment.get(&key) {
            return Some(current.clone());
        }
        segment.insert(key, value);
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.segment_index(key);
        self.segments[idx].write().remove(key)
    }

    /// Removes every entry, one segment at a time.
    pub fn clear(&self) {
        for segment in self.segments.iter() {
            segment.write().clear();
        }
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentMapCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConcurrentMapCache")
            .field("segment_count", &self.segments.len())
            .finish()
    }
}

impl<K, V, S> Cache<K, V> for ConcurrentMapCache<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Clone + Send + Sync,
    S: BuildHasher + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        ConcurrentMapCache::get(self, key)
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        ConcurrentMapCache::put(self, key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        ConcurrentMapCache::contains_key(self, key)
    }

    fn remove(&self, key: &K) -> Option<V> {
        ConcurrentMapCache::remove(self, key)
    }

    fn len(&self) -> usize {
        ConcurrentMapCache::len(self)
    }

    fn clear(&self) {
        ConcurrentMapCache::clear(self)
    }

    fn capacity(&self) -> Option<usize> {
        None
    }

    fn put_if_absent(&self, key: K, value: V) -> Option<V> {
        ConcurrentMapCache::put_if_absent(self, key, value)
    }
}
