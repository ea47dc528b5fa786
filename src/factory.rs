//! Cache factories.
//!
//! A [`CacheFactory`] builds a fresh cache instance each time the
//! [`CacheManager`](crate::CacheManager) needs a new cache space. Any closure
//! returning `Arc<dyn Cache<K, V>>` is a factory:
//!
//! ```
//! use cache_space::{Cache, CacheFactory, LruCache};
//! use std::sync::Arc;
//!
//! let factory = || -> Arc<dyn Cache<u64, String>> {
//!     Arc::new(LruCache::<u64, String>::try_new(32).unwrap())
//! };
//! let cache = factory.create_cache();
//! assert_eq!(cache.capacity(), Some(32));
//! ```
//!
//! The names under which [`CacheManager::builtin`](crate::CacheManager::builtin)
//! registers its factories are exported as constants.

use crate::concurrent_map::ConcurrentMapCache;
use crate::config::{CacheManagerConfig, ConcurrentMapCacheConfig};
use crate::fifo::FifoCache;
use crate::lfu::LfuCache;
use crate::lru::LruCache;
use crate::thread_local::ThreadLocalCache;
use crate::traits::Cache;
use core::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// Unbounded lock-striped map; the built-in default.
pub const CONCURRENT: &str = "concurrent";
/// Bounded least-recently-used cache.
pub const LRU: &str = "lru";
/// Bounded least-frequently-used cache.
pub const LFU: &str = "lfu";
/// Bounded first-in first-out cache.
pub const FIFO: &str = "fifo";
/// Per-thread LRU caches.
pub const THREAD_LOCAL_LRU: &str = "thread-local-lru";
/// Per-thread LFU caches.
pub const THREAD_LOCAL_LFU: &str = "thread-local-lfu";
/// Per-thread FIFO caches.
pub const THREAD_LOCAL_FIFO: &str = "thread-local-fifo";
/// Per-thread unbounded maps.
pub const THREAD_LOCAL_CONCURRENT: &str = "thread-local-concurrent";

/// Builds cache instances for new cache spaces.
///
/// Factories run while the manager holds its space table lock, so they must
/// not call back into the manager.
pub trait CacheFactory<K, V>: Send + Sync {
    /// Returns a new, empty cache.
    fn create_cache(&self) -> Arc<dyn Cache<K, V>>;
}

impl<K, V, F> CacheFactory<K, V> for F
where
    F: Fn() -> Arc<dyn Cache<K, V>> + Send + Sync,
{
    fn create_cache(&self) -> Arc<dyn Cache<K, V>> {
        self()
    }
}

fn shared<K, V, F>(factory: F) -> Arc<dyn CacheFactory<K, V>>
where
    F: Fn() -> Arc<dyn Cache<K, V>> + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Factory set registered by the built-in manager constructors, default
/// factory first.
pub(crate) fn builtin_factories<K, V>(
    config: &CacheManagerConfig,
) -> Vec<(&'static str, Arc<dyn CacheFactory<K, V>>)>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let cap = config.default_capacity;
    let map_config = ConcurrentMapCacheConfig {
        initial_capacity: cap.get(),
        segments: config.segments,
    };

    vec![
        (
            CONCURRENT,
            shared(move || -> Arc<dyn Cache<K, V>> {
                Arc::new(ConcurrentMapCache::<K, V>::from_parts(
                    map_config,
                    DefaultHashBuilder::default(),
                ))
            }),
        ),
        (
            LRU,
            shared(move || -> Arc<dyn Cache<K, V>> { Arc::new(LruCache::<K, V>::new(cap)) }),
        ),
        (
            LFU,
            shared(move || -> Arc<dyn Cache<K, V>> { Arc::new(LfuCache::<K, V>::new(cap)) }),
        ),
        (
            FIFO,
            shared(move || -> Arc<dyn Cache<K, V>> { Arc::new(FifoCache::<K, V>::new(cap)) }),
        ),
        (
            THREAD_LOCAL_LRU,
            shared(move || -> Arc<dyn Cache<K, V>> {
                Arc::new(ThreadLocalCache::<K, V>::lru(cap))
            }),
        ),
        (
            THREAD_LOCAL_LFU,
            shared(move || -> Arc<dyn Cache<K, V>> {
                Arc::new(ThreadLocalCache::<K, V>::lfu(cap))
            }),
        ),
        (
            THREAD_LOCAL_FIFO,
            shared(move || -> Arc<dyn Cache<K, V>> {
                Arc::new(ThreadLocalCache::<K, V>::fifo(cap))
            }),
        ),
        (
            THREAD_LOCAL_CONCURRENT,
            shared(move || -> Arc<dyn Cache<K, V>> {
                Arc::new(ThreadLocalCache::<K, V>::concurrent_map_from_parts(map_config))
            }),
        ),
    ]
}
