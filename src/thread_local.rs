//! Thread-Confined Cache Wrapper
//!
//! [`ThreadLocalCache`] gives every calling thread its own private cache
//! instance, built lazily from a constructor the first time that thread
//! writes. Threads never observe each other's entries.
//!
//! ```text
//!   ThreadLocalCache
//!   ┌──────────────────────────────────────────────┐
//!   │ constructor: Fn() -> Arc<dyn Cache<K, V>>    │
//!   │ bindings (RwLock):                           │
//!   │   ThreadId(1) ──▶ LruCache { ... }           │
//!   │   ThreadId(7) ──▶ LruCache { ... }           │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! A binding lives until the owning thread calls [`Cache::clear`], which
//! empties the instance and detaches it, or until the owning thread exits.
//! Binding a thread registers an exit hook in that thread's own thread-local
//! storage; the hook removes the binding when the thread's thread-locals are
//! destroyed, so short-lived worker threads do not accumulate instances.
//!
//! Reads from a thread without a binding answer as an empty cache and do not
//! create one.

use crate::concurrent_map::ConcurrentMapCache;
use crate::config::ConcurrentMapCacheConfig;
use crate::error::{CacheError, Result};
use crate::fifo::FifoCache;
use crate::lfu::LfuCache;
use crate::lru::LruCache;
use crate::traits::Cache;
use core::cell::RefCell;
use core::hash::Hash;
use core::num::NonZeroUsize;
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use tracing::debug;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

type Constructor<K, V> = Box<dyn Fn() -> Arc<dyn Cache<K, V>> + Send + Sync>;
type Bindings<K, V> = RwLock<HashMap<ThreadId, Arc<dyn Cache<K, V>>>>;

static NEXT_WRAPPER_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static EXIT_HOOKS: ExitHooks = ExitHooks::default();
}

/// Callbacks run when the owning thread exits, one per wrapper the thread is
/// bound to.
#[derive(Default)]
struct ExitHooks(RefCell<HashMap<u64, Box<dyn FnOnce()>>>);

impl Drop for ExitHooks {
    fn drop(&mut self) {
        for (_, hook) in self.0.get_mut().drain() {
            hook();
        }
    }
}

/// A cache that keeps a separate instance per calling thread.
///
/// # Example
///
/// ```
/// use cache_space::{Cache, ThreadLocalCache};
/// use core::num::NonZeroUsize;
/// use std::sync::Arc;
/// use std::thread;
///
/// let cache: Arc<ThreadLocalCache<u32, &str>> =
///     Arc::new(ThreadLocalCache::lru(NonZeroUsize::new(16).unwrap()));
/// cache.put(1, "main");
///
/// let other = Arc::clone(&cache);
/// thread::spawn(move || {
///     assert_eq!(other.get(&1), None);
///     other.put(1, "worker");
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(cache.get(&1), Some("main"));
/// assert_eq!(cache.bound_threads(), 1);
/// ```
pub struct ThreadLocalCache<K, V> {
    id: u64,
    bindings: Arc<Bindings<K, V>>,
    constructor: Constructor<K, V>,
    capacity: Option<usize>,
}

impl<K, V> ThreadLocalCache<K, V> {
    /// Wraps an arbitrary constructor. Each thread's instance comes from one
    /// call to `constructor`.
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn() -> Arc<dyn Cache<K, V>> + Send + Sync + 'static,
    {
        Self {
            id: NEXT_WRAPPER_ID.fetch_add(1, Ordering::Relaxed),
            bindings: Arc::new(RwLock::new(HashMap::default())),
            constructor: Box::new(constructor),
            capacity: None,
        }
    }

    fn with_capacity_hint<F>(capacity: usize, constructor: F) -> Self
    where
        F: Fn() -> Arc<dyn Cache<K, V>> + Send + Sync + 'static,
    {
        Self {
            capacity: Some(capacity),
            ..Self::new(constructor)
        }
    }

    /// Returns the calling thread's instance, if it has one.
    fn bound(&self) -> Option<Arc<dyn Cache<K, V>>> {
        self.bindings.read().get(&thread::current().id()).cloned()
    }

    /// Detaches the calling thread's instance without clearing it and returns
    /// it.
    pub fn detach(&self) -> Option<Arc<dyn Cache<K, V>>> {
        let id = thread::current().id();
        let detached = self.bindings.write().remove(&id);
        if detached.is_some() {
            debug!(thread = ?id, "detached thread-local cache instance");
        }
        detached
    }

    /// Returns `true` if the calling thread currently has an instance.
    pub fn is_bound(&self) -> bool {
        self.bound().is_some()
    }

    /// Number of live threads that currently hold an instance.
    pub fn bound_threads(&self) -> usize {
        self.bindings.read().len()
    }
}

impl<K: 'static, V: 'static> ThreadLocalCache<K, V> {
    /// Returns the calling thread's instance, creating it on first use.
    ///
    /// A thread whose thread-locals are already being torn down gets a
    /// fresh instance that is never bound.
    fn local(&self) -> Arc<dyn Cache<K, V>> {
        if let Some(cache) = self.bound() {
            return cache;
        }
        let id = thread::current().id();
        let cache = (self.constructor)();
        if !self.register_exit_hook(id) {
            return cache;
        }
        // Only the owning thread ever inserts its own binding, so building
        // outside the lock cannot race with another constructor call.
        self.bindings.write().insert(id, Arc::clone(&cache));
        debug!(thread = ?id, "bound thread-local cache instance");
        cache
    }

    /// Arranges for the calling thread's binding to be removed when the
    /// thread exits. Returns `false` if thread-local storage is unavailable.
    fn register_exit_hook(&self, thread: ThreadId) -> bool {
        let bindings: Weak<Bindings<K, V>> = Arc::downgrade(&self.bindings);
        let hook: Box<dyn FnOnce()> = Box::new(move || {
            if let Some(bindings) = bindings.upgrade() {
                bindings.write().remove(&thread);
            }
        });
        EXIT_HOOKS
            .try_with(|hooks| {
                hooks.0.borrow_mut().entry(self.id).or_insert(hook);
            })
            .is_ok()
    }
}

impl<K, V> ThreadLocalCache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Per-thread [`LruCache`] instances of capacity `cap`.
    pub fn lru(cap: NonZeroUsize) -> Self {
        Self::with_capacity_hint(cap.get(), move || Arc::new(LruCache::<K, V>::new(cap)))
    }

    /// Per-thread [`LfuCache`] instances of capacity `cap`.
    pub fn lfu(cap: NonZeroUsize) -> Self {
        Self::with_capacity_hint(cap.get(), move || Arc::new(LfuCache::<K, V>::new(cap)))
    }

    /// Per-thread [`FifoCache`] instances of capacity `cap`.
    pub fn fifo(cap: NonZeroUsize) -> Self {
        Self::with_capacity_hint(cap.get(), move || Arc::new(FifoCache::<K, V>::new(cap)))
    }
}

impl<K, V> ThreadLocalCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Per-thread unbounded [`ConcurrentMapCache`] instances with the default
    /// segment count.
    pub fn concurrent_map() -> Self {
        Self::concurrent_map_from_parts(ConcurrentMapCacheConfig::default())
    }

    /// Per-thread [`ConcurrentMapCache`] instances built from `config`.
    ///
    /// Fails with [`CacheError::InvalidArgument`] when `config.segments` is 0.
    pub fn concurrent_map_with(config: ConcurrentMapCacheConfig) -> Result<Self> {
        if config.segments == 0 {
            return Err(CacheError::InvalidArgument(
                "segment count must be greater than zero".to_string(),
            ));
        }
        Ok(Self::concurrent_map_from_parts(config))
    }

    /// Like [`concurrent_map_with`](Self::concurrent_map_with), treating a
    /// segment count of 0 as 1.
    pub(crate) fn concurrent_map_from_parts(config: ConcurrentMapCacheConfig) -> Self {
        let build = map_constructor::<K, V>(config);
        Self::new(move || -> Arc<dyn Cache<K, V>> { build() })
    }
}

fn map_constructor<K, V>(
    config: ConcurrentMapCacheConfig,
) -> impl Fn() -> Arc<ConcurrentMapCache<K, V>> + Send + Sync + 'static
where
    K: Hash + Eq + 'static,
    V: 'static,
{
    move || Arc::new(ConcurrentMapCache::from_parts(config, DefaultHashBuilder::default()))
}

impl<K, V> core::fmt::Debug for ThreadLocalCache<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadLocalCache")
            .field("bound_threads", &self.bindings.read().len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<K: 'static, V: 'static> Cache<K, V> for ThreadLocalCache<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.bound()?.get(key)
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        self.local().put(key, value)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.bound().is_some_and(|cache| cache.contains_key(key))
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.bound()?.remove(key)
    }

    fn len(&self) -> usize {
        self.bound().map_or(0, |cache| cache.len())
    }

    /// Clears the calling thread's instance and detaches it.
    fn clear(&self) {
        if let Some(cache) = self.detach() {
            cache.clear();
        }
    }

    fn capacity(&self) -> Option<usize> {
        match self.bound() {
            Some(cache) => cache.capacity(),
            None => self.capacity,
        }
    }

    fn put_if_absent(&self, key: K, value: V) -> Option<V> {
        self.local().put_if_absent(key, value)
    }
}
