//! The cache contract shared by every policy.
//!
//! [`Cache`] takes `&self` everywhere: each implementation carries its own
//! synchronization, so a single instance can be shared through an `Arc`
//! between threads and stored as `Arc<dyn Cache<K, V>>` inside a
//! [`CacheManager`](crate::CacheManager).
//!
//! Values are handed out as clones. No lock guard ever escapes a call.
//!
//! ```
//! use cache_space::{Cache, LruCache};
//! use std::sync::Arc;
//!
//! fn warm(cache: &dyn Cache<u64, String>, data: &[(u64, &str)]) {
//!     for (k, v) in data {
//!         cache.put(*k, v.to_string());
//!     }
//! }
//!
//! let cache: Arc<dyn Cache<u64, String>> = Arc::new(LruCache::<u64, String>::try_new(8).unwrap());
//! warm(cache.as_ref(), &[(1, "one"), (2, "two")]);
//! assert_eq!(cache.get(&1), Some("one".to_string()));
//! assert_eq!(cache.put_if_absent(1, "uno".to_string()), Some("one".to_string()));
//! ```

/// Operations every cache policy supports.
///
/// Whether a read has side effects depends on the policy: `get` promotes the
/// entry in LRU and LFU caches and leaves FIFO and concurrent map caches
/// untouched. `contains_key` never reorders anything.
pub trait Cache<K, V>: Send + Sync {
    /// Returns a clone of the value for `key`, promoting it where the policy
    /// tracks recency or frequency.
    fn get(&self, key: &K) -> Option<V>;

    /// Inserts or overwrites `key`, returning the previous value.
    ///
    /// Storing a new key into a full bounded cache evicts exactly one other
    /// entry first.
    fn put(&self, key: K, value: V) -> Option<V>;

    /// Returns `true` if `key` is present. Never changes ordering.
    fn contains_key(&self, key: &K) -> bool;

    /// Removes `key`, returning its value.
    fn remove(&self, key: &K) -> Option<V>;

    /// Number of entries currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&self);

    /// Maximum number of entries, or `None` for unbounded caches.
    fn capacity(&self) -> Option<usize>;

    /// Stores `value` only if `key` is absent.
    ///
    /// Returns the current value when the key is present (nothing is
    /// stored), or `None` after inserting. Policies that lock override this so
    /// the check and the insert happen under one lock acquisition.
    fn put_if_absent(&self, key: K, value: V) -> Option<V> {
        match self.get(&key) {
            Some(current) => Some(current),
            None => self.put(key, value),
        }
    }

    /// Calls [`put`](Cache::put) when `condition` holds; otherwise does nothing
    /// and returns `None`.
    fn put_if(&self, condition: bool, key: K, value: V) -> Option<V> {
        if condition {
            self.put(key, value)
        } else {
            None
        }
    }

    /// Calls [`remove`](Cache::remove) when `condition` holds; otherwise does
    /// nothing and returns `None`.
    fn remove_if(&self, condition: bool, key: &K) -> Option<V> {
        if condition {
            self.remove(key)
        } else {
            None
        }
    }
}
