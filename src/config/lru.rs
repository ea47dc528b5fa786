//! Configuration for the Least Recently Used (LRU) cache.
//!
//! The capacity is the only knob: each entry costs one arena slot (key, value
//! and two link handles) plus one index entry.
//!
//! # Examples
//!
//! ```
//! use cache_space::config::LruCacheConfig;
//! use cache_space::LruCache;
//! use core::num::NonZeroUsize;
//!
//! let config = LruCacheConfig {
//!     capacity: NonZeroUsize::new(10_000).unwrap(),
//! };
//! let cache: LruCache<String, Vec<u8>> = LruCache::init(config, None);
//! ```

use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an LRU (Least Recently Used) cache.
///
/// LRU evicts the least recently accessed item when the cache is full. Both
/// reads and writes count as accesses.
#[derive(Clone, Copy)]
pub struct LruCacheConfig {
    /// Maximum number of key-value pairs the cache can hold
    pub capacity: NonZeroUsize,
}

impl fmt::Debug for LruCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
