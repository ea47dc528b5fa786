//! Cache Configuration Module
//!
//! Configuration structures for every cache policy and for the cache manager.
//! Each struct has public fields so it can be built with a struct literal.
//!
//! | Config | Cache | Description |
//! |--------|-------|-------------|
//! | `FifoCacheConfig` | [`FifoCache`](crate::FifoCache) | First In, First Out |
//! | `LruCacheConfig` | [`LruCache`](crate::LruCache) | Least Recently Used |
//! | `LfuCacheConfig` | [`LfuCache`](crate::LfuCache) | Least Frequently Used |
//! | `ConcurrentMapCacheConfig` | [`ConcurrentMapCache`](crate::ConcurrentMapCache) | Unbounded, lock-striped |
//! | `CacheManagerConfig` | [`CacheManager`](crate::CacheManager) | Built-in factory sizing |
//!
//! # Examples
//!
//! ```
//! use cache_space::config::LruCacheConfig;
//! use cache_space::LruCache;
//! use core::num::NonZeroUsize;
//!
//! let config = LruCacheConfig {
//!     capacity: NonZeroUsize::new(1000).unwrap(),
//! };
//! let cache: LruCache<String, i32> = LruCache::init(config, None);
//! ```

pub mod concurrent_map;
pub mod fifo;
pub mod lfu;
pub mod lru;
pub mod manager;

pub use concurrent_map::ConcurrentMapCacheConfig;
pub use fifo::FifoCacheConfig;
pub use lfu::LfuCacheConfig;
pub use lru::LruCacheConfig;
pub use manager::CacheManagerConfig;

use crate::error::{CacheError, Result};
use core::num::NonZeroUsize;

/// Converts a raw capacity into a `NonZeroUsize`, rejecting zero.
pub(crate) fn checked_capacity(capacity: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(capacity).ok_or_else(|| {
        CacheError::InvalidArgument("cache capacity must be greater than zero".into())
    })
}
