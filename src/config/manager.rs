//! Configuration for a [`CacheManager`](crate::CacheManager) built with the
//! built-in factory set.
//!
//! # Examples
//!
//! ```
//! use cache_space::config::CacheManagerConfig;
//! use cache_space::CacheManager;
//! use core::num::NonZeroUsize;
//!
//! let config = CacheManagerConfig {
//!     default_capacity: NonZeroUsize::new(64).unwrap(),
//!     ..Default::default()
//! };
//! let manager: CacheManager<String, String> = CacheManager::from_config(&config);
//! assert!(manager.has_cache_factory("lfu"));
//! ```

use core::fmt;
use core::num::NonZeroUsize;

/// Capacity used by the built-in factories when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 225;

/// Sizing for the built-in cache factories.
#[derive(Clone, Copy)]
pub struct CacheManagerConfig {
    /// Capacity of every bounded cache the built-in factories create, and the
    /// initial capacity of the concurrent map ones
    pub default_capacity: NonZeroUsize,
    /// Segment count of the concurrent map caches the built-in factories create
    pub segments: usize,
}

impl Default for CacheManagerConfig {
    fn default() -> Self {
        Self {
            default_capacity: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            segments: crate::concurrent_map::default_segment_count(),
        }
    }
}

impl fmt::Debug for CacheManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManagerConfig")
            .field("default_capacity", &self.default_capacity)
            .field("segments", &self.segments)
            .finish()
    }
}
