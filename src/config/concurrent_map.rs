//! Configuration for the unbounded, lock-striped concurrent map cache.
//!
//! # Examples
//!
//! ```
//! use cache_space::config::ConcurrentMapCacheConfig;
//! use cache_space::ConcurrentMapCache;
//!
//! let config = ConcurrentMapCacheConfig {
//!     initial_capacity: 1024,
//!     segments: 16,
//! };
//! let cache: ConcurrentMapCache<String, i32> = ConcurrentMapCache::init(config, None).unwrap();
//! assert_eq!(cache.segment_count(), 16);
//! ```

use core::fmt;

/// Configuration for a [`ConcurrentMapCache`](crate::ConcurrentMapCache).
///
/// # Fields
///
/// - `initial_capacity`: Entries to pre-allocate, spread across all segments.
///   This is a sizing hint, not a bound; the map never evicts.
/// - `segments`: Number of independently locked segments (more = less contention)
#[derive(Clone, Copy)]
pub struct ConcurrentMapCacheConfig {
    /// Entries to pre-allocate across all segments
    pub initial_capacity: usize,
    /// Number of segments for lock striping; must be non-zero
    pub segments: usize,
}

impl Default for ConcurrentMapCacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            segments: crate::concurrent_map::default_segment_count(),
        }
    }
}

impl fmt::Debug for ConcurrentMapCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentMapCacheConfig")
            .field("initial_capacity", &self.initial_capacity)
            .field("segments", &self.segments)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_map_config_default() {
        let config = ConcurrentMapCacheConfig::default();
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.segments, 16);
    }
}
