//! Configuration for the First In, First Out (FIFO) cache.
//!
//! # Examples
//!
//! ```
//! use cache_space::config::FifoCacheConfig;
//! use cache_space::FifoCache;
//! use core::num::NonZeroUsize;
//!
//! let config = FifoCacheConfig {
//!     capacity: NonZeroUsize::new(128).unwrap(),
//! };
//! let cache: FifoCache<u64, String> = FifoCache::init(config, None);
//! assert_eq!(cache.cap().get(), 128);
//! ```

use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a FIFO cache.
///
/// FIFO evicts the entry that was inserted first, regardless of how often or
/// how recently it was read.
#[derive(Clone, Copy)]
pub struct FifoCacheConfig {
    /// Maximum number of key-value pairs the cache can hold
    pub capacity: NonZeroUsize,
}

impl fmt::Debug for FifoCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoCacheConfig")
            .field("capacity", &self.capacity)
            .finish()
    }
}
