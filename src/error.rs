//! Error types for cache construction and cache-space management.
//!
//! Every variant describes a programming or configuration mistake rather than
//! a transient condition, so callers are expected to surface them instead of
//! retrying. A call that fails leaves the cache or manager exactly as it was.
//!
//! # Example
//!
//! ```
//! use cache_space::{CacheError, LruCache};
//!
//! let err = LruCache::<u64, u64>::try_new(0).unwrap_err();
//! assert!(matches!(err, CacheError::InvalidArgument(_)));
//! ```

use thiserror::Error;

/// Errors reported by caches and by the [`CacheManager`](crate::CacheManager).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A factory with this name is already registered.
    #[error("failed to register cache factory: a factory named '{name}' already exists")]
    DuplicateFactory {
        /// The name that was already taken.
        name: String,
    },

    /// The manager's default factory cannot be removed.
    #[error("the default cache factory '{name}' cannot be removed")]
    ProtectedDefaultFactory {
        /// The default factory's name.
        name: String,
    },

    /// A cache space was requested through a factory that was never registered.
    #[error("failed to create cache space: no cache factory named '{name}' exists")]
    UnknownFactory {
        /// The missing factory name.
        name: String,
    },

    /// An argument was rejected (empty name, zero capacity, zero segments).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CacheError>;
