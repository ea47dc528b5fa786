#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Policy Selection Guide
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                  Which Cache Policy Should I Use?                    │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  Must the cache stay bounded?                                        │
//! │     │                                                                │
//! │    No ──▶ ┌────────────────────┐                                     │
//! │     │     │ ConcurrentMapCache │                                     │
//! │    Yes    └────────────────────┘                                     │
//! │     ▼                                                                │
//! │  Recent = hot? ──Yes──▶ ┌──────────┐                                 │
//! │     │                   │   LRU    │                                 │
//! │    No                   └──────────┘                                 │
//! │     ▼                                                                │
//! │  Popular = hot? ─Yes──▶ ┌──────────┐                                 │
//! │     │                   │   LFU    │                                 │
//! │    No                   └──────────┘                                 │
//! │     ▼                                                                │
//! │  ┌──────────┐                                                        │
//! │  │   FIFO   │   (cheapest reads; `get` never reorders)               │
//! │  └──────────┘                                                        │
//! │                                                                      │
//! │  Need per-thread isolation? Wrap any of them in ThreadLocalCache.    │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Description | Bounded | `get` side effect |
//! |------|-------------|---------|-------------------|
//! | [`FifoCache`] | First In, First Out | yes | none |
//! | [`LruCache`] | Least Recently Used | yes | moves to MRU |
//! | [`LfuCache`] | Least Frequently Used, O(1) | yes | frequency + 1 |
//! | [`ConcurrentMapCache`] | Lock-striped hash map | no | none |
//! | [`ThreadLocalCache`] | One instance per thread | inner policy | inner policy |
//!
//! Every type implements [`Cache`] and can be stored as
//! `Arc<dyn Cache<K, V>>`. The [`CacheManager`] keeps such instances under
//! names, built lazily by [`CacheFactory`] implementations.
//!
//! ## Code Examples
//!
//! ### FIFO
//!
//! ```rust
//! use cache_space::FifoCache;
//! use cache_space::config::FifoCacheConfig;
//! use core::num::NonZeroUsize;
//!
//! let config = FifoCacheConfig {
//!     capacity: NonZeroUsize::new(2).unwrap(),
//! };
//! let cache = FifoCache::init(config, None);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");      // reads never reorder
//! cache.put("c", 3);    // "a" evicted (oldest insertion)
//! assert!(cache.get(&"a").is_none());
//! ```
//!
//! ### LFU
//!
//! ```rust
//! use cache_space::LfuCache;
//! use cache_space::config::LfuCacheConfig;
//! use core::num::NonZeroUsize;
//!
//! let config = LfuCacheConfig {
//!     capacity: NonZeroUsize::new(2).unwrap(),
//! };
//! let cache = LfuCache::init(config, None);
//! cache.put("rare", 1);
//! cache.put("popular", 2);
//!
//! for _ in 0..10 { cache.get(&"popular"); }
//!
//! cache.put("new", 3);  // "rare" evicted (lowest frequency)
//! assert!(cache.get(&"popular").is_some());
//! ```
//!
//! ### Cache spaces
//!
//! ```rust
//! use cache_space::factory::{LFU, LRU};
//! use cache_space::CacheManager;
//! use core::num::NonZeroUsize;
//!
//! let manager: CacheManager<u64, String> = CacheManager::builtin(NonZeroUsize::new(64).unwrap());
//! manager.put("users", LRU, 1, "ada".to_string()).unwrap();
//! manager.put("hot", LFU, 1, "x".to_string()).unwrap();
//!
//! assert_eq!(manager.get("users", &1), Some("ada".to_string()));
//! assert_eq!(manager.space_names(), vec!["hot".to_string(), "users".to_string()]);
//! ```
//!
//! ## Modules
//!
//! - [`fifo`], [`lru`], [`lfu`]: bounded policies
//! - [`concurrent_map`]: unbounded lock-striped map
//! - [`thread_local`]: per-thread wrapper
//! - [`factory`], [`manager`]: factories and named cache spaces
//! - [`config`]: configuration structures
//! - [`metrics`]: hit/miss and eviction counters

#[cfg(test)]
extern crate scoped_threadpool;

/// Arena-backed doubly linked lists shared by the bounded policies.
pub(crate) mod list;

/// Error type and result alias.
pub mod error;

/// The [`Cache`] trait.
pub mod traits;

/// Cache configuration structures.
///
/// Provides configuration structures for all cache implementations and the
/// manager.
pub mod config;

/// First In, First Out (FIFO) cache implementation.
pub mod fifo;

/// Least Recently Used (LRU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least recently used items when
/// the capacity is reached.
pub mod lru;

/// Least Frequently Used (LFU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least frequently used items
/// when capacity is reached, in constant time.
pub mod lfu;

/// Unbounded, lock-striped concurrent map cache.
pub mod concurrent_map;

/// Per-thread cache instances behind one shared handle.
pub mod thread_local;

/// Cache factories and the built-in factory names.
pub mod factory;

/// Registry of named, lazily created cache spaces.
pub mod manager;

/// Cache metrics system.
///
/// Counters maintained by the bounded policies and reported as a flat map.
pub mod metrics;

pub use concurrent_map::ConcurrentMapCache;
pub use error::{CacheError, Result};
pub use factory::CacheFactory;
pub use fifo::FifoCache;
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use manager::CacheManager;
pub use metrics::CacheMetrics;
pub use thread_local::ThreadLocalCache;
pub use traits::Cache;
