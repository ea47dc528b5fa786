//! Named cache spaces.
//!
//! A [`CacheManager`] maps space names to cache instances, creating each
//! space lazily from a named [`CacheFactory`] the first time it is
//! referenced. One factory is the manager's default; it backs the default
//! space and cannot be removed.
//!
//! ```text
//!   factories (RwLock)                 spaces (RwLock)
//!   ┌────────────────────────┐         ┌───────────────────────────────────┐
//!   │ "concurrent" (default) │──┐      │ "DEF-CACHE-SPACE:CONCURRENT"      │
//!   │ "lru"                  │──┼─────▶│ "sessions"      ─▶ LruCache       │
//!   │ "lfu"                  │  │      │ "hot-keys"      ─▶ LfuCache       │
//!   │ ...                    │  └─────▶│ ...                               │
//!   └────────────────────────┘         └───────────────────────────────────┘
//! ```
//!
//! # Concurrency
//!
//! Both tables sit behind `parking_lot::RwLock`. Lookups take read locks.
//! Creating a space takes the space table's write lock, checks again for a
//! concurrent creator, and only then runs the factory, so racing first
//! callers all receive the same instance. When both locks are needed the
//! space table is always locked first.
//!
//! # Example
//!
//! ```
//! use cache_space::factory::LRU;
//! use cache_space::CacheManager;
//! use core::num::NonZeroUsize;
//!
//! let manager: CacheManager<String, u64> = CacheManager::builtin(NonZeroUsize::new(128).unwrap());
//!
//! manager.put("sessions", LRU, "alice".to_string(), 7).unwrap();
//! assert_eq!(manager.get("sessions", &"alice".to_string()), Some(7));
//!
//! manager.put_default("answer".to_string(), 42).unwrap();
//! assert_eq!(manager.get_default(&"answer".to_string()), Some(42));
//! ```

use crate::config::CacheManagerConfig;
use crate::error::{CacheError, Result};
use crate::factory::{self, CacheFactory};
use crate::traits::Cache;
use core::hash::Hash;
use core::num::NonZeroUsize;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Prefix of the default space's name; the default factory's name follows in
/// upper case.
pub const DEFAULT_SPACE_PREFIX: &str = "DEF-CACHE-SPACE:";

/// Registry of cache factories and the cache spaces built from them.
pub struct CacheManager<K, V> {
    default_factory: String,
    default_space: String,
    factories: RwLock<HashMap<String, Arc<dyn CacheFactory<K, V>>>>,
    spaces: RwLock<HashMap<String, Arc<dyn Cache<K, V>>>>,
}

fn check_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CacheError::InvalidArgument(format!(
            "{kind} name must not be empty"
        )));
    }
    Ok(())
}

impl<K, V> CacheManager<K, V> {
    /// Creates a manager whose default factory is `factory`, registered under
    /// `default_factory_name`.
    pub fn new<F>(default_factory_name: impl Into<String>, factory: F) -> Result<Self>
    where
        F: CacheFactory<K, V> + 'static,
    {
        Self::with_default_factory(default_factory_name.into(), Arc::new(factory))
    }

    fn with_default_factory(name: String, factory: Arc<dyn CacheFactory<K, V>>) -> Result<Self> {
        check_name("factory", &name)?;
        let default_space = format!("{DEFAULT_SPACE_PREFIX}{}", name.to_uppercase());
        let mut factories = HashMap::default();
        factories.insert(name.clone(), factory);
        debug!(factory = %name, space = %default_space, "created cache manager");
        Ok(Self {
            default_factory: name,
            default_space,
            factories: RwLock::new(factories),
            spaces: RwLock::new(HashMap::default()),
        })
    }

    /// Name of the protected default factory.
    pub fn default_factory_name(&self) -> &str {
        &self.default_factory
    }

    /// Name of the space the `*_default` operations use.
    pub fn default_space_name(&self) -> &str {
        &self.default_space
    }

    // ----- factories -----

    /// Registers `factory` under `name`.
    ///
    /// Fails with [`CacheError::DuplicateFactory`] if the name is taken; the
    /// existing factory stays registered.
    pub fn register_cache_factory<F>(&self, name: &str, factory: F) -> Result<()>
    where
        F: CacheFactory<K, V> + 'static,
    {
        check_name("factory", name)?;
        let mut factories = self.factories.write();
        if factories.contains_key(name) {
            warn!(factory = name, "rejected duplicate cache factory registration");
            return Err(CacheError::DuplicateFactory {
                name: name.to_string(),
            });
        }
        factories.insert(name.to_string(), Arc::new(factory));
        debug!(factory = name, "registered cache factory");
        Ok(())
    }

    /// Unregisters the factory called `name` and returns it.
    ///
    /// Existing spaces built by it are unaffected. The default factory cannot
    /// be removed.
    pub fn remove_cache_factory(&self, name: &str) -> Result<Option<Arc<dyn CacheFactory<K, V>>>> {
        if name == self.default_factory {
            warn!(factory = name, "refused to remove the default cache factory");
            return Err(CacheError::ProtectedDefaultFactory {
                name: name.to_string(),
            });
        }
        let removed = self.factories.write().remove(name);
        if removed.is_some() {
            debug!(factory = name, "removed cache factory");
        }
        Ok(removed)
    }

    /// Returns `true` if a factory is registered under `name`.
    pub fn has_cache_factory(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// Returns the factory registered under `name`.
    pub fn cache_factory(&self, name: &str) -> Option<Arc<dyn CacheFactory<K, V>>> {
        self.factories.read().get(name).cloned()
    }

    /// Replaces the factory registered under `name` and returns the old one.
    ///
    /// Does nothing and returns `None` if no such factory exists. Spaces
    /// already built keep their instances.
    pub fn update_cache_factory<F>(&self, name: &str, factory: F) -> Option<Arc<dyn CacheFactory<K, V>>>
    where
        F: CacheFactory<K, V> + 'static,
    {
        let mut factories = self.factories.write();
        let slot = factories.get_mut(name)?;
        let old = core::mem::replace(slot, Arc::new(factory));
        debug!(factory = name, "replaced cache factory");
        Some(old)
    }

    /// Names of all registered factories, sorted.
    pub fn cache_factory_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }

    // ----- spaces -----

    /// Returns the space called `space`, building it with the factory called
    /// `factory` if it does not exist yet.
    ///
    /// `factory` is only consulted on creation. Concurrent first callers all
    /// receive the same instance.
    pub fn if_not_exists_created(&self, space: &str, factory: &str) -> Result<Arc<dyn Cache<K, V>>> {
        if let Some(cache) = self.spaces.read().get(space) {
            return Ok(Arc::clone(cache));
        }
        check_name("space", space)?;

        let mut spaces = self.spaces.write();
        if let Some(cache) = spaces.get(space) {
            return Ok(Arc::clone(cache));
        }
        let Some(builder) = self.factories.read().get(factory).cloned() else {
            warn!(space, factory, "no cache factory registered under this name");
            return Err(CacheError::UnknownFactory {
                name: factory.to_string(),
            });
        };
        let cache = builder.create_cache();
        spaces.insert(space.to_string(), Arc::clone(&cache));
        debug!(space, factory, "created cache space");
        Ok(cache)
    }

    /// Returns the default space, creating it on first use.
    pub fn default_cache(&self) -> Result<Arc<dyn Cache<K, V>>> {
        self.if_not_exists_created(&self.default_space, &self.default_factory)
    }

    /// Returns the space called `space` without creating it.
    pub fn cache(&self, space: &str) -> Option<Arc<dyn Cache<K, V>>> {
        self.spaces.read().get(space).cloned()
    }

    /// Returns `true` if the space exists.
    pub fn has_cached(&self, space: &str) -> bool {
        self.spaces.read().contains_key(space)
    }

    /// Names of all existing spaces, sorted.
    pub fn space_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.spaces.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes every entry from `space`. A missing space is left missing.
    pub fn clear(&self, space: &str) {
        if let Some(cache) = self.cache(space) {
            cache.clear();
        }
    }

    /// Removes every entry from the default space.
    pub fn clear_default(&self) {
        self.clear(&self.default_space);
    }

    /// Forgets the space called `space`. A later reference builds a new one.
    pub fn drop_space(&self, space: &str) -> bool {
        let dropped = self.spaces.write().remove(space).is_some();
        if dropped {
            debug!(space, "dropped cache space");
        }
        dropped
    }

    // ----- entries -----

    /// Reads `key` from `space`. Never creates the space.
    pub fn get(&self, space: &str, key: &K) -> Option<V> {
        self.cache(space)?.get(key)
    }

    /// Reads `key` from the default space.
    pub fn get_default(&self, key: &K) -> Option<V> {
        self.get(&self.default_space, key)
    }

    /// Stores `key` in `space`, creating the space with `factory` if needed.
    /// Returns the previous value.
    pub fn put(&self, space: &str, factory: &str, key: K, value: V) -> Result<Option<V>> {
        Ok(self.if_not_exists_created(space, factory)?.put(key, value))
    }

    /// Stores `key` in the default space.
    pub fn put_default(&self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.default_cache()?.put(key, value))
    }

    /// Stores `key` in `space` unless present; returns the current value when
    /// it was.
    pub fn put_if_absent(&self, space: &str, factory: &str, key: K, value: V) -> Result<Option<V>> {
        Ok(self
            .if_not_exists_created(space, factory)?
            .put_if_absent(key, value))
    }

    /// [`put_if_absent`](Self::put_if_absent) on the default space.
    pub fn put_default_if_absent(&self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.default_cache()?.put_if_absent(key, value))
    }

    /// Removes `key` from `space`. Never creates the space.
    pub fn remove(&self, space: &str, key: &K) -> Option<V> {
        self.cache(space)?.remove(key)
    }

    /// Removes `key` from the default space.
    pub fn remove_default(&self, key: &K) -> Option<V> {
        self.remove(&self.default_space, key)
    }
}

impl<K, V> CacheManager<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Manager with the built-in factory set, every bounded cache holding
    /// `capacity` entries. The default factory is
    /// [`factory::CONCURRENT`].
    pub fn builtin(capacity: NonZeroUsize) -> Self {
        Self::from_config(&CacheManagerConfig {
            default_capacity: capacity,
            ..CacheManagerConfig::default()
        })
    }

    /// Manager with the built-in factory set, sized by `config`.
    pub fn from_config(config: &CacheManagerConfig) -> Self {
        let mut factories: HashMap<String, Arc<dyn CacheFactory<K, V>>> = HashMap::default();
        for (name, builder) in factory::builtin_factories(config) {
            factories.insert(name.to_string(), builder);
        }
        let default_factory = factory::CONCURRENT.to_string();
        let default_space = format!("{DEFAULT_SPACE_PREFIX}{}", default_factory.to_uppercase());
        debug!(
            factories = factories.len(),
            capacity = config.default_capacity.get(),
            "created cache manager with built-in factories"
        );
        Self {
            default_factory,
            default_space,
            factories: RwLock::new(factories),
            spaces: RwLock::new(HashMap::default()),
        }
    }
}

impl<K, V> Default for CacheManager<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::from_config(&CacheManagerConfig::default())
    }
}

impl<K, V> core::fmt::Debug for CacheManager<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CacheManager")
            .field("default_factory", &self.default_factory)
            .field("default_space", &self.default_space)
            .field("factories", &self.cache_factory_names())
            .field("spaces", &self.space_names())
            .finish()
    }
}
