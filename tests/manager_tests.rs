//! Cache Manager Tests
//!
//! Exercises the factory registry, lazy space creation and the built-in
//! factory set through the public API only.

use cache_space::config::CacheManagerConfig;
use cache_space::factory::{
    CONCURRENT, FIFO, LFU, LRU, THREAD_LOCAL_CONCURRENT, THREAD_LOCAL_FIFO, THREAD_LOCAL_LFU,
    THREAD_LOCAL_LRU,
};
use cache_space::{Cache, CacheError, CacheFactory, CacheManager, LfuCache};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn manager(cap: usize) -> CacheManager<String, String> {
    CacheManager::builtin(NonZeroUsize::new(cap).unwrap())
}

fn key(k: &str) -> String {
    k.to_string()
}

/// Factory that counts how many caches it built.
struct CountingLfu {
    built: Arc<AtomicUsize>,
    capacity: usize,
}

impl CacheFactory<String, String> for CountingLfu {
    fn create_cache(&self) -> Arc<dyn Cache<String, String>> {
        self.built.fetch_add(1, Ordering::SeqCst);
        Arc::new(LfuCache::<String, String>::try_new(self.capacity).unwrap())
    }
}

// ============================================================================
// FACTORY REGISTRY
// ============================================================================

#[test]
fn test_builtin_factory_names() {
    let manager = manager(8);
    let mut expected = vec![
        CONCURRENT,
        LRU,
        LFU,
        FIFO,
        THREAD_LOCAL_LRU,
        THREAD_LOCAL_LFU,
        THREAD_LOCAL_FIFO,
        THREAD_LOCAL_CONCURRENT,
    ];
    expected.sort_unstable();
    assert_eq!(manager.cache_factory_names(), expected);
    assert_eq!(manager.default_factory_name(), CONCURRENT);
}

#[test]
fn test_duplicate_registration_fails_and_keeps_original() {
    let manager = manager(8);
    let built = Arc::new(AtomicUsize::new(0));
    let err = manager
        .register_cache_factory(
            LRU,
            CountingLfu {
                built: Arc::clone(&built),
                capacity: 1,
            },
        )
        .unwrap_err();
    assert_eq!(err, CacheError::DuplicateFactory { name: key(LRU) });

    let cache = manager.if_not_exists_created("s", LRU).unwrap();
    assert_eq!(cache.capacity(), Some(8));
    assert_eq!(built.load(Ordering::SeqCst), 0);
}

#[test]
fn test_custom_factory_registration_and_removal() {
    let manager = manager(8);
    let built = Arc::new(AtomicUsize::new(0));
    manager
        .register_cache_factory(
            "tiny-lfu",
            CountingLfu {
                built: Arc::clone(&built),
                capacity: 2,
            },
        )
        .unwrap();
    assert!(manager.has_cache_factory("tiny-lfu"));

    manager.put("a", "tiny-lfu", key("k1"), key("v1")).unwrap();
    manager.put("b", "tiny-lfu", key("k1"), key("v1")).unwrap();
    manager.put("a", "tiny-lfu", key("k2"), key("v2")).unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);

    let removed = manager.remove_cache_factory("tiny-lfu").unwrap();
    assert!(removed.is_some());
    // Spaces built by a removed factory survive.
    assert_eq!(manager.get("a", &key("k2")), Some(key("v2")));
    assert_eq!(
        manager.put("c", "tiny-lfu", key("k"), key("v")),
        Err(CacheError::UnknownFactory {
            name: key("tiny-lfu")
        })
    );
}

#[test]
fn test_default_factory_cannot_be_removed() {
    let manager = manager(8);
    assert_eq!(
        manager.remove_cache_factory(CONCURRENT).err(),
        Some(CacheError::ProtectedDefaultFactory {
            name: key(CONCURRENT)
        })
    );
    assert!(manager.has_cache_factory(CONCURRENT));
}

#[test]
fn test_custom_default_factory() {
    let built = Arc::new(AtomicUsize::new(0));
    let manager = CacheManager::new(
        "counting",
        CountingLfu {
            built: Arc::clone(&built),
            capacity: 3,
        },
    )
    .unwrap();
    assert_eq!(manager.default_space_name(), "DEF-CACHE-SPACE:COUNTING");
    assert_eq!(manager.cache_factory_names(), vec![key("counting")]);

    manager.put_default(key("a"), key("1")).unwrap();
    manager.put_default(key("b"), key("2")).unwrap();
    assert_eq!(manager.default_cache().unwrap().capacity(), Some(3));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

// ============================================================================
// CACHE SPACES
// ============================================================================

#[test]
fn test_spaces_are_independent() {
    let manager = manager(8);
    manager.put("one", LRU, key("k"), key("from-one")).unwrap();
    manager.put("two", FIFO, key("k"), key("from-two")).unwrap();

    assert_eq!(manager.get("one", &key("k")), Some(key("from-one")));
    assert_eq!(manager.get("two", &key("k")), Some(key("from-two")));
    assert_eq!(manager.space_names(), vec![key("one"), key("two")]);

    manager.clear("one");
    assert_eq!(manager.get("one", &key("k")), None);
    assert_eq!(manager.get("two", &key("k")), Some(key("from-two")));
}

#[test]
fn test_space_uses_factory_policy() {
    let manager = manager(2);
    manager.put("lfu-space", LFU, key("A"), key("a")).unwrap();
    manager.put("lfu-space", LFU, key("B"), key("b")).unwrap();
    manager.get("lfu-space", &key("A"));
    manager.put("lfu-space", LFU, key("C"), key("c")).unwrap();

    let cache = manager.cache("lfu-space").unwrap();
    assert!(!cache.contains_key(&key("B")));
    assert!(cache.contains_key(&key("A")));
    assert!(cache.contains_key(&key("C")));
}

#[test]
fn test_reads_never_create_spaces() {
    let manager = manager(4);
    assert_eq!(manager.get("ghost", &key("k")), None);
    assert_eq!(manager.remove("ghost", &key("k")), None);
    manager.clear("ghost");
    assert!(!manager.has_cached("ghost"));
    assert_eq!(manager.get_default(&key("k")), None);
    assert!(!manager.has_cached(manager.default_space_name()));
}

#[test]
fn test_drop_space_then_recreate() {
    let manager = manager(4);
    let first = manager.if_not_exists_created("s", LRU).unwrap();
    first.put(key("k"), key("v"));
    assert!(manager.drop_space("s"));

    let second = manager.if_not_exists_created("s", FIFO).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.get(&key("k")), None);
    // The dropped instance stays usable by whoever still holds it.
    assert_eq!(first.get(&key("k")), Some(key("v")));
}

#[test]
fn test_from_config() {
    let config = CacheManagerConfig {
        default_capacity: NonZeroUsize::new(3).unwrap(),
        segments: 4,
    };
    let manager: CacheManager<String, String> = CacheManager::from_config(&config);
    let fifo = manager.if_not_exists_created("f", FIFO).unwrap();
    for i in 0..10 {
        fifo.put(i.to_string(), i.to_string());
    }
    assert_eq!(fifo.len(), 3);

    let map = manager.default_cache().unwrap();
    for i in 0..10 {
        map.put(i.to_string(), i.to_string());
    }
    assert_eq!(map.len(), 10);
}

#[test]
fn test_default_manager_uses_default_capacity() {
    let manager: CacheManager<u32, u32> = CacheManager::default();
    let lru = manager.if_not_exists_created("lru", LRU).unwrap();
    assert_eq!(lru.capacity(), Some(cache_space::config::manager::DEFAULT_CAPACITY));
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_racing_first_callers_observe_one_instance() {
    let built = Arc::new(AtomicUsize::new(0));
    let manager = Arc::new(
        CacheManager::new(
            "counting",
            CountingLfu {
                built: Arc::clone(&built),
                capacity: 16,
            },
        )
        .unwrap(),
    );

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let cache = manager.if_not_exists_created("shared", "counting").unwrap();
                cache.put(format!("t{t}"), t.to_string());
                cache
            })
        })
        .collect();

    let caches: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();
    assert_eq!(built.load(Ordering::SeqCst), 1);
    for cache in &caches {
        assert!(Arc::ptr_eq(cache, &caches[0]));
    }
    assert_eq!(caches[0].len(), 16);
}

#[test]
fn test_thread_local_space_isolates_threads() {
    let manager = Arc::new(manager(8));
    manager
        .put("per-thread", THREAD_LOCAL_LRU, key("k"), key("main"))
        .unwrap();

    let worker = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || {
            assert_eq!(manager.get("per-thread", &key("k")), None);
            manager
                .put("per-thread", THREAD_LOCAL_LRU, key("k"), key("worker"))
                .unwrap();
            manager.get("per-thread", &key("k"))
        })
    };

    assert_eq!(worker.join().unwrap(), Some(key("worker")));
    assert_eq!(manager.get("per-thread", &key("k")), Some(key("main")));
}
