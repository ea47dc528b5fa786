//! Walk-through of cache spaces: built-in factories, a custom factory, lazy
//! creation and per-thread spaces.
//!
//! Run with `RUST_LOG=cache_space=trace` to see space creation and evictions.

use cache_space::factory::{LFU, LRU, THREAD_LOCAL_FIFO};
use cache_space::{Cache, CacheManager, CacheMetrics, LfuCache};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> cache_space::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_space=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let manager: Arc<CacheManager<String, String>> =
        Arc::new(CacheManager::builtin(NonZeroUsize::new(3).unwrap()));
    println!("factories: {:?}", manager.cache_factory_names());

    // Spaces appear on first write.
    for user in ["ada", "grace", "linus", "barbara"] {
        manager.put("sessions", LRU, user.to_string(), format!("token-{user}"))?;
    }
    println!(
        "sessions keeps the 3 most recent users; ada present: {}",
        manager.get("sessions", &"ada".to_string()).is_some()
    );

    // A custom factory with its own capacity.
    let hot = Arc::new(LfuCache::<String, String>::try_new(2)?);
    let shared = Arc::clone(&hot);
    manager.register_cache_factory("shared-lfu", move || -> Arc<dyn Cache<String, String>> {
        Arc::clone(&shared) as Arc<dyn Cache<String, String>>
    })?;
    manager.put("hot", "shared-lfu", "a".into(), "1".into())?;
    manager.put("hot", "shared-lfu", "b".into(), "2".into())?;
    manager.get("hot", &"a".to_string());
    manager.put("hot", "shared-lfu", "c".into(), "3".into())?;
    println!("hot keys in eviction order: {:?}", hot.keys());
    println!("hot metrics: {:?}", hot.metrics());

    // Registering a taken name fails and keeps the original.
    if let Err(err) = manager.register_cache_factory(LFU, || -> Arc<dyn Cache<String, String>> {
        Arc::new(LfuCache::<String, String>::new(NonZeroUsize::MIN))
    }) {
        println!("expected failure: {err}");
    }

    // Per-thread spaces.
    manager.put("scratch", THREAD_LOCAL_FIFO, "owner".into(), "main".into())?;
    let worker = {
        let manager = Arc::clone(&manager);
        thread::spawn(move || manager.get("scratch", &"owner".to_string()))
    };
    println!(
        "worker sees main's scratch entry: {:?}",
        worker.join().ok().flatten()
    );

    manager.put_default("greeting".into(), "hello".into())?;
    println!("spaces: {:?}", manager.space_names());
    Ok(())
}
