use cache_space::config::{FifoCacheConfig, LfuCacheConfig, LruCacheConfig};
use cache_space::{ConcurrentMapCache, FifoCache, LfuCache, LruCache};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::num::NonZeroUsize;

// Helper functions to create caches with the init pattern
fn make_fifo<K: std::hash::Hash + Eq + Clone, V: Clone>(cap: usize) -> FifoCache<K, V> {
    let config = FifoCacheConfig {
        capacity: NonZeroUsize::new(cap).unwrap(),
    };
    FifoCache::init(config, None)
}

fn make_lru<K: std::hash::Hash + Eq + Clone, V: Clone>(cap: usize) -> LruCache<K, V> {
    let config = LruCacheConfig {
        capacity: NonZeroUsize::new(cap).unwrap(),
    };
    LruCache::init(config, None)
}

fn make_lfu<K: std::hash::Hash + Eq + Clone, V: Clone>(cap: usize) -> LfuCache<K, V> {
    let config = LfuCacheConfig {
        capacity: NonZeroUsize::new(cap).unwrap(),
    };
    LfuCache::init(config, None)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    const CACHE_SIZE: usize = 1000;
    let mut group = c.benchmark_group("Cache Operations");

    // FIFO benchmarks
    {
        let cache = make_fifo(CACHE_SIZE);
        for i in 0..CACHE_SIZE {
            cache.put(i, i);
        }

        group.bench_function("FIFO get hit", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i % CACHE_SIZE)));
                }
            });
        });

        group.bench_function("FIFO put evicting", |b| {
            let mut next = CACHE_SIZE;
            b.iter(|| {
                for _ in 0..100 {
                    black_box(cache.put(next, next));
                    next += 1;
                }
            });
        });
    }

    // LRU benchmarks
    {
        let cache = make_lru(CACHE_SIZE);
        for i in 0..CACHE_SIZE {
            cache.put(i, i);
        }

        group.bench_function("LRU get hit", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i % CACHE_SIZE)));
                }
            });
        });

        group.bench_function("LRU get miss", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i + CACHE_SIZE)));
                }
            });
        });

        group.bench_function("LRU put existing", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.put(i % CACHE_SIZE, i));
                }
            });
        });
    }

    // LFU benchmarks
    {
        let cache = make_lfu(CACHE_SIZE);
        for i in 0..CACHE_SIZE {
            cache.put(i, i);
        }

        group.bench_function("LFU get hit", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i % CACHE_SIZE)));
                }
            });
        });

        // Frequencies keep climbing here, so this also shows that promotion
        // cost does not grow with the number of distinct frequencies.
        group.bench_function("LFU get hot key", |b| {
            b.iter(|| {
                for _ in 0..100 {
                    black_box(cache.get(&7));
                }
            });
        });

        group.bench_function("LFU put evicting", |b| {
            let mut next = CACHE_SIZE;
            b.iter(|| {
                for _ in 0..100 {
                    black_box(cache.put(next, next));
                    next += 1;
                }
            });
        });
    }

    // Concurrent map benchmarks
    {
        let cache = ConcurrentMapCache::new();
        for i in 0..CACHE_SIZE {
            cache.put(i, i);
        }

        group.bench_function("ConcurrentMap get hit", |b| {
            b.iter(|| {
                for i in 0..100 {
                    black_box(cache.get(&(i % CACHE_SIZE)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
