//! Property Tests Against Reference Models
//!
//! Each bounded policy is driven with random operation sequences and compared,
//! step by step, with a deliberately naive model of the same policy. The
//! models are slow (linear scans) but obviously correct.

use cache_space::{Cache, ConcurrentMapCache, FifoCache, LfuCache, LruCache};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u16),
    Get(u8),
    Remove(u8),
    Contains(u8),
    PutIfAbsent(u8, u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..12, any::<u16>()).prop_map(|(k, v)| Op::Put(k, v)),
        4 => (0u8..12).prop_map(Op::Get),
        1 => (0u8..12).prop_map(Op::Remove),
        1 => (0u8..12).prop_map(Op::Contains),
        1 => (0u8..12, any::<u16>()).prop_map(|(k, v)| Op::PutIfAbsent(k, v)),
    ]
}

trait Model {
    fn get(&mut self, key: u8) -> Option<u16>;
    fn put(&mut self, key: u8, value: u16) -> Option<u16>;
    fn remove(&mut self, key: u8) -> Option<u16>;
    fn contains(&self, key: u8) -> bool;
    fn len(&self) -> usize;
    /// Keys in the order the cache reports them.
    fn keys(&self) -> Vec<u8>;

    fn put_if_absent(&mut self, key: u8, value: u16) -> Option<u16> {
        match self.get(key) {
            Some(current) => Some(current),
            None => self.put(key, value),
        }
    }
}

/// Insertion order, oldest first.
struct FifoModel {
    cap: usize,
    entries: VecDeque<(u8, u16)>,
}

impl Model for FifoModel {
    fn get(&mut self, key: u8) -> Option<u16> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    fn put(&mut self, key: u8, value: u16) -> Option<u16> {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut entry.1, value));
        }
        if self.entries.len() == self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back((key, value));
        None
    }

    fn remove(&mut self, key: u8) -> Option<u16> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        self.entries.remove(pos).map(|(_, v)| v)
    }

    fn contains(&self, key: u8) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<u8> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }
}

/// Access order, most recent first.
struct LruModel {
    cap: usize,
    entries: VecDeque<(u8, u16)>,
}

impl Model for LruModel {
    fn get(&mut self, key: u8) -> Option<u16> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_front(entry);
        Some(entry.1)
    }

    fn put(&mut self, key: u8, value: u16) -> Option<u16> {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            let (_, old) = self.entries.remove(pos)?;
            self.entries.push_front((key, value));
            return Some(old);
        }
        if self.entries.len() == self.cap {
            self.entries.pop_back();
        }
        self.entries.push_front((key, value));
        None
    }

    fn remove(&mut self, key: u8) -> Option<u16> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        self.entries.remove(pos).map(|(_, v)| v)
    }

    fn contains(&self, key: u8) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<u8> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }
}

/// Frequency plus the tick at which the entry reached that frequency; the
/// eviction victim has the smallest `(frequency, tick)`.
struct LfuModel {
    cap: usize,
    tick: u64,
    entries: HashMap<u8, (u16, u64, u64)>,
}

impl LfuModel {
    fn bump(&mut self, key: u8) {
        self.tick += 1;
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.1 += 1;
            entry.2 = self.tick;
        }
    }
}

impl Model for LfuModel {
    fn get(&mut self, key: u8) -> Option<u16> {
        let value = self.entries.get(&key)?.0;
        self.bump(key);
        Some(value)
    }

    fn put(&mut self, key: u8, value: u16) -> Option<u16> {
        if let Some(entry) = self.entries.get_mut(&key) {
            let old = std::mem::replace(&mut entry.0, value);
            self.bump(key);
            return Some(old);
        }
        if self.entries.len() == self.cap {
            let victim = self
                .entries
                .iter()
                .min_by_key(|(_, (_, freq, tick))| (*freq, *tick))
                .map(|(k, _)| *k);
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }
        self.tick += 1;
        self.entries.insert(key, (value, 1, self.tick));
        None
    }

    fn remove(&mut self, key: u8) -> Option<u16> {
        self.entries.remove(&key).map(|(v, _, _)| v)
    }

    fn contains(&self, key: u8) -> bool {
        self.entries.contains_key(&key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<u8> {
        let mut keyed: Vec<_> = self
            .entries
            .iter()
            .map(|(k, (_, freq, tick))| ((*freq, *tick), *k))
            .collect();
        keyed.sort_unstable();
        keyed.into_iter().map(|(_, k)| k).collect()
    }
}

fn check_against_model<M: Model>(
    cache: &dyn Cache<u8, u16>,
    cache_keys: impl Fn() -> Vec<u8>,
    mut model: M,
    cap: Option<usize>,
    ops: &[Op],
) -> Result<(), TestCaseError> {
    for op in ops {
        match *op {
            Op::Put(k, v) => prop_assert_eq!(cache.put(k, v), model.put(k, v), "{:?}", op),
            Op::Get(k) => prop_assert_eq!(cache.get(&k), model.get(k), "{:?}", op),
            Op::Remove(k) => prop_assert_eq!(cache.remove(&k), model.remove(k), "{:?}", op),
            Op::Contains(k) => prop_assert_eq!(cache.contains_key(&k), model.contains(k)),
            Op::PutIfAbsent(k, v) => prop_assert_eq!(
                cache.put_if_absent(k, v),
                model.put_if_absent(k, v),
                "{:?}",
                op
            ),
        }
        prop_assert_eq!(cache.len(), model.len());
        if let Some(cap) = cap {
            prop_assert!(cache.len() <= cap);
        }
    }
    prop_assert_eq!(cache_keys(), model.keys());
    Ok(())
}

proptest! {
    #[test]
    fn fifo_matches_model(cap in 1usize..6, ops in prop::collection::vec(op_strategy(), 0..200)) {
        let cache = FifoCache::<u8, u16>::try_new(cap).unwrap();
        let model = FifoModel { cap, entries: VecDeque::new() };
        check_against_model(&cache, || cache.keys(), model, Some(cap), &ops)?;
    }

    #[test]
    fn lru_matches_model(cap in 1usize..6, ops in prop::collection::vec(op_strategy(), 0..200)) {
        let cache = LruCache::<u8, u16>::try_new(cap).unwrap();
        let model = LruModel { cap, entries: VecDeque::new() };
        check_against_model(&cache, || cache.keys(), model, Some(cap), &ops)?;
    }

    #[test]
    fn lfu_matches_model(cap in 1usize..6, ops in prop::collection::vec(op_strategy(), 0..200)) {
        let cache = LfuCache::<u8, u16>::try_new(cap).unwrap();
        let model = LfuModel { cap, tick: 0, entries: HashMap::new() };
        check_against_model(&cache, || cache.keys(), model, Some(cap), &ops)?;
    }

    #[test]
    fn concurrent_map_never_forgets(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let cache = ConcurrentMapCache::<u8, u16>::new();
        let mut reference: HashMap<u8, u16> = HashMap::new();
        for op in &ops {
            match *op {
                Op::Put(k, v) => prop_assert_eq!(cache.put(k, v), reference.insert(k, v)),
                Op::Get(k) => prop_assert_eq!(cache.get(&k), reference.get(&k).copied()),
                Op::Remove(k) => prop_assert_eq!(cache.remove(&k), reference.remove(&k)),
                Op::Contains(k) => prop_assert_eq!(cache.contains_key(&k), reference.contains_key(&k)),
                Op::PutIfAbsent(k, v) => {
                    let expected = reference.get(&k).copied();
                    if expected.is_none() {
                        reference.insert(k, v);
                    }
                    prop_assert_eq!(cache.put_if_absent(k, v), expected);
                }
            }
        }
        prop_assert_eq!(cache.len(), reference.len());
    }
}
