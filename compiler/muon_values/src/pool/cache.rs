//! Sharded, bounded interning cache.
//!
//! Maps a normalized key to the one `Value` built for it. Reads take a
//! shard read lock; inserts re-check under the write lock so concurrent
//! builders of the same key all receive the first stored value.

use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::value::Value;

const NUM_SHARDS: usize = 16;

pub(crate) struct InternCache<K> {
    name: &'static str,
    shards: [RwLock<FxHashMap<K, Value>>; NUM_SHARDS],
    /// Entries across all shards.
    len: AtomicUsize,
    capacity: usize,
    saturated: AtomicBool,
}

impl<K: Hash + Eq> InternCache<K> {
    pub(crate) fn new(name: &'static str, capacity: usize) -> Self {
        InternCache {
            name,
            shards: std::array::from_fn(|_| RwLock::new(FxHashMap::default())),
            len: AtomicUsize::new(0),
            capacity,
            saturated: AtomicBool::new(false),
        }
    }

    #[inline]
    fn shard_for(key: &K) -> usize {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "reduced modulo NUM_SHARDS (16) first"
        )]
        let index = (FxBuildHasher.hash_one(key) % NUM_SHARDS as u64) as usize;
        index
    }

    /// The cached value for `key`, building and remembering it with `make`
    /// on a miss.
    ///
    /// `make` runs without any lock held. Once the cache is full, misses
    /// return a fresh value that is not remembered.
    pub(crate) fn intern(&self, key: K, make: impl FnOnce() -> Value) -> Value {
        let shard = &self.shards[Self::shard_for(&key)];

        if let Some(found) = shard.read().get(&key) {
            return found.clone();
        }

        let value = make();
        let mut guard = shard.write();
        if let Some(found) = guard.get(&key) {
            return found.clone();
        }
        if self.len.load(Ordering::Relaxed) >= self.capacity {
            if !self.saturated.swap(true, Ordering::Relaxed) {
                tracing::debug!(
                    cache = self.name,
                    capacity = self.capacity,
                    "interning cache full; further values are not cached"
                );
            }
            return value;
        }
        guard.insert(key, value.clone());
        self.len.fetch_add(1, Ordering::Relaxed);
        value
    }

    pub(crate) fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests;
