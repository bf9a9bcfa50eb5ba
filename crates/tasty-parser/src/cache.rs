//! Bounded memo cache shared by the parser and the renderer.
//!
//! # Eviction policy
//!
//! Two strategies are available:
//!
//! - [`EvictionPolicy::Lru`] drops the least recently used entry once the
//!   ceiling is reached. This is the default.
//! - [`EvictionPolicy::ClearAll`] empties the whole cache when an insert
//!   would exceed the ceiling. Every lookup after a clear misses until the
//!   cache warms up again.
//!
//! # Thread safety
//!
//! The cache is not `Sync`. Owners wrap it in a `Mutex`.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};

/// Eviction strategy used once a cache reaches its ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// Evict the least recently used entry.
    #[default]
    Lru,
    /// Drop every entry at once.
    ClearAll,
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
    /// Entries currently stored.
    pub size: usize,
    /// Maximum number of entries.
    pub capacity: usize,
    /// Number of wholesale clears (ceiling breaches or explicit).
    pub clears: u64,
}

enum Store<K, V> {
    Lru(LruCache<K, V>),
    ClearAll(HashMap<K, V>),
}

/// A bounded key/value memo with configurable eviction.
pub struct StyleCache<K, V> {
    store: Store<K, V>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> std::fmt::Debug for StyleCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleCache")
            .field("policy", &self.policy())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<K: Hash + Eq, V: Clone> StyleCache<K, V> {
    /// Creates a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let store = match policy {
            EvictionPolicy::Lru => Store::Lru(LruCache::new(cap)),
            EvictionPolicy::ClearAll => Store::ClearAll(HashMap::new()),
        };
        Self {
            store,
            capacity: cap.get(),
            stats: CacheStats {
                capacity: cap.get(),
                ..Default::default()
            },
        }
    }

    /// Looks up a key, counting the hit or miss.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let found = match &mut self.store {
            Store::Lru(cache) => cache.get(key).cloned(),
            Store::ClearAll(map) => map.get(key).cloned(),
        };
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    /// Stores a value, evicting according to the policy.
    pub fn insert(&mut self, key: K, value: V) {
        match &mut self.store {
            Store::Lru(cache) => {
                cache.put(key, value);
            }
            Store::ClearAll(map) => {
                if map.len() >= self.capacity && !map.contains_key(&key) {
                    tracing::debug!(capacity = self.capacity, "cache ceiling reached, clearing");
                    map.clear();
                    self.stats.clears += 1;
                }
                map.insert(key, value);
            }
        }
    }

    /// Returns the cached value or computes, stores and returns it.
    pub fn get_or_insert_with(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        match &mut self.store {
            Store::Lru(cache) => cache.clear(),
            Store::ClearAll(map) => map.clear(),
        }
        self.stats.clears += 1;
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        match &self.store {
            Store::Lru(cache) => cache.len(),
            Store::ClearAll(map) => map.len(),
        }
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            ..self.stats
        }
    }
}

impl<K, V> StyleCache<K, V> {
    /// The eviction policy this cache was built with.
    pub fn policy(&self) -> EvictionPolicy {
        match self.store {
            Store::Lru(_) => EvictionPolicy::Lru,
            Store::ClearAll(_) => EvictionPolicy::ClearAll,
        }
    }
}
