//! # Load Cache
//!
//! Every loader owns exactly one `LoadCache`, mapping a parent id to what was resolved for it.
//! Entries are only ever added or overwritten; nothing is evicted. A loader's cache lives as
//! long as the loader, so request-scoped data needs a freshly built loader per request.
//!
//! The map is a `DashMap`, so `load` calls from many tasks can read and fill it concurrently.
//! Guards are never held across an `.await`.

use dashmap::DashMap;
use std::hash::Hash;

pub struct LoadCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V>,
}

impl<K, V> Default for LoadCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> LoadCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the entry for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Stores `value` under `key`, returning the replaced entry.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of every cached value. Order follows the map's iteration order.
    pub fn values(&self) -> Vec<V> {
        self.entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
