//! Request-scoped memoization cache.
//!
//! ## Architecture
//! - Keys are stored in an `FxHashMap<Key, Arc<V>>` for O(1) lookup; values
//!   are handed out as `Arc` clones so the loader never needs `V: Clone`.
//! - No capacity limit and no expiry: entries live until explicitly removed
//!   or the owning loader is dropped. This is a request cache, not a shared
//!   store.
//!
//! ## Core Operations
//! - `insert` / `merge`: unconditional overwrite, returns the previous value.
//! - `get` / `get_many`: fetch by key; `get_many` omits absent keys rather
//!   than writing placeholders.
//! - `remove` / `remove_many` / `clear`: explicit eviction only.
//!
//! ## Invariant
//! A key present here is never re-fetched by a read until it is removed;
//! the loader's diff step treats presence as resolved.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::key::Key;

/// `Key -> Arc<V>` memoization store scoped to one loader's lifetime.
#[derive(Debug)]
pub struct RequestCache<V> {
    map: FxHashMap<Key, Arc<V>>,
}

impl<V> Default for RequestCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RequestCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    /// Returns `true` if an entry exists for `key`.
    pub fn contains(&self, key: &Key) -> bool {
        self.map.contains_key(key)
    }

    /// Fetches the entry for `key`, if present.
    pub fn get(&self, key: &Key) -> Option<Arc<V>> {
        self.map.get(key).cloned()
    }

    /// Fetches the entries for every key in `keys` that is present.
    ///
    /// Absent keys are simply omitted; callers distinguish "not yet
    /// fetched" from "fetched absent" with [`contains`](RequestCache::contains).
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use loadkit::cache::RequestCache;
    /// use loadkit::key::Key;
    ///
    /// let mut cache = RequestCache::new();
    /// cache.insert(Key::Int(1), Arc::new("one"));
    ///
    /// let found = cache.get_many(&[Key::Int(1), Key::Int(2)]);
    /// assert_eq!(found.len(), 1);
    /// assert!(found.contains_key(&Key::Int(1)));
    /// ```
    pub fn get_many(&self, keys: &[Key]) -> FxHashMap<Key, Arc<V>> {
        keys.iter()
            .filter_map(|key| self.map.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    }

    /// Inserts or overwrites an entry, returning the previous value.
    pub fn insert(&mut self, key: Key, value: Arc<V>) -> Option<Arc<V>> {
        self.map.insert(key, value)
    }

    /// Inserts every `(key, value)` pair, overwriting existing entries.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = (Key, Arc<V>)>) -> &mut Self {
        self.map.extend(entries);
        self
    }

    /// Removes the entry for `key`, returning it. No-op when absent.
    pub fn remove(&mut self, key: &Key) -> Option<Arc<V>> {
        self.map.remove(key)
    }

    /// Removes the entries for every key in `keys`. Absent keys are skipped.
    pub fn remove_many(&mut self, keys: &[Key]) -> &mut Self {
        for key in keys {
            self.map.remove(key);
        }
        self
    }

    /// Empties the cache unconditionally.
    pub fn clear(&mut self) -> &mut Self {
        self.map.clear();
        self
    }

    /// Copies out the cached keys, in no particular order.
    pub fn keys(&self) -> Vec<Key> {
        self.map.keys().cloned().collect()
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
