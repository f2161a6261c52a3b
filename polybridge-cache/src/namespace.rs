//! A single bounded metadata namespace.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default per-namespace capacity.
pub const DEFAULT_CAPACITY: usize = 500;

/// A bounded key/value store holding opaque per-turn continuation data.
///
/// Insertion order is preserved; when the store exceeds its capacity the
/// oldest entry is evicted first. Overwriting an existing key keeps its
/// original position in the eviction queue.
#[derive(Debug, Clone)]
pub struct MetadataCache {
    entries: IndexMap<String, Value>,
    capacity: usize,
    dirty: bool,
}

impl MetadataCache {
    /// Create a cache with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache with an explicit capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
            dirty: false,
        }
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite a value, evicting the oldest entries if the
    /// capacity is exceeded.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
        while self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.dirty = true;
    }

    /// Remove a value, returning it if present.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.shift_remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Check for a key.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting oldest entries if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
            self.dirty = true;
        }
    }

    /// Whether the cache has been mutated since the last [`mark_clean`].
    ///
    /// [`mark_clean`]: MetadataCache::mark_clean
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset the dirty flag, typically after a successful flush.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Serialize to a persistence-friendly form, preserving entry order.
    #[must_use]
    pub fn to_serialized(&self) -> SerializedNamespace {
        SerializedNamespace {
            capacity: self.capacity,
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Rebuild a cache from its serialized form. The restored cache is clean.
    #[must_use]
    pub fn load_from_serialized(serialized: SerializedNamespace) -> Self {
        let mut cache = Self::with_capacity(serialized.capacity);
        for (key, value) in serialized.entries {
            cache.entries.insert(key, value);
        }
        while cache.entries.len() > cache.capacity {
            cache.entries.shift_remove_index(0);
        }
        cache
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Durable form of one namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedNamespace {
    /// Configured capacity at serialization time.
    pub capacity: usize,
    /// Entries in insertion (eviction) order.
    pub entries: Vec<(String, Value)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_delete() {
        let mut cache = MetadataCache::new();
        cache.set("k1", json!("v1"));
        assert_eq!(cache.get("k1"), Some(&json!("v1")));
        assert!(cache.has("k1"));
        assert_eq!(cache.delete("k1"), Some(json!("v1")));
        assert!(!cache.has("k1"));
    }

    #[test]
    fn test_fifo_eviction_bound() {
        let capacity = 4;
        let mut cache = MetadataCache::with_capacity(capacity);
        for i in 0..=capacity {
            cache.set(format!("k{i}"), json!(i));
        }
        assert_eq!(cache.len(), capacity);
        // First-inserted key evicted, newest retained.
        assert!(!cache.has("k0"));
        assert!(cache.has(&format!("k{capacity}")));
    }

    #[test]
    fn test_overwrite_does_not_grow() {
        let mut cache = MetadataCache::with_capacity(2);
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.set("a", json!(3));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(&json!(3)));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut cache = MetadataCache::new();
        assert!(!cache.is_dirty());
        cache.set("k", json!(1));
        assert!(cache.is_dirty());
        cache.mark_clean();
        assert!(!cache.is_dirty());
        // Deleting a missing key is not a mutation.
        cache.delete("missing");
        assert!(!cache.is_dirty());
        cache.delete("k");
        assert!(cache.is_dirty());
    }

    #[test]
    fn test_serialized_roundtrip() {
        let mut cache = MetadataCache::with_capacity(10);
        cache.set("first", json!({"token": "abc"}));
        cache.set("second", json!(2));

        let restored = MetadataCache::load_from_serialized(cache.to_serialized());
        assert_eq!(restored.capacity(), 10);
        assert_eq!(restored.get("first"), Some(&json!({"token": "abc"})));
        assert!(!restored.is_dirty());

        // Order survives: inserting one more evicts "first", not "second".
        let mut restored = restored;
        restored.set_capacity(2);
        restored.set("third", json!(3));
        assert!(!restored.has("first"));
        assert!(restored.has("second"));
    }
}
