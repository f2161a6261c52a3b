//! Registry indexing metadata namespaces by name.
//!
//! Unrelated concerns (tool continuation tokens, pending reasoning text,
//! last response id) each get their own namespace so keys never collide.
//! The registry is an explicitly constructed service object passed by
//! reference; tests build isolated instances.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use crate::namespace::{MetadataCache, DEFAULT_CAPACITY};

/// Namespace holding per-call tool continuation tokens.
pub const NS_TOOL_TOKENS: &str = "tool_continuation";
/// Namespace holding reasoning text pending replay on the next turn.
pub const NS_PENDING_REASONING: &str = "pending_reasoning";
/// Namespace holding the last provider response id per conversation.
pub const NS_LAST_RESPONSE: &str = "last_response_id";

#[derive(Debug)]
struct NamespaceState {
    cache: MetadataCache,
    persistent: bool,
}

/// Process-wide index of metadata namespaces.
///
/// All operations are synchronous map mutations behind a read/write lock,
/// safe under interleaving from concurrent exchanges.
#[derive(Debug, Default)]
pub struct CacheRegistry {
    namespaces: RwLock<IndexMap<String, NamespaceState>>,
}

impl CacheRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a namespace's capacity and persistence, creating it if
    /// needed. Existing entries are retained (and trimmed to the new
    /// capacity).
    pub fn configure(&self, name: impl Into<String>, capacity: usize, persistent: bool) {
        let mut namespaces = self.namespaces.write();
        let state = namespaces
            .entry(name.into())
            .or_insert_with(|| NamespaceState {
                cache: MetadataCache::with_capacity(capacity),
                persistent,
            });
        state.cache.set_capacity(capacity);
        state.persistent = persistent;
    }

    /// Look up a value, cloning it out of the namespace.
    #[must_use]
    pub fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.namespaces
            .read()
            .get(namespace)
            .and_then(|state| state.cache.get(key).cloned())
    }

    /// Insert a value, creating the namespace on demand.
    pub fn set(&self, namespace: &str, key: impl Into<String>, value: Value) {
        let mut namespaces = self.namespaces.write();
        let state = namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| NamespaceState {
                cache: MetadataCache::with_capacity(DEFAULT_CAPACITY),
                persistent: false,
            });
        state.cache.set(key, value);
    }

    /// Remove a value.
    pub fn delete(&self, namespace: &str, key: &str) -> Option<Value> {
        self.namespaces
            .write()
            .get_mut(namespace)
            .and_then(|state| state.cache.delete(key))
    }

    /// Check for a key.
    #[must_use]
    pub fn has(&self, namespace: &str, key: &str) -> bool {
        self.namespaces
            .read()
            .get(namespace)
            .is_some_and(|state| state.cache.has(key))
    }

    /// Number of entries in a namespace.
    #[must_use]
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .get(namespace)
            .map_or(0, |state| state.cache.len())
    }

    /// Check if a namespace is absent or empty.
    #[must_use]
    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }

    /// Names of namespaces flagged for durable persistence.
    #[must_use]
    pub fn persistent_names(&self) -> Vec<String> {
        self.namespaces
            .read()
            .iter()
            .filter(|(_, state)| state.persistent)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Run a closure against one namespace's cache, creating it on demand.
    pub fn with_namespace<R>(&self, name: &str, f: impl FnOnce(&mut MetadataCache) -> R) -> R {
        let mut namespaces = self.namespaces.write();
        let state = namespaces
            .entry(name.to_string())
            .or_insert_with(|| NamespaceState {
                cache: MetadataCache::with_capacity(DEFAULT_CAPACITY),
                persistent: false,
            });
        f(&mut state.cache)
    }

    /// Install a restored namespace, marking it persistent.
    pub fn install(&self, name: impl Into<String>, cache: MetadataCache) {
        self.namespaces.write().insert(
            name.into(),
            NamespaceState {
                cache,
                persistent: true,
            },
        );
    }
}
