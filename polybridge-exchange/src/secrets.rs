//! Secret storage collaborator boundary.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Key namespace prefix for bridge-owned secrets.
pub const SECRET_NAMESPACE: &str = "polybridge";

/// Build the storage key for a provider credential.
#[must_use]
pub fn secret_key(provider_key: &str) -> String {
    format!("{SECRET_NAMESPACE}.apiKey.{provider_key}")
}

/// Keyed credential storage.
pub trait SecretStore: Send + Sync {
    /// Fetch a secret.
    fn get(&self, key: &str) -> Option<String>;
    /// Store a secret.
    fn store(&self, key: &str, value: &str);
    /// Remove a secret.
    fn delete(&self, key: &str);
}

/// In-memory secret store, for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) {
        self.inner.write().insert(key.to_string(), value.to_string());
    }

    fn delete(&self, key: &str) {
        self.inner.write().remove(key);
    }
}
