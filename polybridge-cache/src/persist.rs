//! Durable persistence for opt-in namespaces.
//!
//! `flush` runs at process teardown, `restore` at process start. An index
//! file of persisted namespace names is written alongside the data files so
//! dynamically created namespaces are also restored. Every failure here is
//! non-fatal: the cache degrades to in-memory operation with a logged
//! warning.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::namespace::MetadataCache;
use crate::registry::CacheRegistry;

const INDEX_FILE: &str = "index.json";

/// Write all dirty persistent namespaces under `dir`, plus the name index.
///
/// Returns the number of namespaces written. Namespaces that are clean are
/// skipped but still listed in the index.
pub fn flush(registry: &CacheRegistry, dir: &Path) -> usize {
    let names = registry.persistent_names();
    if names.is_empty() {
        return 0;
    }

    if let Err(err) = fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %err, "cache flush skipped; cannot create directory");
        return 0;
    }

    let index_path = dir.join(INDEX_FILE);
    match serde_json::to_vec_pretty(&names) {
        Ok(bytes) => {
            if let Err(err) = fs::write(&index_path, bytes) {
                warn!(path = %index_path.display(), error = %err, "failed to write cache index");
                return 0;
            }
        }
        Err(err) => {
            warn!(error = %err, "failed to serialize cache index");
            return 0;
        }
    }

    let mut written = 0;
    for name in names {
        let flushed = registry.with_namespace(&name, |cache| {
            if !cache.is_dirty() {
                return false;
            }
            let path = dir.join(format!("{name}.json"));
            match serde_json::to_vec(&cache.to_serialized()) {
                Ok(bytes) => match fs::write(&path, bytes) {
                    Ok(()) => {
                        cache.mark_clean();
                        true
                    }
                    Err(err) => {
                        warn!(namespace = %name, error = %err, "failed to flush namespace");
                        false
                    }
                },
                Err(err) => {
                    warn!(namespace = %name, error = %err, "failed to serialize namespace");
                    false
                }
            }
        });
        if flushed {
            written += 1;
        }
    }

    debug!(count = written, dir = %dir.display(), "cache flush complete");
    written
}

/// Restore previously persisted namespaces from `dir`.
///
/// The index is read first so namespaces created dynamically in an earlier
/// run come back too. A missing directory or index is a clean first start,
/// not an error; unreadable namespace files are skipped with a warning.
pub fn restore(registry: &CacheRegistry, dir: &Path) -> usize {
    let index_path = dir.join(INDEX_FILE);
    let names: Vec<String> = match fs::read(&index_path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(names) => names,
            Err(err) => {
                warn!(path = %index_path.display(), error = %err, "cache index unreadable; starting in-memory");
                return 0;
            }
        },
        Err(_) => return 0,
    };

    let mut restored = 0;
    for name in names {
        let path = dir.join(format!("{name}.json"));
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(namespace = %name, error = %err, "persisted namespace missing; skipped");
                continue;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(serialized) => {
                registry.install(&name, MetadataCache::load_from_serialized(serialized));
                restored += 1;
            }
            Err(err) => {
                warn!(namespace = %name, error = %err, "persisted namespace corrupt; skipped");
            }
        }
    }

    debug!(count = restored, dir = %dir.display(), "cache restore complete");
    restored
}
