//! Durable key-value store behind the profile fields and the usage history.
//!
//! Values are plain strings; composite values are JSON-encoded by the caller.
//! Two backends: an in-memory map (default, tests) and a JSON file rewritten
//! on every `set`.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, instrument};

use crate::error::{Error, Result};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage("store lock poisoned".into())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Whole map kept in memory and flushed to `path` as pretty JSON on each write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    map: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store file. A missing file starts empty.
    #[instrument(level = "info", skip_all)]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let map = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            HashMap::new()
        };
        debug!(target: "sandbox_backend", path = %path.display(), keys = map.len(), "Opened JSON store");
        Ok(Self { path, map: RwLock::new(map) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        let written = fs::write(&tmp, body).and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.write().map_err(poisoned)?;
        // only publish the new value once it is on disk
        let mut next = map.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *map = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set() {
        let s = MemoryStore::new();
        assert_eq!(s.get("k").unwrap(), None);
        s.set("k", "v").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");
        {
            let s = JsonFileStore::open(&path).unwrap();
            s.set("build-session-count", "4").unwrap();
        }
        let s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get("build-session-count").unwrap().as_deref(), Some("4"));
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(Error::Serialization(_))));
    }

    #[test]
    fn failed_flush_leaves_store_unchanged() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let s = JsonFileStore::open(&path).unwrap();
        s.set("build-session-count", "1").unwrap();

        // a non-empty directory at the target path makes the rename fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        assert!(matches!(s.set("build-session-count", "9"), Err(Error::Io(_))));
        assert_eq!(s.get("build-session-count").unwrap().as_deref(), Some("1"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
