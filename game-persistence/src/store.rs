use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::StorageError;

/// String key/value storage local to the device.
///
/// Values are opaque strings; callers decide how to encode them.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same entries, so a handle kept outside
/// the session sees every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    pub fn set_raw(&self, key: &str, value: impl Into<String>) {
        self.entries().insert(key.to_string(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_raw(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_raw(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file starts empty, and so does an
    /// unreadable one: a corrupted store must never block the game.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Store at {} is malformed, starting empty: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No store at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(&self.entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch_store() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("wardle.json");
        (dir, path)
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut handle = store.clone();

        handle.set("a", "1".to_string()).unwrap();
        assert_eq!(store.get_raw("a"), Some("1".to_string()));

        handle.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_round_trips_through_disk() {
        let (_dir, path) = scratch_store();

        let mut store = FileStore::open(&path).unwrap();
        store.set("wardle_language", "en".to_string()).unwrap();
        store.set("wardle_en_today_time", "00:01:00".to_string()).unwrap();
        store.remove("wardle_en_today_time").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("wardle_language").unwrap(), Some("en".to_string()));
        assert_eq!(reopened.get("wardle_en_today_time").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_missing_file_starts_empty() {
        let (_dir, path) = scratch_store();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_malformed_file_starts_empty() {
        let (_dir, path) = scratch_store();
        fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("wardle_language").unwrap(), None);

        // The next write replaces the broken file
        store.set("wardle_language", "es".to_string()).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("wardle_language").unwrap(), Some("es".to_string()));
    }
}
