//! Saved workspace states, keyed by [`state_key`](crate::state_key::state_key).
//!
//! The serialized state blob is opaque here: whatever the host's serializer
//! produced is stored and handed back unchanged.

use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};
use crate::storage::{atomic_write, StorageConfig};

const STATE_FILE_VERSION: u32 = 1;

/// Persistence contract for serialized workspace states.
pub trait StateStorage {
    fn store_state(&mut self, key: &str, blob: &str) -> Result<()>;

    /// `Ok(None)` when nothing was saved under `key`.
    fn load_state(&self, key: &str) -> Result<Option<String>>;
}

/// Summary of a saved state, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedStateInfo {
    pub key: String,
    pub saved_at: DateTime<Utc>,
    pub bytes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    key: String,
    saved_at: DateTime<Utc>,
    blob: String,
}

/// One JSON file per key under the storage `states/` directory.
#[derive(Debug, Clone)]
pub struct FileStateStorage {
    storage: StorageConfig,
}

impl FileStateStorage {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    pub fn dir(&self) -> PathBuf {
        self.storage.states_dir()
    }

    /// Saved states, most recent first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<SavedStateInfo>> {
        let dir = self.dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ViewerError::Io {
                    context: format!("listing {}", dir.display()),
                    source: e,
                })
            }
        };

        let mut states: Vec<SavedStateInfo> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| match read_state_file(&path) {
                Ok(file) => Some(SavedStateInfo {
                    key: file.key,
                    saved_at: file.saved_at,
                    bytes: file.blob.len(),
                }),
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping unreadable state file");
                    None
                }
            })
            .collect();

        states.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(states)
    }
}

fn read_state_file(path: &Path) -> Result<StateFile> {
    let content = fs::read_to_string(path).map_err(|e| ViewerError::Io {
        context: format!("reading state file {}", path.display()),
        source: e,
    })?;
    let file: StateFile = serde_json::from_str(&content).map_err(|e| ViewerError::Json {
        context: format!("parsing state file {}", path.display()),
        source: e,
    })?;
    if file.version != STATE_FILE_VERSION {
        return Err(ViewerError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: file.version,
            expected: STATE_FILE_VERSION,
        });
    }
    Ok(file)
}

impl StateStorage for FileStateStorage {
    fn store_state(&mut self, key: &str, blob: &str) -> Result<()> {
        let file = StateFile {
            version: STATE_FILE_VERSION,
            key: key.to_string(),
            saved_at: Utc::now(),
            blob: blob.to_string(),
        };
        let content = serde_json::to_string(&file).map_err(|e| ViewerError::Json {
            context: format!("serializing state {}", key),
            source: e,
        })?;
        atomic_write(&self.storage.state_file(key), &content)
    }

    fn load_state(&self, key: &str) -> Result<Option<String>> {
        let path = self.storage.state_file(key);
        if !path.exists() {
            return Ok(None);
        }
        let file = read_state_file(&path)?;
        if file.key != key {
            tracing::warn!(
                key = %key,
                stored_key = %file.key,
                "State file belongs to another key, ignoring"
            );
            return Ok(None);
        }
        Ok(Some(file.blob))
    }
}

/// In-memory storage, for hosts that keep states themselves and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStorage {
    states: HashMap<String, String>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.states.get(key).map(String::as_str)
    }
}

impl StateStorage for MemoryStateStorage {
    fn store_state(&mut self, key: &str, blob: &str) -> Result<()> {
        self.states.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn load_state(&self, key: &str) -> Result<Option<String>> {
        Ok(self.states.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_store_and_load() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStateStorage::new(StorageConfig::with_root(temp.path().to_path_buf()));

        assert_eq!(storage.load_state("editor-abc").unwrap(), None);
        storage.store_state("editor-abc", "{\"panes\":[1,2]}").unwrap();
        assert_eq!(
            storage.load_state("editor-abc").unwrap().as_deref(),
            Some("{\"panes\":[1,2]}")
        );

        storage.store_state("editor-abc", "second").unwrap();
        assert_eq!(storage.load_state("editor-abc").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_file_storage_corrupt_state_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config = StorageConfig::with_root(temp.path().to_path_buf());
        std::fs::create_dir_all(config.states_dir()).unwrap();
        std::fs::write(config.state_file("editor-bad"), "garbage").unwrap();

        let storage = FileStateStorage::new(config);
        assert!(storage.load_state("editor-bad").is_err());
    }

    #[test]
    fn test_keys_sharing_a_file_name_do_not_cross_restore() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStateStorage::new(StorageConfig::with_root(temp.path().to_path_buf()));
        storage.store_state("a/b", r#"{"panes":2}"#).unwrap();

        assert_eq!(storage.load_state("a_b").unwrap(), None);
        assert_eq!(
            storage.load_state("a/b").unwrap().as_deref(),
            Some(r#"{"panes":2}"#)
        );
    }

    #[test]
    fn test_list_skips_bad_files() {
        let temp = TempDir::new().unwrap();
        let config = StorageConfig::with_root(temp.path().to_path_buf());
        let mut storage = FileStateStorage::new(config.clone());

        assert!(storage.list().unwrap().is_empty());

        storage.store_state("editor-one", "1").unwrap();
        storage.store_state("editor-two", "22").unwrap();
        std::fs::write(config.state_file("editor-bad"), "garbage").unwrap();

        let mut keys: Vec<_> = storage
            .list()
            .unwrap()
            .into_iter()
            .map(|s| (s.key, s.bytes))
            .collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![("editor-one".to_string(), 1), ("editor-two".to_string(), 2)]
        );
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStateStorage::new();
        assert!(storage.is_empty());
        storage.store_state("k", "v").unwrap();
        assert_eq!(storage.load_state("k").unwrap().as_deref(), Some("v"));
        assert_eq!(storage.get("k"), Some("v"));
        assert_eq!(storage.load_state("other").unwrap(), None);
    }
}
