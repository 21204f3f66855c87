//! Session storage port
//!
//! The browser keeps `token`, `userEmail` and `sessionId` in
//! `sessionStorage`; natively the same keys live in memory or in a small
//! JSON file. Components only see [`KeyValueStore`].

use std::cell::RefCell;
use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const USER_EMAIL_KEY: &str = "userEmail";
pub const SESSION_ID_KEY: &str = "sessionId";

/// Keys cleared on logout
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, USER_EMAIL_KEY, SESSION_ID_KEY];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Lives as long as the process; used by tests and one-shot CLI runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every change
///
/// Lets the CLI keep a login between invocations.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Open or create; a missing file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&*self.entries.borrow())?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set(TOKEN_KEY, "tok123").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok123"));

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        // Removing twice is fine
        store.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_store_persists() {
        let path = std::env::temp_dir().join(format!(
            "lexdraft-store-{}.json",
            uuid::Uuid::new_v4()
        ));

        {
            let store = FileStore::open(&path).unwrap();
            store.set(USER_EMAIL_KEY, "a@b.in").unwrap();
            store.set(TOKEN_KEY, "tok").unwrap();
            store.remove(TOKEN_KEY).unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(USER_EMAIL_KEY).unwrap().as_deref(),
            Some("a@b.in")
        );
        assert_eq!(reopened.get(TOKEN_KEY).unwrap(), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let path = std::env::temp_dir().join("lexdraft-store-does-not-exist.json");
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }
}
