//! Single-file JSON store.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;

use super::{lock, ChangeEvent, StorageError, StorageProvider, Subscribers};

/// Persists the whole key space as one JSON object on disk, rewritten on
/// every mutation. Suits the storefront's scale (a handful of small keys);
/// concurrent writers from separate processes are last-write-wins, same as
/// two browser tabs sharing localStorage.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
    subscribers: Subscribers,
}

impl JsonFileStore {
    /// Open the store at `path`, creating it on first write. An existing but
    /// unparseable file is treated as empty rather than an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "store file unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl StorageProvider for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)?;
        drop(entries);
        self.subscribers.notify(key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        drop(entries);
        self.subscribers.notify(key, None);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<ChangeEvent> {
        self.subscribers.attach()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("cart", "[{\"id\":1}]").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some("[{\"id\":1}]"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{{{ not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("cart").unwrap().is_none());
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("wishlist", "[3]").unwrap();
        store.remove("wishlist").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.get("wishlist").unwrap().is_none());
    }
}
