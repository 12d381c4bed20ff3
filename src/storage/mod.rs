//! Key-value persistence layer.
//!
//! The storefront keeps all of its state (cart, orders, wishlist, catalog,
//! users) in a flat string-keyed store, mirroring the browser localStorage
//! model it replaces. Stores notify subscribers on every mutation so another
//! view of the same data can stay in sync; writes are last-write-wins with
//! no transaction concept.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

mod json_file;
pub use json_file::JsonFileStore;

/// Well-known storage keys, kept stable so an exported store stays readable.
pub mod keys {
    pub const CART: &str = "cart";
    pub const ORDERS: &str = "orders";
    pub const WISHLIST: &str = "wishlist";
    pub const PRODUCTS: &str = "products";
    pub const USERS: &str = "users";
    pub const CURRENT_USER: &str = "currentUser";
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Fired after a key changes. `new_value` is `None` when the key was removed.
#[derive(Clone, Debug)]
pub struct ChangeEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// The persistence contract every store in the crate is written against.
pub trait StorageProvider: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribe to change notifications. The receiver sees every `set` and
    /// `remove` that happens after the call, in order.
    fn subscribe(&self) -> mpsc::Receiver<ChangeEvent>;
}

/// Read a JSON value under `key`, falling back to `default` when the key is
/// absent or holds something unparseable. Corrupt values are dropped rather
/// than surfaced: a broken record must never wedge the storefront.
pub fn read_json<T: DeserializeOwned>(
    provider: &dyn StorageProvider,
    key: &str,
    default: impl FnOnce() -> T,
) -> Result<T, StorageError> {
    match provider.get(key)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(key, %err, "dropping unparseable stored value");
                provider.remove(key)?;
                Ok(default())
            }
        },
        None => Ok(default()),
    }
}

/// Serialize `value` as JSON under `key`.
pub fn write_json<T: Serialize>(
    provider: &dyn StorageProvider,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    provider.set(key, &serde_json::to_string(value)?)
}

/// In-memory store. The default backend for tests and for embedding the
/// storefront core inside a host that does its own persistence.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageProvider for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        self.subscribers.notify(key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        self.subscribers.notify(key, None);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<ChangeEvent> {
        self.subscribers.attach()
    }
}

/// Change-notification fan-out shared by the store implementations.
#[derive(Default)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<mpsc::Sender<ChangeEvent>>>,
}

impl Subscribers {
    pub(crate) fn attach(&self) -> mpsc::Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.senders).push(tx);
        rx
    }

    pub(crate) fn notify(&self, key: &str, new_value: Option<&str>) {
        let event = ChangeEvent {
            key: key.to_string(),
            new_value: new_value.map(str::to_string),
        };
        // Dropped receivers are pruned on the next notification.
        lock(&self.senders).retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Recover the data even if a writer panicked mid-update; values here are
/// whole strings, so there is no torn state to worry about.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let store = MemoryStore::new();
        assert!(store.get("cart").unwrap().is_none());
        store.set("cart", "[]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));
        store.remove("cart").unwrap();
        assert!(store.get("cart").unwrap().is_none());
    }

    #[test]
    fn test_change_notifications() {
        let store = MemoryStore::new();
        let rx = store.subscribe();
        store.set("wishlist", "[1,2]").unwrap();
        store.remove("wishlist").unwrap();

        let first = rx.recv().unwrap();
        assert_eq!(first.key, "wishlist");
        assert_eq!(first.new_value.as_deref(), Some("[1,2]"));
        let second = rx.recv().unwrap();
        assert!(second.new_value.is_none());
    }

    #[test]
    fn test_read_json_drops_corrupt_value() {
        let store = MemoryStore::new();
        store.set("cart", "not json").unwrap();
        let value: Vec<u64> = read_json(&store, "cart", Vec::new).unwrap();
        assert!(value.is_empty());
        // The corrupt record is gone too.
        assert!(store.get("cart").unwrap().is_none());
    }
}
