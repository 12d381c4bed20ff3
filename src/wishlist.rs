//! Wishlist: a deduplicated list of product ids under the `wishlist` key.

use std::sync::Arc;

use crate::storage::{self, keys, StorageError, StorageProvider};

#[derive(Clone)]
pub struct WishlistStore {
    provider: Arc<dyn StorageProvider>,
}

impl WishlistStore {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Saved ids, insertion order, duplicates dropped.
    pub fn ids(&self) -> Result<Vec<u64>, StorageError> {
        let raw: Vec<u64> = storage::read_json(self.provider.as_ref(), keys::WISHLIST, Vec::new)?;
        let mut seen = std::collections::HashSet::new();
        Ok(raw.into_iter().filter(|id| seen.insert(*id)).collect())
    }

    pub fn contains(&self, id: u64) -> Result<bool, StorageError> {
        Ok(self.ids()?.contains(&id))
    }

    pub fn add(&self, id: u64) -> Result<(), StorageError> {
        let mut ids = self.ids()?;
        if !ids.contains(&id) {
            ids.push(id);
            self.save(&ids)?;
        }
        Ok(())
    }

    pub fn remove(&self, id: u64) -> Result<(), StorageError> {
        let mut ids = self.ids()?;
        let before = ids.len();
        ids.retain(|x| *x != id);
        if ids.len() != before {
            self.save(&ids)?;
        }
        Ok(())
    }

    /// Flip membership; returns whether the id is saved afterwards.
    pub fn toggle(&self, id: u64) -> Result<bool, StorageError> {
        if self.contains(id)? {
            self.remove(id)?;
            Ok(false)
        } else {
            self.add(id)?;
            Ok(true)
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.provider.remove(keys::WISHLIST)
    }

    fn save(&self, ids: &[u64]) -> Result<(), StorageError> {
        storage::write_json(self.provider.as_ref(), keys::WISHLIST, &ids)
    }
}
