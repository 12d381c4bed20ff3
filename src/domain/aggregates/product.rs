//! Product records and the catalog store.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;
use crate::storage::{self, keys, StorageError, StorageProvider};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: String,
    pub category: String,
}

/// Catalog persisted under the `products` key. When the key is absent or
/// empty the built-in seed list is served instead, so a fresh store always
/// has something on the shelf.
#[derive(Clone)]
pub struct ProductCatalog {
    provider: Arc<dyn StorageProvider>,
}

impl ProductCatalog {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    pub fn list(&self) -> Result<Vec<Product>, StorageError> {
        let stored: Vec<Product> =
            storage::read_json(self.provider.as_ref(), keys::PRODUCTS, Vec::new)?;
        if stored.is_empty() {
            return Ok(seed_products());
        }
        Ok(stored)
    }

    pub fn find(&self, id: u64) -> Result<Option<Product>, StorageError> {
        Ok(self.list()?.into_iter().find(|p| p.id == id))
    }

    pub fn save(&self, products: &[Product]) -> Result<(), StorageError> {
        storage::write_json(self.provider.as_ref(), keys::PRODUCTS, &products)
    }

    /// Insert or replace by product id.
    pub fn upsert(&self, product: Product) -> Result<Vec<Product>, StorageError> {
        let mut products = self.list()?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        self.save(&products)?;
        Ok(products)
    }

    /// Returns true when a product was actually deleted.
    pub fn delete(&self, id: u64) -> Result<bool, StorageError> {
        let mut products = self.list()?;
        let before = products.len();
        products.retain(|p| p.id != id);
        let deleted = products.len() != before;
        if deleted {
            self.save(&products)?;
        }
        Ok(deleted)
    }

    /// Next free id: max existing id + 1.
    pub fn next_id(&self) -> Result<u64, StorageError> {
        Ok(self.list()?.iter().map(|p| p.id).max().unwrap_or(0) + 1)
    }
}

/// Default shelf for a fresh store.
pub fn seed_products() -> Vec<Product> {
    fn p(id: u64, name: &str, description: &str, price: i64, category: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price: Money::syp(Decimal::new(price, 0)),
            image: format!("/images/products/{id}.jpg"),
            category: category.to_string(),
        }
    }

    vec![
        p(1, "بن عربي محمص غامق", "تحميص غامق بنكهة الهيل", 85000, "beans"),
        p(2, "بن كولومبي وسط", "تحميص وسط متوازن الحموضة", 95000, "beans"),
        p(3, "قهوة تركية مطحونة", "طحن ناعم مع الهيل", 70000, "ground"),
        p(4, "إسبريسو بليند", "خلطة إسبريسو بكريما غنية", 110000, "beans"),
        p(5, "ركوة نحاسية", "ركوة قهوة تقليدية مصنوعة يدوياً", 150000, "gear"),
        p(6, "مطحنة يدوية", "مطحنة قهوة بشفرات سيراميك", 220000, "gear"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_seed_fallback_when_empty() {
        let catalog = ProductCatalog::new(Arc::new(MemoryStore::new()));
        let products = catalog.list().unwrap();
        assert!(!products.is_empty());
        assert_eq!(products[0].id, 1);
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let catalog = ProductCatalog::new(Arc::new(MemoryStore::new()));
        let mut product = catalog.list().unwrap()[0].clone();
        product.name = "بن يمني".into();
        let products = catalog.upsert(product).unwrap();
        assert_eq!(products[0].name, "بن يمني");
        assert_eq!(products.len(), seed_products().len());
    }

    #[test]
    fn test_next_id_is_max_plus_one() {
        let catalog = ProductCatalog::new(Arc::new(MemoryStore::new()));
        let max = seed_products().iter().map(|p| p.id).max().unwrap();
        assert_eq!(catalog.next_id().unwrap(), max + 1);
    }

    #[test]
    fn test_delete() {
        let catalog = ProductCatalog::new(Arc::new(MemoryStore::new()));
        assert!(catalog.delete(1).unwrap());
        assert!(!catalog.delete(999).unwrap());
        assert!(catalog.list().unwrap().iter().all(|p| p.id != 1));
    }
}
