//! Cart aggregate and its persisted store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::{Money, Quantity};
use crate::storage::{self, keys, StorageError, StorageProvider};

/// One product entry in the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub name: String,
    pub price: Money,
    pub quantity: Quantity,
    pub image: String,
}

impl LineItem {
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity.value())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines; the navbar badge count.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity.value()).sum()
    }

    pub fn subtotal(&self) -> Money {
        crate::checkout::subtotal(&self.items)
    }

    /// Add one unit of `product`, merging with an existing line for the same
    /// product id.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == product.id) {
            existing.quantity = existing.quantity.adjust(1);
        } else {
            self.items.push(LineItem {
                id: product.id,
                name: product.name.clone(),
                price: product.price.clone(),
                quantity: Quantity::new(1),
                image: product.image.clone(),
            });
        }
    }

    /// Change a line's quantity by `delta`, never dropping below 1.
    pub fn change_quantity(&mut self, id: u64, delta: i64) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = item.quantity.adjust(delta);
        Ok(())
    }

    pub fn set_quantity(&mut self, id: u64, quantity: u32) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = Quantity::new(quantity);
        Ok(())
    }

    pub fn remove(&mut self, id: u64) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    ItemNotFound,
}
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Item not found")
    }
}

/// Persists the cart under the `cart` key. A missing or unparseable record
/// loads as an empty cart; saving an empty cart removes the key entirely.
#[derive(Clone)]
pub struct CartStore {
    provider: Arc<dyn StorageProvider>,
}

impl CartStore {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    pub fn load(&self) -> Result<Cart, StorageError> {
        storage::read_json(self.provider.as_ref(), keys::CART, Cart::new)
    }

    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        if cart.is_empty() {
            self.provider.remove(keys::CART)
        } else {
            storage::write_json(self.provider.as_ref(), keys::CART, cart)
        }
    }

    pub fn add_product(&self, product: &Product) -> Result<Cart, StorageError> {
        let mut cart = self.load()?;
        cart.add_product(product);
        self.save(&cart)?;
        tracing::debug!(product_id = product.id, units = cart.unit_count(), "added to cart");
        Ok(cart)
    }

    pub fn change_quantity(&self, id: u64, delta: i64) -> Result<Cart, StorageError> {
        let mut cart = self.load()?;
        if cart.change_quantity(id, delta).is_ok() {
            self.save(&cart)?;
        }
        Ok(cart)
    }

    pub fn set_quantity(&self, id: u64, quantity: u32) -> Result<Cart, StorageError> {
        let mut cart = self.load()?;
        if cart.set_quantity(id, quantity).is_ok() {
            self.save(&cart)?;
        }
        Ok(cart)
    }

    pub fn remove(&self, id: u64) -> Result<Cart, StorageError> {
        let mut cart = self.load()?;
        if cart.remove(id).is_ok() {
            self.save(&cart)?;
        }
        Ok(cart)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        tracing::debug!("clearing cart");
        self.provider.remove(keys::CART)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rust_decimal::Decimal;

    fn product(id: u64, price: i64) -> Product {
        Product {
            id,
            name: format!("بن {id}"),
            description: String::new(),
            price: Money::syp(Decimal::new(price, 0)),
            image: format!("/images/{id}.jpg"),
            category: "beans".into(),
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 100));
        cart.add_product(&product(1, 100));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity.value(), 2);
        assert_eq!(cart.unit_count(), 2);
    }

    #[test]
    fn test_quantity_never_below_one() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 100));
        cart.change_quantity(1, -5).unwrap();
        assert_eq!(cart.items()[0].quantity.value(), 1);
    }

    #[test]
    fn test_huge_quantity_delta_keeps_floor() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 100));
        // A delta landing on a multiple of 2^32 must not wrap to zero.
        cart.change_quantity(1, i64::from(u32::MAX)).unwrap();
        assert!(cart.items()[0].quantity.value() >= 1);
    }

    #[test]
    fn test_remove_missing_item() {
        let mut cart = Cart::new();
        assert_eq!(cart.remove(9), Err(CartError::ItemNotFound));
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 100));
        cart.change_quantity(1, 1).unwrap();
        cart.add_product(&product(2, 50));
        assert_eq!(cart.subtotal().amount(), Decimal::new(250, 0));
    }

    #[test]
    fn test_store_round_trip() {
        let provider = Arc::new(MemoryStore::new());
        let store = CartStore::new(provider.clone());
        store.add_product(&product(1, 100)).unwrap();
        store.add_product(&product(1, 100)).unwrap();

        let cart = store.load().unwrap();
        assert_eq!(cart.items()[0].quantity.value(), 2);
    }

    #[test]
    fn test_saving_empty_cart_removes_key() {
        let provider = Arc::new(MemoryStore::new());
        let store = CartStore::new(provider.clone());
        store.add_product(&product(1, 100)).unwrap();
        store.remove(1).unwrap();
        assert!(provider.get(keys::CART).unwrap().is_none());
    }
}
