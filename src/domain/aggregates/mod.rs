//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartStore, LineItem};
pub use order::{Order, OrderLog, OrderStatus};
pub use product::{Product, ProductCatalog};
