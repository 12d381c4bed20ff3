//! Qahwa storefront core.
//!
//! The business logic behind a bilingual (Arabic-first) coffee shop demo:
//! product catalog, cart, wishlist, coupon-aware checkout with simulated
//! local payment channels, an append-only order log, and a deliberately
//! non-authoritative identity layer. Everything persists through the
//! [`storage::StorageProvider`] key-value contract, mirroring the browser
//! localStorage model the shop originally ran on.
//!
//! ## Checkout in brief
//! - Totals are derived, never stored: `total = max(0, subtotal − discount)`.
//! - Two coupon codes exist (`d.fadi` 50%, `d.bader` 100%); unknown codes
//!   silently mean "no coupon".
//! - Payment is waived only when the total is zero because `d.bader` is
//!   applied; each payment method validates its own auxiliary input.
//! - Confirming snapshots the cart into an immutable [`domain::aggregates::order::Order`],
//!   appends it newest-first, and empties the cart.

pub mod checkout;
pub mod domain;
pub mod identity;
pub mod storage;
pub mod wishlist;

pub use checkout::{CheckoutError, CheckoutSession, Coupon, PaymentDetails, PaymentForm, PaymentMethod, Quote};
pub use domain::aggregates::cart::{Cart, CartError, CartStore, LineItem};
pub use domain::aggregates::order::{Order, OrderLog, OrderStatus};
pub use domain::aggregates::product::{seed_products, Product, ProductCatalog};
pub use domain::value_objects::{Money, MoneyError, Quantity};
pub use identity::{Credentials, DemoIdentityProvider, IdentityError, NewUser, Role, UserRecord};
pub use storage::{ChangeEvent, JsonFileStore, MemoryStore, StorageError, StorageProvider};
pub use wishlist::WishlistStore;
