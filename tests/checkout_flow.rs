//! End-to-end checkout scenarios against an in-memory store.

use std::sync::Arc;

use rust_decimal::Decimal;

use qahwa_storefront::{
    CartStore, CheckoutError, CheckoutSession, MemoryStore, Money, OrderLog, OrderStatus,
    PaymentDetails, PaymentMethod, Product, StorageProvider,
};

fn setup() -> (Arc<MemoryStore>, CartStore, OrderLog, CheckoutSession) {
    let provider = Arc::new(MemoryStore::new());
    let cart_store = CartStore::new(provider.clone());
    let order_log = OrderLog::new(provider.clone());
    (provider, cart_store, order_log, CheckoutSession::new())
}

fn beans(price: i64) -> Product {
    Product {
        id: 1,
        name: "بن عربي".into(),
        description: String::new(),
        price: Money::syp(Decimal::new(price, 0)),
        image: "/images/1.jpg".into(),
        category: "beans".into(),
    }
}

/// Cart of 2 × 100 with no coupon: full price, payment required, confirm
/// blocked until a method with valid auxiliary input is chosen.
#[test]
fn full_price_checkout_requires_payment_method() {
    let (_, cart_store, order_log, mut session) = setup();
    cart_store.add_product(&beans(100)).unwrap();
    cart_store.change_quantity(1, 1).unwrap();

    let cart = cart_store.load().unwrap();
    let quote = session.quote(&cart);
    assert_eq!(quote.subtotal.amount(), Decimal::new(200, 0));
    assert_eq!(quote.discount.amount(), Decimal::ZERO);
    assert_eq!(quote.total.amount(), Decimal::new(200, 0));
    assert!(quote.payment_required);

    // No method selected yet: blocked.
    assert!(!session.can_confirm(&cart));
    assert!(matches!(
        session.confirm(&cart_store, &order_log),
        Err(CheckoutError::NotConfirmable)
    ));

    session.payment_mut().select_method(PaymentMethod::MtnCash);
    assert!(session.can_confirm(&cart));
    let order = session.confirm(&cart_store, &order_log).unwrap();
    assert_eq!(order.status(), OrderStatus::PendingPayment);
    assert!(matches!(order.payment(), PaymentDetails::Mtn { .. }));
}

/// The d.bader coupon zeroes the total and waives payment entirely.
#[test]
fn full_discount_coupon_confirms_without_payment() {
    let (_, cart_store, order_log, mut session) = setup();
    cart_store.add_product(&beans(100)).unwrap();
    cart_store.change_quantity(1, 1).unwrap();

    session.apply_coupon("d.bader");
    let cart = cart_store.load().unwrap();
    let quote = session.quote(&cart);
    assert_eq!(quote.total.amount(), Decimal::ZERO);
    assert!(!quote.payment_required);
    assert!(session.can_confirm(&cart));

    let order = session.confirm(&cart_store, &order_log).unwrap();
    assert_eq!(order.status(), OrderStatus::Confirmed);
    assert_eq!(order.coupon(), Some("d.bader"));
    assert!(!order.payment_required());
    assert!(matches!(order.payment(), PaymentDetails::Free { .. }));
}

/// Syriatel Cash gates on a 9-10 digit phone; fixing the input unblocks the
/// confirmation without touching anything else.
#[test]
fn syriatel_phone_validation_gates_confirm() {
    let (_, cart_store, order_log, mut session) = setup();
    cart_store.add_product(&beans(100)).unwrap();
    let cart = cart_store.load().unwrap();

    session.payment_mut().select_method(PaymentMethod::SyriatelCash);
    session.payment_mut().set_syriatel_phone("123");
    assert!(!session.payment().aux_inputs_valid());
    assert!(!session.can_confirm(&cart));

    session.payment_mut().set_syriatel_phone("099 123 4567");
    assert!(session.can_confirm(&cart));

    let order = session.confirm(&cart_store, &order_log).unwrap();
    match order.payment() {
        PaymentDetails::Syriatel { pay_to, from } => {
            assert_eq!(pay_to, "0998765432");
            // Digits only in the snapshot, formatting stripped.
            assert_eq!(from, "0991234567");
        }
        other => panic!("unexpected payment details: {other:?}"),
    }
}

/// Confirmation empties the cart, resets the session, and the new order is
/// first in the log.
#[test]
fn confirm_snapshots_and_resets() {
    let (provider, cart_store, order_log, mut session) = setup();
    cart_store.add_product(&beans(100)).unwrap();
    session.apply_coupon("d.bader");
    let first = session.confirm(&cart_store, &order_log).unwrap();

    assert!(cart_store.load().unwrap().is_empty());
    assert!(provider.get("cart").unwrap().is_none());
    assert_eq!(session.applied_coupon(), None);

    // Second round: the reset session treats the next order independently.
    cart_store.add_product(&beans(50)).unwrap();
    session.payment_mut().select_method(PaymentMethod::ShamCash);
    let second = session.confirm(&cart_store, &order_log).unwrap();
    assert!(second.payment_required());

    let orders = order_log.list().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id(), second.id());
    assert_eq!(orders[1].id(), first.id());
}

/// Bemo needs a 10+ digit account; switching methods keeps each field's
/// typed value around.
#[test]
fn switching_methods_keeps_other_fields() {
    let (_, cart_store, _, mut session) = setup();
    cart_store.add_product(&beans(100)).unwrap();
    let cart = cart_store.load().unwrap();

    session.payment_mut().select_method(PaymentMethod::BemoBank);
    session.payment_mut().set_bemo_account("12345");
    assert!(!session.can_confirm(&cart));

    // A different method makes the bad bemo account irrelevant.
    session.payment_mut().select_method(PaymentMethod::MtnCash);
    assert!(session.can_confirm(&cart));
    assert_eq!(session.payment().bemo_account(), "12345");

    // Coming back re-applies the predicate to the preserved value.
    session.payment_mut().select_method(PaymentMethod::BemoBank);
    assert!(!session.can_confirm(&cart));
    session.payment_mut().set_bemo_account("0011-234567-890");
    assert!(session.can_confirm(&cart));
}
