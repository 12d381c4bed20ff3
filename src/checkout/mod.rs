//! Checkout calculator and order builder.
//!
//! Derived-state model: there is no stored checkout phase. Totals, the
//! payment-required flag, and confirmability are all recomputed from the
//! current cart and the session's ephemeral inputs (coupon, payment method,
//! auxiliary fields) every time they are read.

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::aggregates::cart::{Cart, CartStore, LineItem};
use crate::domain::aggregates::order::{Order, OrderLog};
use crate::domain::value_objects::{Money, SYP};
use crate::storage::StorageError;

pub mod coupon;
pub mod payment;

pub use coupon::Coupon;
pub use payment::{PaymentDetails, PaymentForm, PaymentMethod};

#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Confirm was attempted while the session is not confirmable. Callers
    /// are expected to gate on [`CheckoutSession::can_confirm`] and disable
    /// the action instead of hitting this.
    #[error("order is not confirmable in its current state")]
    NotConfirmable,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Sum of price × quantity over the line items. Never negative: prices and
/// quantities have no negative representation.
///
/// Precondition: every line is priced in SYP, the only currency the
/// storefront sells in. A line in any other currency is skipped rather
/// than summed at a bogus rate.
pub fn subtotal(items: &[LineItem]) -> Money {
    items.iter().fold(Money::zero(SYP), |acc, item| {
        acc.add(&item.line_total()).unwrap_or(acc)
    })
}

/// Derived totals for one recomputation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Quote {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_required: bool,
}

/// discount = subtotal × rate; total = max(0, subtotal − discount).
pub fn totals(subtotal: &Money, coupon: Option<Coupon>) -> (Money, Money) {
    let rate = coupon.map(Coupon::rate).unwrap_or(Decimal::ZERO);
    let discount = subtotal.scale(rate);
    let total = subtotal
        .saturating_sub(&discount)
        .unwrap_or_else(|_| Money::zero(subtotal.currency()));
    (discount, total)
}

/// Payment is waived only when nothing is due AND the full-discount coupon
/// is the reason. The check is deliberately on coupon identity, not just on
/// the total: a hypothetical coupon that zeroed the total without being the
/// full-discount code would still demand a payment method. Policy, not a
/// consequence of the arithmetic.
pub fn payment_required(total: &Money, coupon: Option<Coupon>) -> bool {
    total.is_positive() && coupon != Some(Coupon::FullDiscount)
}

/// Confirmation gate: a non-empty cart, and either no payment due or a
/// selected method whose auxiliary inputs pass their predicates.
pub fn can_confirm(cart: &Cart, payment_required: bool, form: &PaymentForm) -> bool {
    !cart.is_empty() && (!payment_required || (form.method().is_some() && form.aux_inputs_valid()))
}

/// One checkout session. Holds only the ephemeral inputs; everything else
/// is derived on demand. Cleared back to its initial state on confirmation.
pub struct CheckoutSession {
    applied_coupon: Option<Coupon>,
    payment: PaymentForm,
    /// Provisional id used in the Sham Cash QR payload before the real
    /// order id exists.
    checkout_id: String,
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self {
            applied_coupon: None,
            payment: PaymentForm::default(),
            checkout_id: format!("TMP-{}", Utc::now().timestamp_millis()),
        }
    }

    /// Resolve and apply a coupon code. Unknown codes clear the applied
    /// coupon and report `None`; they are not errors.
    pub fn apply_coupon(&mut self, code: &str) -> Option<Coupon> {
        self.applied_coupon = Coupon::resolve(code);
        if let Some(coupon) = self.applied_coupon {
            tracing::debug!(code = coupon.code(), "coupon applied");
        }
        self.applied_coupon
    }

    pub fn clear_coupon(&mut self) {
        self.applied_coupon = None;
    }

    pub fn applied_coupon(&self) -> Option<Coupon> {
        self.applied_coupon
    }

    pub fn payment(&self) -> &PaymentForm {
        &self.payment
    }

    pub fn payment_mut(&mut self) -> &mut PaymentForm {
        &mut self.payment
    }

    pub fn checkout_id(&self) -> &str {
        &self.checkout_id
    }

    /// Recompute subtotal/discount/total and the payment gate for `cart`.
    pub fn quote(&self, cart: &Cart) -> Quote {
        let subtotal = subtotal(cart.items());
        let (discount, total) = totals(&subtotal, self.applied_coupon);
        let payment_required = payment_required(&total, self.applied_coupon);
        Quote { subtotal, discount, total, payment_required }
    }

    pub fn can_confirm(&self, cart: &Cart) -> bool {
        can_confirm(cart, self.quote(cart).payment_required, &self.payment)
    }

    /// QR payload for the Sham Cash panel, reflecting the current total.
    pub fn sham_payload(&self, cart: &Cart) -> String {
        payment::sham_payload(&self.checkout_id, &self.quote(cart).total)
    }

    /// Build the immutable order, append it to the log, empty the cart, and
    /// reset the session. Fails with [`CheckoutError::NotConfirmable`] when
    /// the confirmation gate is closed.
    pub fn confirm(
        &mut self,
        cart_store: &CartStore,
        order_log: &OrderLog,
    ) -> Result<Order, CheckoutError> {
        let cart = cart_store.load()?;
        if !self.can_confirm(&cart) {
            return Err(CheckoutError::NotConfirmable);
        }

        let quote = self.quote(&cart);
        let payment = if quote.payment_required {
            // can_confirm guarantees a method is selected here.
            self.payment
                .details(&self.checkout_id, &quote.total)
                .ok_or(CheckoutError::NotConfirmable)?
        } else {
            PaymentDetails::Free {
                note: format!(
                    "كوبون {} يغطي كامل المبلغ",
                    Coupon::FULL_DISCOUNT_CODE
                ),
            }
        };

        let order = Order::new(
            format!("ORD-{}", Utc::now().timestamp_millis()),
            cart.items().to_vec(),
            quote.subtotal.round_dp(2),
            quote.discount.round_dp(2),
            quote.total.round_dp(2),
            self.applied_coupon.map(|c| c.code().to_string()),
            quote.payment_required,
            payment,
        );

        order_log.append(&order)?;
        cart_store.clear()?;
        self.reset();

        tracing::info!(
            order_id = order.id(),
            total = %order.total(),
            payment_required = order.payment_required(),
            "checkout confirmed"
        );
        Ok(order)
    }

    /// Session reset after confirmation: coupon, payment form, and the
    /// provisional checkout id all start fresh.
    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}
