//! Value objects shared across the storefront domain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency the storefront prices in.
pub const SYP: &str = "SYP";

/// Money value object. Fixed-decimal arithmetic, tagged with its currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self { amount, currency: currency.to_string() }
    }

    pub fn syp(amount: Decimal) -> Self {
        Self::new(amount, SYP)
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch);
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }

    /// Subtraction floored at zero; a discount can never push a total negative.
    pub fn saturating_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch);
        }
        Ok(Money::new(
            (self.amount - other.amount).max(Decimal::ZERO),
            &self.currency,
        ))
    }

    pub fn multiply(&self, qty: u32) -> Money {
        Money::new(self.amount * Decimal::from(qty), &self.currency)
    }

    /// Scale by a fraction, e.g. a discount rate in [0, 1].
    pub fn scale(&self, rate: Decimal) -> Money {
        Money::new(self.amount * rate, &self.currency)
    }

    pub fn round_dp(&self, dp: u32) -> Money {
        Money::new(self.amount.round_dp(dp), &self.currency)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero(SYP)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    CurrencyMismatch,
}
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency mismatch")
    }
}

/// Cart line quantity. Floored at 1: decrementing past 1 sticks at 1, and
/// taking an item out of the cart is an explicit removal, never quantity 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self {
        Self(value.max(1))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Apply a signed change, clamped so the result stays >= 1. The clamp
    /// runs before narrowing back to `u32`, so oversized deltas cap at
    /// `u32::MAX` instead of wrapping.
    pub fn adjust(self, delta: i64) -> Self {
        let next = i64::from(self.0)
            .saturating_add(delta)
            .clamp(1, i64::from(u32::MAX));
        Self(next as u32)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_add() {
        let a = Money::syp(Decimal::new(100, 0));
        let b = Money::syp(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_money_mismatch() {
        let a = Money::syp(Decimal::ONE);
        let b = Money::new(Decimal::ONE, "USD");
        assert_eq!(a.add(&b), Err(MoneyError::CurrencyMismatch));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::syp(Decimal::new(100, 0));
        let b = Money::syp(Decimal::new(150, 0));
        assert_eq!(a.saturating_sub(&b).unwrap().amount(), Decimal::ZERO);
    }

    #[test]
    fn test_scale_by_half() {
        let a = Money::syp(Decimal::new(200, 0));
        assert_eq!(a.scale(Decimal::new(5, 1)).amount(), Decimal::new(100, 0));
    }

    #[test]
    fn test_quantity_floor() {
        assert_eq!(Quantity::new(0).value(), 1);
        assert_eq!(Quantity::new(3).adjust(-10).value(), 1);
        assert_eq!(Quantity::new(1).adjust(2).value(), 3);
    }

    #[test]
    fn test_quantity_adjust_caps_at_u32_max() {
        // 1 + u32::MAX lands exactly on 2^32; a raw narrowing cast would
        // wrap that to 0 and break the floor.
        let q = Quantity::new(1).adjust(i64::from(u32::MAX));
        assert_eq!(q.value(), u32::MAX);
        assert!(Quantity::new(1).adjust(i64::MAX).value() >= 1);
        assert_eq!(Quantity::new(7).adjust(i64::MIN).value(), 1);
    }
}
