//! Coupon codes and their discount rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two recognized discount codes. Anything else resolves to no coupon —
/// unknown codes degrade silently instead of erroring, matching the shop's
/// long-standing behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coupon {
    /// `d.fadi`, 50% off.
    HalfOff,
    /// `d.bader`, covers the whole order.
    FullDiscount,
}

impl Coupon {
    pub const HALF_OFF_CODE: &'static str = "d.fadi";
    pub const FULL_DISCOUNT_CODE: &'static str = "d.bader";

    /// Case-insensitive, whitespace-trimmed exact match.
    pub fn resolve(input: &str) -> Option<Coupon> {
        match input.trim().to_lowercase().as_str() {
            Self::HALF_OFF_CODE => Some(Coupon::HalfOff),
            Self::FULL_DISCOUNT_CODE => Some(Coupon::FullDiscount),
            _ => None,
        }
    }

    /// Discount rate in [0, 1].
    pub fn rate(self) -> Decimal {
        match self {
            Coupon::HalfOff => Decimal::new(5, 1),
            Coupon::FullDiscount => Decimal::ONE,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Coupon::HalfOff => Self::HALF_OFF_CODE,
            Coupon::FullDiscount => Self::FULL_DISCOUNT_CODE,
        }
    }
}
