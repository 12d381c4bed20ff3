//! Simulated local payment channels.
//!
//! No money moves anywhere: each method just records where the customer is
//! expected to send payment, plus whatever detail that channel needs for
//! matching the transfer to the order.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

/// Receiver numbers shown to the customer.
pub const SYRIATEL_RECEIVER: &str = "0998765432";
pub const MTN_RECEIVER: &str = "0933123456";
pub const BEMO_RECEIVER: &str = "0011-234567-890";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    ShamCash,
    SyriatelCash,
    MtnCash,
    BemoBank,
}

/// Payment record stored on the order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    /// Sham Cash: the customer scans a QR carrying this payload.
    Sham { payload: String },
    Syriatel { pay_to: String, from: String },
    Mtn { pay_to: String },
    Bemo { pay_to: String, from: String },
    /// Full-discount coupon covered the order; nothing to pay.
    #[serde(rename = "FREE")]
    Free { note: String },
}

/// Keep only ASCII digits; phone and account inputs arrive with spaces,
/// dashes, or whatever the customer typed.
pub fn digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Syriatel Cash phone: 9 or 10 digits.
pub fn valid_syriatel_phone(input: &str) -> bool {
    let len = digits(input).len();
    (9..=10).contains(&len)
}

/// Bemo account number: at least 10 digits.
pub fn valid_bemo_account(input: &str) -> bool {
    digits(input).len() >= 10
}

/// QR payload for Sham Cash, carrying the checkout id and the amount due.
pub fn sham_payload(order_id: &str, total: &Money) -> String {
    format!(
        "PAY:SHAMCASH;order={};amount={:.2};curr=SYP",
        order_id,
        total.amount()
    )
}

/// Per-method form state for a checkout session. Each method's field is
/// tracked independently: switching methods never wipes what was typed for
/// another one, it only changes which predicate is in force.
#[derive(Clone, Debug, Default)]
pub struct PaymentForm {
    method: Option<PaymentMethod>,
    syriatel_phone: String,
    bemo_account: String,
}

impl PaymentForm {
    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    pub fn select_method(&mut self, method: PaymentMethod) {
        self.method = Some(method);
    }

    pub fn clear_method(&mut self) {
        self.method = None;
    }

    pub fn set_syriatel_phone(&mut self, phone: impl Into<String>) {
        self.syriatel_phone = phone.into();
    }

    pub fn set_bemo_account(&mut self, account: impl Into<String>) {
        self.bemo_account = account.into();
    }

    pub fn syriatel_phone(&self) -> &str {
        &self.syriatel_phone
    }

    pub fn bemo_account(&self) -> &str {
        &self.bemo_account
    }

    /// A field only invalidates the form while its own method is selected.
    pub fn syriatel_ok(&self) -> bool {
        self.method != Some(PaymentMethod::SyriatelCash) || valid_syriatel_phone(&self.syriatel_phone)
    }

    pub fn bemo_ok(&self) -> bool {
        self.method != Some(PaymentMethod::BemoBank) || valid_bemo_account(&self.bemo_account)
    }

    pub fn aux_inputs_valid(&self) -> bool {
        self.syriatel_ok() && self.bemo_ok()
    }

    /// Materialize the payment record for the selected method.
    pub(crate) fn details(&self, checkout_id: &str, total: &Money) -> Option<PaymentDetails> {
        Some(match self.method? {
            PaymentMethod::ShamCash => PaymentDetails::Sham {
                payload: sham_payload(checkout_id, total),
            },
            PaymentMethod::SyriatelCash => PaymentDetails::Syriatel {
                pay_to: SYRIATEL_RECEIVER.to_string(),
                from: digits(&self.syriatel_phone),
            },
            PaymentMethod::MtnCash => PaymentDetails::Mtn {
                pay_to: MTN_RECEIVER.to_string(),
            },
            PaymentMethod::BemoBank => PaymentDetails::Bemo {
                pay_to: BEMO_RECEIVER.to_string(),
                from: digits(&self.bemo_account),
            },
        })
    }
}
