//! Order snapshot and the append-only order log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::payment::PaymentDetails;
use crate::domain::aggregates::cart::LineItem;
use crate::domain::value_objects::Money;
use crate::storage::{self, keys, StorageError, StorageProvider};

/// Immutable record of a confirmed checkout. Built once by the checkout
/// session and never mutated afterwards; there are no state-advancing
/// methods on purpose.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: String,
    items: Vec<LineItem>,
    subtotal: Money,
    discount: Money,
    total: Money,
    coupon: Option<String>,
    payment_required: bool,
    payment: PaymentDetails,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        items: Vec<LineItem>,
        subtotal: Money,
        discount: Money,
        total: Money,
        coupon: Option<String>,
        payment_required: bool,
        payment: PaymentDetails,
    ) -> Self {
        let status = if payment_required {
            OrderStatus::PendingPayment
        } else {
            OrderStatus::Confirmed
        };
        Self {
            id,
            items,
            subtotal,
            discount,
            total,
            coupon,
            payment_required,
            payment,
            status,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }
    pub fn subtotal(&self) -> &Money {
        &self.subtotal
    }
    pub fn discount(&self) -> &Money {
        &self.discount
    }
    pub fn total(&self) -> &Money {
        &self.total
    }
    pub fn coupon(&self) -> Option<&str> {
        self.coupon.as_deref()
    }
    pub fn payment_required(&self) -> bool {
        self.payment_required
    }
    pub fn payment(&self) -> &PaymentDetails {
        &self.payment
    }
    pub fn status(&self) -> OrderStatus {
        self.status
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment/review by the shop.
    PendingPayment,
    Confirmed,
}

impl OrderStatus {
    /// Arabic label shown on the orders page.
    pub fn label_ar(self) -> &'static str {
        match self {
            Self::PendingPayment => "بانتظار الدفع/المراجعة",
            Self::Confirmed => "مؤكد",
        }
    }
}

/// Append-only order history under the `orders` key, newest first.
#[derive(Clone)]
pub struct OrderLog {
    provider: Arc<dyn StorageProvider>,
}

impl OrderLog {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    pub fn append(&self, order: &Order) -> Result<(), StorageError> {
        let mut orders = self.list()?;
        orders.insert(0, order.clone());
        storage::write_json(self.provider.as_ref(), keys::ORDERS, &orders)?;
        tracing::info!(order_id = order.id(), status = ?order.status(), "order recorded");
        Ok(())
    }

    /// Newest-first order history.
    pub fn list(&self) -> Result<Vec<Order>, StorageError> {
        storage::read_json(self.provider.as_ref(), keys::ORDERS, Vec::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rust_decimal::Decimal;

    fn order(id: &str) -> Order {
        Order::new(
            id.to_string(),
            vec![],
            Money::syp(Decimal::new(200, 0)),
            Money::zero("SYP"),
            Money::syp(Decimal::new(200, 0)),
            None,
            true,
            PaymentDetails::Mtn { pay_to: "0933123456".into() },
        )
    }

    #[test]
    fn test_log_is_newest_first() {
        let log = OrderLog::new(Arc::new(MemoryStore::new()));
        log.append(&order("ORD-1")).unwrap();
        log.append(&order("ORD-2")).unwrap();

        let orders = log.list().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id(), "ORD-2");
        assert_eq!(orders[1].id(), "ORD-1");
    }

    #[test]
    fn test_status_from_payment_required() {
        assert_eq!(order("ORD-1").status(), OrderStatus::PendingPayment);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::PendingPayment).unwrap();
        assert_eq!(json, "\"pending_payment\"");
    }

    #[test]
    fn test_arabic_labels() {
        assert_eq!(OrderStatus::Confirmed.label_ar(), "مؤكد");
    }
}
