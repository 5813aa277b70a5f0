//! Store orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{OrderId, TenantId, Money};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, awaiting till confirmation
    Pending,
    /// Paid at the till
    Completed,
    /// Abandoned at the till
    Cancelled,
}

/// A supermarket purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOrder {
    /// Unique identifier
    pub id: OrderId,
    /// Purchasing tenant
    pub tenant_id: TenantId,
    /// Human-readable order number
    pub order_number: String,
    /// Gross total before discounts
    pub total_amount: Money,
    /// Discount contributed by a redeemed coupon
    pub coupon_amount: Money,
    /// Amount actually payable (total minus coupon, floored at zero)
    pub paid_amount: Money,
    /// Purchased items as submitted by the till
    pub items: serde_json::Value,
    /// Status
    pub status: OrderStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoreOrder {
    /// Creates an order with no discount applied
    pub fn new(tenant_id: TenantId, total_amount: Money, items: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new_v7(),
            tenant_id,
            order_number: generate_order_number(),
            total_amount,
            coupon_amount: Money::zero(total_amount.currency()),
            paid_amount: total_amount,
            items,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records a coupon discount, flooring the payable amount at zero
    pub fn apply_discount(&mut self, coupon_amount: Money) {
        self.coupon_amount = coupon_amount;
        self.paid_amount = self
            .total_amount
            .saturating_sub(&coupon_amount)
            .unwrap_or_else(|_| self.total_amount);
        self.updated_at = Utc::now();
    }

    /// Marks the order paid
    pub fn complete(&mut self) {
        self.status = OrderStatus::Completed;
        self.updated_at = Utc::now();
    }
}

/// Generates a unique order number
fn generate_order_number() -> String {
    format!("ORD{}", Uuid::new_v4().simple().to_string().to_uppercase())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::Currency;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn discounted_payable_never_negative(
            total in 1i64..10_000_000i64,
            discount in 0i64..10_000_000i64
        ) {
            let mut order = StoreOrder::new(
                TenantId::new_v7(),
                Money::from_minor(total, Currency::CNY),
                serde_json::Value::Array(vec![]),
            );
            order.apply_discount(Money::from_minor(discount, Currency::CNY));

            prop_assert!(!order.paid_amount.is_negative());
            prop_assert!(order.paid_amount.amount() <= order.total_amount.amount());
        }
    }
}
