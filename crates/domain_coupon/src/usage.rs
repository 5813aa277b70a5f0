//! Coupon usage records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CouponUsageId, CouponId, TenantId, OrderId, Money};

/// Immutable audit record linking a consumed coupon to the order that used it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUsage {
    pub id: CouponUsageId,
    pub coupon_id: CouponId,
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    /// Discount applied
    pub amount: Money,
    pub used_at: DateTime<Utc>,
}

impl CouponUsage {
    /// Records a redemption
    pub fn new(coupon_id: CouponId, tenant_id: TenantId, order_id: OrderId, amount: Money) -> Self {
        Self {
            id: CouponUsageId::new_v7(),
            coupon_id,
            tenant_id,
            order_id,
            amount,
            used_at: Utc::now(),
        }
    }
}
