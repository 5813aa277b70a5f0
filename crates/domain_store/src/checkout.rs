//! Coupon-aware checkout
//!
//! Mirrors the till flow: the tenant scans, optionally presents a coupon
//! code, and the order records whatever discount actually applied.

use std::sync::Arc;

use tracing::{info, instrument};

use core_kernel::{TenantId, Money, PortError};
use domain_billing::ports::TenantDirectory;
use domain_coupon::redeemer::CouponRedeemer;

use crate::error::StoreError;
use crate::order::StoreOrder;
use crate::ports::OrderStore;

/// Result of a checkout
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The created order
    pub order: StoreOrder,
    /// Whether a coupon was consumed
    pub coupon_used: bool,
    /// Discount applied (zero when no coupon matched)
    pub discount_amount: Money,
}

/// Creates store orders, consuming coupons where they apply
pub struct CheckoutService {
    tenants: Arc<dyn TenantDirectory>,
    orders: Arc<dyn OrderStore>,
    redeemer: Arc<CouponRedeemer>,
}

impl CheckoutService {
    pub fn new(
        tenants: Arc<dyn TenantDirectory>,
        orders: Arc<dyn OrderStore>,
        redeemer: Arc<CouponRedeemer>,
    ) -> Self {
        Self {
            tenants,
            orders,
            redeemer,
        }
    }

    /// Creates an order, redeeming the given coupon code when valid
    ///
    /// Redemption is soft-fail: an unmatched code leaves the order at the
    /// plain amount. The caller decides whether to tell the shopper their
    /// coupon did not apply.
    #[instrument(skip(self, items), fields(tenant = %tenant_id))]
    pub async fn create_order(
        &self,
        tenant_id: TenantId,
        total_amount: Money,
        items: serde_json::Value,
        coupon_code: Option<&str>,
    ) -> Result<CheckoutOutcome, StoreError> {
        if !total_amount.is_positive() {
            return Err(StoreError::InvalidAmount(
                "order total must be positive".to_string(),
            ));
        }

        self.tenants
            .lookup(tenant_id)
            .await?
            .ok_or_else(|| StoreError::TenantNotFound(tenant_id.to_string()))?;

        let mut order = StoreOrder::new(tenant_id, total_amount, items);

        let mut coupon_used = false;
        let mut discount_amount = Money::zero(total_amount.currency());

        if let Some(code) = coupon_code {
            let redemption = self
                .redeemer
                .redeem(code, total_amount, order.id)
                .await?;

            if redemption.coupon_consumed {
                order.apply_discount(redemption.discount);
                coupon_used = true;
                discount_amount = redemption.discount;
            }
        }

        self.orders.insert(&order).await?;

        info!(
            order = %order.id,
            total = %order.total_amount,
            paid = %order.paid_amount,
            coupon_used,
            "store order created"
        );

        Ok(CheckoutOutcome {
            order,
            coupon_used,
            discount_amount,
        })
    }

    /// Lists a tenant's orders through the underlying store
    pub async fn orders_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<StoreOrder>, PortError> {
        self.orders
            .list(crate::ports::OrderFilter::for_tenant(tenant_id))
            .await
    }
}
