//! Coupon redemption
//!
//! Redemption is deliberately soft-fail: a shopper presenting an unknown,
//! consumed, expired, or insufficient coupon still completes the purchase
//! at the plain amount. The caller decides whether to surface the failed
//! match; this service only reports whether a discount applied.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use core_kernel::{OrderId, Money, PortError};

use crate::coupon::{Coupon, CouponStatus};
use crate::ports::CouponStore;
use crate::usage::CouponUsage;

/// Outcome of a redemption attempt
#[derive(Debug, Clone)]
pub struct Redemption {
    /// Discount applied to the purchase (zero on soft failure)
    pub discount: Money,
    /// Whether a coupon was consumed
    pub coupon_consumed: bool,
    /// The consumed coupon, when one applied
    pub coupon: Option<Coupon>,
}

impl Redemption {
    fn none(currency: core_kernel::Currency) -> Self {
        Self {
            discount: Money::zero(currency),
            coupon_consumed: false,
            coupon: None,
        }
    }
}

/// Service consuming coupons against store purchases
pub struct CouponRedeemer {
    coupons: Arc<dyn CouponStore>,
}

impl CouponRedeemer {
    pub fn new(coupons: Arc<dyn CouponStore>) -> Self {
        Self { coupons }
    }

    /// Redeems a coupon code against a purchase
    ///
    /// On success the coupon transitions active -> used, a usage record is
    /// written, and the discount equals the coupon's cash value. Every
    /// validation failure yields a zero discount with the coupon untouched.
    pub async fn redeem(
        &self,
        code: &str,
        purchase_amount: Money,
        order_id: OrderId,
    ) -> Result<Redemption, PortError> {
        let currency = purchase_amount.currency();

        let Some(coupon) = self.coupons.get_by_code(code).await? else {
            debug!(code, "coupon code not found, purchase proceeds undiscounted");
            return Ok(Redemption::none(currency));
        };

        if coupon.status != CouponStatus::Active {
            debug!(coupon = %coupon.id, "coupon no longer active");
            return Ok(Redemption::none(currency));
        }

        if coupon.is_expired(Utc::now()) {
            debug!(coupon = %coupon.id, "coupon expired");
            return Ok(Redemption::none(currency));
        }

        if !coupon.covers(purchase_amount) {
            debug!(
                coupon = %coupon.id,
                %purchase_amount,
                min_spend = %coupon.min_spend,
                "purchase below minimum spend"
            );
            return Ok(Redemption::none(currency));
        }

        // Conditional consumption; a concurrent redemption losing here is a
        // soft failure like any other invalid coupon.
        let consumed = match self.coupons.consume(coupon.id).await {
            Ok(consumed) => consumed,
            Err(PortError::Conflict { .. }) => {
                debug!(coupon = %coupon.id, "coupon consumed concurrently");
                return Ok(Redemption::none(currency));
            }
            Err(e) => return Err(e),
        };

        let usage = CouponUsage::new(
            consumed.id,
            consumed.tenant_id,
            order_id,
            consumed.amount,
        );
        self.coupons.record_usage(&usage).await?;

        info!(
            coupon = %consumed.id,
            %order_id,
            discount = %consumed.amount,
            "coupon redeemed"
        );

        Ok(Redemption {
            discount: consumed.amount,
            coupon_consumed: true,
            coupon: Some(consumed),
        })
    }
}
