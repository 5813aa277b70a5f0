//! Coupon aggregate

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{CouponId, TenantId, BillId, Money, Currency};
use crate::error::CouponError;
use crate::rule::CashbackTier;

/// Coupon validity window from issuance
const VALIDITY_DAYS: i64 = 30;

/// Minimum spend is this multiple of the cash amount, rounded up
const MIN_SPEND_MULTIPLIER: Decimal = dec!(3);

/// Coupon status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Active,
    Used,
}

/// A cashback reward tied to the bill payment that earned it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique identifier
    pub id: CouponId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Bill whose settlement earned the reward
    pub bill_id: BillId,
    /// Globally unique redemption code
    pub code: String,
    /// Cash value
    pub amount: Money,
    /// Minimum purchase total required to redeem
    pub min_spend: Money,
    /// Human-readable description shown to the tenant
    pub description: String,
    /// Status
    pub status: CouponStatus,
    /// Expiry timestamp
    pub valid_until: DateTime<Utc>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Issues a coupon for a resolved cashback tier
    ///
    /// Minimum spend is `ceil(3 x return_amount)`; validity runs 30 days
    /// from issuance.
    pub fn issue(tenant_id: TenantId, bill_id: BillId, tier: &CashbackTier) -> Self {
        let now = Utc::now();
        let min_spend = (tier.return_amount * MIN_SPEND_MULTIPLIER).ceil();

        Self {
            id: CouponId::new_v7(),
            tenant_id,
            bill_id,
            code: generate_code(),
            amount: Money::cny(tier.return_amount),
            min_spend: Money::cny(min_spend),
            description: format!("{}元券(满{}用)", tier.return_amount, min_spend),
            status: CouponStatus::Active,
            valid_until: now + Duration::days(VALIDITY_DAYS),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the redemption code, used when the store reports a collision
    pub fn regenerate_code(&mut self) {
        self.code = generate_code();
    }

    /// Returns true once the validity window has passed
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        at > self.valid_until
    }

    /// Returns true when the coupon can discount the given purchase total
    pub fn covers(&self, purchase_amount: Money) -> bool {
        self.status == CouponStatus::Active
            && purchase_amount.amount() >= self.min_spend.amount()
    }

    /// Consumes the coupon
    pub fn mark_used(&mut self) -> Result<(), CouponError> {
        if self.status != CouponStatus::Active {
            return Err(CouponError::AlreadyUsed(self.code.clone()));
        }
        self.status = CouponStatus::Used;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Currency of the reward
    pub fn currency(&self) -> Currency {
        self.amount.currency()
    }
}

/// Generates a unique redemption code
fn generate_code() -> String {
    format!("CPN{}", Uuid::new_v4().simple().to_string().to_uppercase())
}
