//! Coupon issuance
//!
//! The issuer turns a fully settled, qualifying bill payment into at most
//! one active coupon. Both the settlement engine (auto-confirmed payments)
//! and the approval gate (confirmed large payments) call it, sometimes for
//! the same bill under retries, so the whole path is idempotent per bill.

use std::sync::Arc;

use tracing::{debug, info, warn};

use core_kernel::{TenantId, BillId, Money, PortError};

use crate::coupon::Coupon;
use crate::ports::{ConfigStore, CouponInsertError, CouponStore};
use crate::rule::{CashbackRuleTable, ELECTRICITY_RETURN_RULE_KEY};

/// Attempts at inserting with a regenerated code after a collision
const CODE_RETRY_LIMIT: u32 = 3;

/// Service issuing cashback coupons for settled bills
pub struct CouponIssuer {
    coupons: Arc<dyn CouponStore>,
    config: Arc<dyn ConfigStore>,
    rule_key: String,
}

impl CouponIssuer {
    /// Creates an issuer reading the default electricity rule table
    pub fn new(coupons: Arc<dyn CouponStore>, config: Arc<dyn ConfigStore>) -> Self {
        Self {
            coupons,
            config,
            rule_key: ELECTRICITY_RETURN_RULE_KEY.to_string(),
        }
    }

    /// Overrides the config key the tier table is read from
    pub fn with_rule_key(mut self, key: impl Into<String>) -> Self {
        self.rule_key = key.into();
        self
    }

    /// Issues a coupon for a settled bill, if the paid amount earns one
    ///
    /// Returns `Ok(None)` when no rule table is configured, no tier
    /// qualifies, or the bill already has an active coupon. The at-most-once
    /// guarantee rests on the store's uniqueness constraint: losing the
    /// insert race to a concurrent request resolves to `None` as well.
    pub async fn issue_for_bill(
        &self,
        tenant_id: TenantId,
        bill_id: BillId,
        paid_amount: Money,
    ) -> Result<Option<Coupon>, PortError> {
        let Some(raw) = self.config.get(&self.rule_key).await? else {
            debug!(key = %self.rule_key, "no cashback rule configured");
            return Ok(None);
        };

        let Some(table) = CashbackRuleTable::parse(&raw) else {
            return Ok(None);
        };

        let Some(tier) = table.resolve_tier(paid_amount.amount()) else {
            debug!(%paid_amount, "paid amount reaches no cashback tier");
            return Ok(None);
        };

        // Fast-path idempotency check; the store constraint is the real guard.
        if let Some(existing) = self
            .coupons
            .find_active_for_bill(tenant_id, bill_id)
            .await?
        {
            debug!(coupon = %existing.id, %bill_id, "bill already earned a coupon");
            return Ok(None);
        }

        let mut coupon = Coupon::issue(tenant_id, bill_id, tier);

        for attempt in 0..CODE_RETRY_LIMIT {
            match self.coupons.insert(&coupon).await {
                Ok(()) => {
                    info!(
                        coupon = %coupon.id,
                        %bill_id,
                        amount = %coupon.amount,
                        "cashback coupon issued"
                    );
                    return Ok(Some(coupon));
                }
                Err(CouponInsertError::DuplicateCode) => {
                    warn!(attempt, "coupon code collision, regenerating");
                    coupon.regenerate_code();
                }
                Err(CouponInsertError::DuplicateActiveBill) => {
                    // A concurrent settlement won the race; the reward exists.
                    debug!(%bill_id, "lost issuance race, coupon already active");
                    return Ok(None);
                }
                Err(CouponInsertError::Store(e)) => return Err(e),
            }
        }

        Err(PortError::internal(format!(
            "coupon code generation exhausted {} attempts for bill {}",
            CODE_RETRY_LIMIT, bill_id
        )))
    }
}
