//! Approval gate
//!
//! Large payments wait for a human merchant to confirm receipt before the
//! system commits to the financial effect. The gate resolves a pending
//! payment either way: confirmation finishes the settlement the engine
//! started (bill paid, coupon issued), rejection compensates by rolling the
//! bill back to unpaid. Both directions append audit lines to the payment's
//! remarks.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use core_kernel::PaymentId;
use domain_billing::bill::{BillStatus, BillType};
use domain_billing::payment::{Payment, PaymentStatus};
use domain_billing::ports::{BillSettlement, BillStore, PaymentStore};
use domain_coupon::coupon::Coupon;
use domain_coupon::issuer::CouponIssuer;

use crate::error::SettlementError;

/// The configured set of approver identities
///
/// Injected at construction so authorisation stays unit-testable; the gate
/// never reads process environment itself.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    identities: Vec<String>,
}

impl AdminAllowList {
    pub fn new(identities: Vec<String>) -> Self {
        Self { identities }
    }

    /// Parses a comma-separated list, trimming blanks
    pub fn from_csv(raw: &str) -> Self {
        Self {
            identities: raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn is_authorized(&self, identity: &str) -> bool {
        self.identities.iter().any(|i| i == identity)
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// Result of a confirmation
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// Coupon issued by the confirmation, when the bill type qualifies
    pub coupon: Option<Coupon>,
}

/// Resolves pending payments on behalf of the merchant
pub struct ApprovalGate {
    bills: Arc<dyn BillStore>,
    payments: Arc<dyn PaymentStore>,
    issuer: Arc<CouponIssuer>,
    approvers: AdminAllowList,
    cashback_types: Vec<BillType>,
}

impl ApprovalGate {
    /// Creates a gate with the default cashback rule set (electricity only)
    pub fn new(
        bills: Arc<dyn BillStore>,
        payments: Arc<dyn PaymentStore>,
        issuer: Arc<CouponIssuer>,
        approvers: AdminAllowList,
    ) -> Self {
        Self {
            bills,
            payments,
            issuer,
            approvers,
            cashback_types: vec![BillType::Electricity],
        }
    }

    /// Overrides which bill types earn cashback
    pub fn with_cashback_types(mut self, types: Vec<BillType>) -> Self {
        self.cashback_types = types;
        self
    }

    /// Confirms a pending payment
    ///
    /// Completes the payment, marks the bill paid, and issues a coupon when
    /// the bill type qualifies. Issuance is idempotent against the bill, so
    /// a replayed confirmation cannot double-issue.
    #[instrument(skip(self), fields(payment = %payment_id, approver))]
    pub async fn confirm_payment(
        &self,
        payment_id: PaymentId,
        approver: &str,
    ) -> Result<ApprovalOutcome, SettlementError> {
        let mut payment = self.resolve_preconditions(payment_id, approver).await?;

        payment
            .complete(approver)
            .map_err(|_| SettlementError::conflict("payment already processed"))?;
        self.payments
            .update_resolution(&payment, PaymentStatus::Pending)
            .await?;

        let mut coupon = None;
        if let Some(bill_id) = payment.bill_id {
            let bill = self
                .bills
                .apply_settlement(
                    bill_id,
                    BillSettlement::paid(payment.amount, Utc::now()),
                    BillStatus::Pending,
                )
                .await?;

            if self.cashback_types.contains(&bill.bill_type) {
                coupon = self
                    .issuer
                    .issue_for_bill(payment.tenant_id, bill_id, payment.amount)
                    .await?;
            }
        }

        info!(
            payment = %payment.id,
            approver,
            coupon_issued = coupon.is_some(),
            "payment confirmed"
        );

        Ok(ApprovalOutcome { coupon })
    }

    /// Rejects a pending payment, rolling its bill back to unpaid
    #[instrument(skip(self), fields(payment = %payment_id, approver))]
    pub async fn reject_payment(
        &self,
        payment_id: PaymentId,
        approver: &str,
        reason: Option<&str>,
    ) -> Result<(), SettlementError> {
        let mut payment = self.resolve_preconditions(payment_id, approver).await?;

        let reason = reason.unwrap_or("rejected by merchant");
        payment
            .reject(approver, reason)
            .map_err(|_| SettlementError::conflict("payment already processed"))?;
        self.payments
            .update_resolution(&payment, PaymentStatus::Pending)
            .await?;

        if let Some(bill_id) = payment.bill_id {
            self.bills
                .apply_settlement(
                    bill_id,
                    BillSettlement::reverted(payment.amount.currency()),
                    BillStatus::Pending,
                )
                .await?;
        }

        warn!(payment = %payment.id, approver, reason, "payment rejected");

        Ok(())
    }

    /// Shared authorisation and pending-status preconditions
    async fn resolve_preconditions(
        &self,
        payment_id: PaymentId,
        approver: &str,
    ) -> Result<Payment, SettlementError> {
        if !self.approvers.is_authorized(approver) {
            return Err(SettlementError::PermissionDenied(format!(
                "{} is not an approver",
                approver
            )));
        }

        let payment = self.payments.get(payment_id).await?;

        if payment.status != PaymentStatus::Pending {
            return Err(SettlementError::conflict("payment already processed"));
        }

        Ok(payment)
    }
}
