//! Settlement engine
//!
//! Turns a payment request into a state transition across bills, payments,
//! and coupons. The write order is deliberate: the payment record is
//! inserted before the bill is touched, so a store failure mid-settlement
//! leaves an orphaned-but-harmless payment rather than a paid bill with no
//! payment behind it. Coupon issuance runs last and is idempotent per bill,
//! which makes the whole settlement safely retryable.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;
use tracing::{info, instrument};

use core_kernel::Money;
use domain_billing::bill::{Bill, BillStatus, BillType};
use domain_billing::payment::Payment;
use domain_billing::ports::{BillSettlement, BillStore, PaymentStore, TenantDirectory};
use domain_coupon::coupon::Coupon;
use domain_coupon::issuer::CouponIssuer;

use crate::error::SettlementError;
use crate::request::PaymentRequest;

/// Amount at which a payment needs manual merchant confirmation
fn default_threshold() -> Money {
    Money::cny(dec!(500))
}

/// Result of a payment submission
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    /// The created payment
    pub payment: Payment,
    /// Coupon issued by the settlement, when the bill type qualifies
    pub coupon: Option<Coupon>,
    /// Whether the payment awaits merchant confirmation
    pub needs_confirmation: bool,
    /// Human-readable summary for the caller
    pub message: String,
}

/// Orchestrates payment submissions
pub struct SettlementEngine {
    tenants: Arc<dyn TenantDirectory>,
    bills: Arc<dyn BillStore>,
    payments: Arc<dyn PaymentStore>,
    issuer: Arc<CouponIssuer>,
    auto_confirm_threshold: Money,
    cashback_types: Vec<BillType>,
}

impl SettlementEngine {
    /// Creates an engine with the default threshold (500) and the default
    /// cashback rule set (electricity only)
    pub fn new(
        tenants: Arc<dyn TenantDirectory>,
        bills: Arc<dyn BillStore>,
        payments: Arc<dyn PaymentStore>,
        issuer: Arc<CouponIssuer>,
    ) -> Self {
        Self {
            tenants,
            bills,
            payments,
            issuer,
            auto_confirm_threshold: default_threshold(),
            cashback_types: vec![BillType::Electricity],
        }
    }

    /// Overrides the auto-confirm threshold
    pub fn with_threshold(mut self, threshold: Money) -> Self {
        self.auto_confirm_threshold = threshold;
        self
    }

    /// Overrides which bill types earn cashback
    pub fn with_cashback_types(mut self, types: Vec<BillType>) -> Self {
        self.cashback_types = types;
        self
    }

    /// Submits a payment
    ///
    /// Small payments complete immediately: the bill goes `unpaid -> paid`
    /// and a qualifying bill type earns a coupon synchronously. Payments at
    /// or above the threshold park the bill in `pending` and defer both
    /// completion and coupon issuance to the approval gate.
    #[instrument(skip(self, request), fields(tenant = %request.tenant_id()))]
    pub async fn submit_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<SettlementOutcome, SettlementError> {
        request.validate()?;

        let tenant = self
            .tenants
            .lookup(request.tenant_id())
            .await?
            .ok_or_else(|| {
                SettlementError::not_found(format!("tenant {}", request.tenant_id()))
            })?;

        let bill = match request.bill_id() {
            Some(bill_id) => Some(self.load_settleable_bill(&request, bill_id).await?),
            None => None,
        };

        let amount = request.amount();
        let needs_confirmation =
            amount.amount() >= self.auto_confirm_threshold.amount();

        let outcome = if needs_confirmation {
            self.submit_pending(&request, bill).await?
        } else {
            self.submit_completed(&request, bill).await?
        };

        info!(
            payment = %outcome.payment.id,
            tenant = %tenant.id,
            %amount,
            needs_confirmation,
            coupon_issued = outcome.coupon.is_some(),
            "payment submitted"
        );

        Ok(outcome)
    }

    /// Fetches the referenced bill and checks it can be settled
    async fn load_settleable_bill(
        &self,
        request: &PaymentRequest,
        bill_id: core_kernel::BillId,
    ) -> Result<Bill, SettlementError> {
        let bill = self.bills.get(bill_id).await?;

        if let Some(expected) = request.expected_bill_type() {
            if bill.bill_type != expected {
                return Err(SettlementError::invalid_argument(format!(
                    "bill {} is a {} bill, not {}",
                    bill_id,
                    bill.bill_type.as_str(),
                    expected.as_str()
                )));
            }
        }

        match bill.status {
            BillStatus::Unpaid => Ok(bill),
            BillStatus::Pending => Err(SettlementError::conflict(format!(
                "bill {} already has a payment awaiting confirmation",
                bill_id
            ))),
            BillStatus::Paid => Err(SettlementError::conflict(format!(
                "bill {} is already paid",
                bill_id
            ))),
        }
    }

    /// Auto-confirmed path: payment completed, bill paid, coupon issued
    async fn submit_completed(
        &self,
        request: &PaymentRequest,
        bill: Option<Bill>,
    ) -> Result<SettlementOutcome, SettlementError> {
        let payment = Payment::completed(
            request.tenant_id(),
            request.bill_id(),
            request.amount(),
            request.payment_type(),
            request.method(),
        );
        self.payments.insert(&payment).await?;

        let mut coupon = None;
        if let Some(bill) = bill {
            self.bills
                .apply_settlement(
                    bill.id,
                    BillSettlement::paid(request.amount(), Utc::now()),
                    BillStatus::Unpaid,
                )
                .await?;

            if self.cashback_types.contains(&bill.bill_type) {
                coupon = self
                    .issuer
                    .issue_for_bill(request.tenant_id(), bill.id, request.amount())
                    .await?;
            }
        }

        let message = if coupon.is_some() {
            "payment completed, cashback coupon issued".to_string()
        } else {
            "payment completed".to_string()
        };

        Ok(SettlementOutcome {
            payment,
            coupon,
            needs_confirmation: false,
            message,
        })
    }

    /// Large-payment path: payment and bill parked pending confirmation
    async fn submit_pending(
        &self,
        request: &PaymentRequest,
        bill: Option<Bill>,
    ) -> Result<SettlementOutcome, SettlementError> {
        let payment = Payment::pending(
            request.tenant_id(),
            request.bill_id(),
            request.amount(),
            request.payment_type(),
            request.method(),
        );
        self.payments.insert(&payment).await?;

        if let Some(bill) = bill {
            self.bills
                .apply_settlement(
                    bill.id,
                    BillSettlement::pending(request.amount()),
                    BillStatus::Unpaid,
                )
                .await?;
        }

        Ok(SettlementOutcome {
            payment,
            coupon: None,
            needs_confirmation: true,
            message: "payment submitted, awaiting merchant confirmation".to_string(),
        })
    }
}
