//! Payment records
//!
//! A payment is one settlement attempt against a bill, or a standalone
//! deposit/refund movement. Its audit trail lives in the remarks field as
//! timestamped lines appended by the settlement engine and the approval
//! gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{PaymentId, TenantId, BillId, Money};
use crate::error::BillingError;

/// Payment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Rent,
    Electricity,
    Water,
    Deposit,
    Refund,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Rent => "rent",
            PaymentType::Electricity => "electricity",
            PaymentType::Water => "water",
            PaymentType::Deposit => "deposit",
            PaymentType::Refund => "refund",
        }
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Wechat,
    Alipay,
    Cash,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Wechat => "wechat",
            PaymentMethod::Alipay => "alipay",
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Wechat
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting merchant confirmation
    Pending,
    /// Settled
    Completed,
    /// Declined by the merchant; terminal
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Rejected => "rejected",
        }
    }
}

/// A payment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Paying tenant
    pub tenant_id: TenantId,
    /// Bill being settled, if any (deposits and refunds have none)
    pub bill_id: Option<BillId>,
    /// Payment amount
    pub amount: Money,
    /// Payment type
    pub payment_type: PaymentType,
    /// Payment method
    pub method: PaymentMethod,
    /// External reference (channel transaction id)
    pub transaction_id: Option<String>,
    /// Status
    pub status: PaymentStatus,
    /// Audit trail of timestamped lines
    pub remarks: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// When status changed to completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Creates a payment that settled immediately (below the confirmation threshold)
    pub fn completed(
        tenant_id: TenantId,
        bill_id: Option<BillId>,
        amount: Money,
        payment_type: PaymentType,
        method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new_v7(),
            tenant_id,
            bill_id,
            amount,
            payment_type,
            method,
            transaction_id: None,
            status: PaymentStatus::Completed,
            remarks: None,
            created_at: now,
            completed_at: Some(now),
        }
    }

    /// Creates a payment awaiting merchant confirmation
    pub fn pending(
        tenant_id: TenantId,
        bill_id: Option<BillId>,
        amount: Money,
        payment_type: PaymentType,
        method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        let mut payment = Self {
            id: PaymentId::new_v7(),
            tenant_id,
            bill_id,
            amount,
            payment_type,
            method,
            transaction_id: None,
            status: PaymentStatus::Pending,
            remarks: None,
            created_at: now,
            completed_at: None,
        };
        payment.append_remark(format!(
            "amount {} requires merchant confirmation",
            amount
        ));
        payment
    }

    /// Sets the external transaction reference
    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Marks a pending payment as confirmed by the given approver
    ///
    /// A rejected payment never transitions back; retried settlements must
    /// create a fresh payment.
    pub fn complete(&mut self, approver: &str) -> Result<(), BillingError> {
        if self.status != PaymentStatus::Pending {
            return Err(BillingError::AlreadyProcessed(self.id.to_string()));
        }
        self.status = PaymentStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.append_remark(format!("confirmed by {}", approver));
        Ok(())
    }

    /// Marks a pending payment as rejected, recording the reason
    pub fn reject(&mut self, approver: &str, reason: &str) -> Result<(), BillingError> {
        if self.status != PaymentStatus::Pending {
            return Err(BillingError::AlreadyProcessed(self.id.to_string()));
        }
        self.status = PaymentStatus::Rejected;
        self.append_remark(format!("rejected by {}: {}", approver, reason));
        Ok(())
    }

    /// Appends a timestamped line to the audit trail
    pub fn append_remark(&mut self, line: impl AsRef<str>) {
        let stamped = format!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M:%S"), line.as_ref());
        match &mut self.remarks {
            Some(remarks) => {
                remarks.push('\n');
                remarks.push_str(&stamped);
            }
            None => self.remarks = Some(stamped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pending_payment() -> Payment {
        Payment::pending(
            TenantId::new_v7(),
            Some(BillId::new_v7()),
            Money::cny(dec!(600)),
            PaymentType::Rent,
            PaymentMethod::Wechat,
        )
    }

    #[test]
    fn test_completed_constructor() {
        let payment = Payment::completed(
            TenantId::new_v7(),
            Some(BillId::new_v7()),
            Money::cny(dec!(300)),
            PaymentType::Electricity,
            PaymentMethod::Wechat,
        );

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert!(payment.completed_at.is_some());
        assert!(payment.remarks.is_none());
    }

    #[test]
    fn test_pending_constructor_records_remark() {
        let payment = pending_payment();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.completed_at.is_none());
        assert!(payment
            .remarks
            .as_deref()
            .unwrap()
            .contains("requires merchant confirmation"));
    }

    #[test]
    fn test_complete_pending() {
        let mut payment = pending_payment();
        payment.complete("13800000001").unwrap();

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert!(payment.completed_at.is_some());
        assert!(payment
            .remarks
            .as_deref()
            .unwrap()
            .contains("confirmed by 13800000001"));
    }

    #[test]
    fn test_reject_records_reason() {
        let mut payment = pending_payment();
        payment.reject("13800000001", "duplicate").unwrap();

        assert_eq!(payment.status, PaymentStatus::Rejected);
        assert!(payment.remarks.as_deref().unwrap().contains("duplicate"));
    }

    #[test]
    fn test_rejected_is_terminal() {
        let mut payment = pending_payment();
        payment.reject("13800000001", "duplicate").unwrap();

        let result = payment.complete("13800000001");
        assert!(matches!(result, Err(BillingError::AlreadyProcessed(_))));
        assert_eq!(payment.status, PaymentStatus::Rejected);
    }

    #[test]
    fn test_completed_cannot_be_rejected() {
        let mut payment = pending_payment();
        payment.complete("13800000001").unwrap();

        assert!(payment.reject("13800000001", "oops").is_err());
    }

    #[test]
    fn test_remark_lines_accumulate() {
        let mut payment = pending_payment();
        payment.append_remark("first");
        payment.append_remark("second");

        let remarks = payment.remarks.as_deref().unwrap();
        assert_eq!(remarks.lines().count(), 3);
    }
}
