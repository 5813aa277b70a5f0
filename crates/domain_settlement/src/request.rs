//! Payment requests
//!
//! One endpoint accepts every payment kind, but their required fields
//! differ: bill-backed payments must name their bill, while deposits and
//! refunds must not. Modelling the request as a tagged union lets the type
//! system enforce each variant's shape instead of runtime presence checks
//! on a loosely-validated record.

use serde::{Deserialize, Serialize};

use core_kernel::{TenantId, BillId, Money};
use domain_billing::bill::BillType;
use domain_billing::payment::{PaymentMethod, PaymentType};

use crate::error::SettlementError;

/// A validated payment submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentRequest {
    Rent {
        tenant_id: TenantId,
        bill_id: BillId,
        amount: Money,
        method: PaymentMethod,
    },
    Electricity {
        tenant_id: TenantId,
        bill_id: BillId,
        amount: Money,
        method: PaymentMethod,
    },
    Water {
        tenant_id: TenantId,
        bill_id: BillId,
        amount: Money,
        method: PaymentMethod,
    },
    Deposit {
        tenant_id: TenantId,
        amount: Money,
        method: PaymentMethod,
    },
    Refund {
        tenant_id: TenantId,
        amount: Money,
        method: PaymentMethod,
    },
}

impl PaymentRequest {
    /// The submitting tenant
    pub fn tenant_id(&self) -> TenantId {
        match self {
            PaymentRequest::Rent { tenant_id, .. }
            | PaymentRequest::Electricity { tenant_id, .. }
            | PaymentRequest::Water { tenant_id, .. }
            | PaymentRequest::Deposit { tenant_id, .. }
            | PaymentRequest::Refund { tenant_id, .. } => *tenant_id,
        }
    }

    /// The referenced bill, present only on bill-backed variants
    pub fn bill_id(&self) -> Option<BillId> {
        match self {
            PaymentRequest::Rent { bill_id, .. }
            | PaymentRequest::Electricity { bill_id, .. }
            | PaymentRequest::Water { bill_id, .. } => Some(*bill_id),
            PaymentRequest::Deposit { .. } | PaymentRequest::Refund { .. } => None,
        }
    }

    /// The submitted amount
    pub fn amount(&self) -> Money {
        match self {
            PaymentRequest::Rent { amount, .. }
            | PaymentRequest::Electricity { amount, .. }
            | PaymentRequest::Water { amount, .. }
            | PaymentRequest::Deposit { amount, .. }
            | PaymentRequest::Refund { amount, .. } => *amount,
        }
    }

    /// The payment method
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentRequest::Rent { method, .. }
            | PaymentRequest::Electricity { method, .. }
            | PaymentRequest::Water { method, .. }
            | PaymentRequest::Deposit { method, .. }
            | PaymentRequest::Refund { method, .. } => *method,
        }
    }

    /// The payment type recorded on the resulting payment
    pub fn payment_type(&self) -> PaymentType {
        match self {
            PaymentRequest::Rent { .. } => PaymentType::Rent,
            PaymentRequest::Electricity { .. } => PaymentType::Electricity,
            PaymentRequest::Water { .. } => PaymentType::Water,
            PaymentRequest::Deposit { .. } => PaymentType::Deposit,
            PaymentRequest::Refund { .. } => PaymentType::Refund,
        }
    }

    /// The bill type a bill-backed variant expects to settle
    pub fn expected_bill_type(&self) -> Option<BillType> {
        match self {
            PaymentRequest::Rent { .. } => Some(BillType::Rent),
            PaymentRequest::Electricity { .. } => Some(BillType::Electricity),
            PaymentRequest::Water { .. } => Some(BillType::Water),
            PaymentRequest::Deposit { .. } | PaymentRequest::Refund { .. } => None,
        }
    }

    /// Validates the request before any mutation
    pub fn validate(&self) -> Result<(), SettlementError> {
        if !self.amount().is_positive() {
            return Err(SettlementError::invalid_argument(
                "amount must be positive",
            ));
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn validate_accepts_exactly_positive_amounts(minor in -1_000_000i64..1_000_000i64) {
            let amount = Money::from_minor(minor, core_kernel::Currency::CNY);
            let request = PaymentRequest::Deposit {
                tenant_id: TenantId::new_v7(),
                amount,
                method: PaymentMethod::Cash,
            };

            prop_assert_eq!(request.validate().is_ok(), minor > 0);
        }
    }
}
