//! Billing domain errors

use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Invalid bill type: {0}")]
    InvalidBillType(String),

    #[error("Payment already processed: {0}")]
    AlreadyProcessed(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
