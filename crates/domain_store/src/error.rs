//! Store domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during checkout
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    Store(#[from] PortError),
}
