//! Settlement domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors surfaced by the settlement engine and approval gate
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl SettlementError {
    pub fn not_found(message: impl Into<String>) -> Self {
        SettlementError::NotFound(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SettlementError::InvalidArgument(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        SettlementError::Conflict(message.into())
    }
}

impl From<PortError> for SettlementError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { .. } => SettlementError::NotFound(error.to_string()),
            PortError::Validation { .. } => SettlementError::InvalidArgument(error.to_string()),
            PortError::Conflict { .. } => SettlementError::Conflict(error.to_string()),
            PortError::Unauthorized { .. } => SettlementError::PermissionDenied(error.to_string()),
            PortError::Connection { .. }
            | PortError::ServiceUnavailable { .. }
            | PortError::Internal { .. } => SettlementError::Unavailable(error.to_string()),
        }
    }
}
