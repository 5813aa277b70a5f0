//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_settlement::SettlementError;
use domain_store::StoreError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg.clone())
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            success: false,
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<SettlementError> for ApiError {
    fn from(error: SettlementError) -> Self {
        match error {
            SettlementError::NotFound(msg) => ApiError::NotFound(msg),
            SettlementError::InvalidArgument(msg) => ApiError::Validation(msg),
            SettlementError::PermissionDenied(msg) => ApiError::Forbidden(msg),
            SettlementError::Conflict(msg) => ApiError::Conflict(msg),
            SettlementError::Unavailable(msg) => ApiError::Unavailable(msg),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(error: PortError) -> Self {
        match &error {
            PortError::NotFound { .. } => ApiError::NotFound(error.to_string()),
            PortError::Validation { .. } => ApiError::Validation(error.to_string()),
            PortError::Conflict { .. } => ApiError::Conflict(error.to_string()),
            PortError::Unauthorized { .. } => ApiError::Forbidden(error.to_string()),
            PortError::Connection { .. } | PortError::ServiceUnavailable { .. } => {
                ApiError::Unavailable(error.to_string())
            }
            PortError::Internal { .. } => ApiError::Internal(error.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::TenantNotFound(msg) | StoreError::OrderNotFound(msg) => {
                ApiError::NotFound(msg)
            }
            StoreError::InvalidAmount(msg) => ApiError::Validation(msg),
            StoreError::Store(port) => port.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
