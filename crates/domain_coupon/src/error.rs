//! Coupon domain errors

use thiserror::Error;

/// Errors that can occur in the coupon domain
#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("Coupon already used: {0}")]
    AlreadyUsed(String),

    #[error("Coupon code generation exhausted retries")]
    CodeGenerationExhausted,

    #[error("Invalid rule configuration: {0}")]
    InvalidRuleConfig(String),
}
