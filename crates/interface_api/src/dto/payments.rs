//! Payment DTOs
//!
//! Amounts cross the wire as decimal strings with two-digit precision;
//! identifiers are opaque strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::payment::Payment;
use domain_coupon::coupon::Coupon;

use crate::dto::coupons::CouponResponse;

/// Payment submission body
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitPaymentRequest {
    pub tenant_id: Uuid,
    /// Required for rent/electricity/water, absent for deposit/refund
    pub bill_id: Option<Uuid>,
    pub amount: Decimal,
    /// rent | electricity | water | deposit | refund
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 20))]
    pub payment_type: String,
    /// wechat | alipay | cash | bank_transfer (defaults to wechat)
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

/// Approval body for confirm/reject
#[derive(Debug, Deserialize, Validate)]
pub struct ResolvePaymentRequest {
    #[validate(length(min = 1, max = 20))]
    pub admin_phone: String,
    /// Only meaningful for rejections
    pub reason: Option<String>,
}

/// Query parameters for listing payments
#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    pub tenant_id: Option<Uuid>,
    pub bill_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub payment_type: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for the pending approval queue
#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub admin_phone: String,
}

/// A payment over the wire
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub tenant_id: String,
    pub bill_id: Option<String>,
    pub amount: String,
    #[serde(rename = "type")]
    pub payment_type: String,
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            tenant_id: payment.tenant_id.to_string(),
            bill_id: payment.bill_id.map(|id| id.to_string()),
            amount: format!("{:.2}", payment.amount.amount()),
            payment_type: payment.payment_type.as_str().to_string(),
            method: payment.method.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            transaction_id: payment.transaction_id.clone(),
            remarks: payment.remarks.clone(),
            created_at: payment.created_at,
            completed_at: payment.completed_at,
        }
    }
}

/// Response for a payment submission
#[derive(Debug, Serialize)]
pub struct SubmitPaymentResponse {
    pub success: bool,
    pub data: PaymentResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponResponse>,
    pub needs_confirmation: bool,
    pub message: String,
}

/// Response for a confirm/reject resolution
#[derive(Debug, Serialize)]
pub struct ResolvePaymentResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<CouponResponse>,
    pub message: String,
}

impl ResolvePaymentResponse {
    pub fn confirmed(coupon: Option<&Coupon>) -> Self {
        Self {
            success: true,
            coupon: coupon.map(CouponResponse::from),
            message: if coupon.is_some() {
                "payment confirmed, cashback coupon issued".to_string()
            } else {
                "payment confirmed".to_string()
            },
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: true,
            coupon: None,
            message: "payment rejected".to_string(),
        }
    }
}

/// Response for payment listings
#[derive(Debug, Serialize)]
pub struct PaymentListResponse {
    pub success: bool,
    pub data: Vec<PaymentResponse>,
}
