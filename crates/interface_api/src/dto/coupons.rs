//! Coupon DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_coupon::coupon::Coupon;

/// Query parameters for listing coupons
#[derive(Debug, Default, Deserialize)]
pub struct CouponQuery {
    pub tenant_id: Option<Uuid>,
    pub status: Option<String>,
}

/// A coupon over the wire
#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub id: String,
    pub tenant_id: String,
    pub bill_id: String,
    pub code: String,
    pub amount: String,
    pub min_spend: String,
    pub description: String,
    pub status: String,
    pub valid_until: DateTime<Utc>,
}

impl From<&Coupon> for CouponResponse {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id.to_string(),
            tenant_id: coupon.tenant_id.to_string(),
            bill_id: coupon.bill_id.to_string(),
            code: coupon.code.clone(),
            amount: format!("{:.2}", coupon.amount.amount()),
            min_spend: format!("{:.2}", coupon.min_spend.amount()),
            description: coupon.description.clone(),
            status: format!("{:?}", coupon.status).to_lowercase(),
            valid_until: coupon.valid_until,
        }
    }
}

/// Response for coupon listings
#[derive(Debug, Serialize)]
pub struct CouponListResponse {
    pub success: bool,
    pub data: Vec<CouponResponse>,
}
