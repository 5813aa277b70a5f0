//! Coupon handlers

use axum::{
    extract::{Query, State},
    Json,
};

use domain_coupon::coupon::CouponStatus;
use domain_coupon::ports::{CouponFilter, CouponStore};

use crate::dto::coupons::{CouponListResponse, CouponQuery};
use crate::{error::ApiError, AppState};

/// Lists coupons
pub async fn list_coupons(
    State(state): State<AppState>,
    Query(query): Query<CouponQuery>,
) -> Result<Json<CouponListResponse>, ApiError> {
    let filter = CouponFilter {
        tenant_id: query.tenant_id.map(Into::into),
        status: query.status.as_deref().map(parse_status).transpose()?,
    };

    let coupons = state.coupons.list(filter).await?;

    Ok(Json(CouponListResponse {
        success: true,
        data: coupons.iter().map(Into::into).collect(),
    }))
}

fn parse_status(value: &str) -> Result<CouponStatus, ApiError> {
    match value {
        "active" => Ok(CouponStatus::Active),
        "used" => Ok(CouponStatus::Used),
        other => Err(ApiError::Validation(format!(
            "unknown coupon status '{}'",
            other
        ))),
    }
}
