//! Store order handlers

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use core_kernel::Money;
use domain_store::ports::{OrderFilter, OrderStore};

use crate::dto::orders::{
    CreateOrderRequest, CreateOrderResponse, OrderListResponse, OrderResponse,
};
use crate::{error::ApiError, AppState};

/// Creates a store order, redeeming a coupon when one is presented
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    request.validate()?;

    let outcome = state
        .checkout
        .create_order(
            request.tenant_id.into(),
            Money::cny(request.total_amount),
            request.items,
            request.coupon_code.as_deref(),
        )
        .await?;

    let message = if outcome.coupon_used {
        "purchase completed, coupon applied".to_string()
    } else {
        "purchase completed".to_string()
    };

    Ok(Json(CreateOrderResponse {
        success: true,
        data: OrderResponse::from(&outcome.order),
        coupon_used: outcome.coupon_used,
        discount_amount: format!("{:.2}", outcome.discount_amount.amount()),
        message,
    }))
}

/// Lists store orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<crate::dto::orders::OrderQuery>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let filter = OrderFilter {
        tenant_id: query.tenant_id.map(Into::into),
        ..Default::default()
    };

    let orders = state.orders.list(filter).await?;

    Ok(Json(OrderListResponse {
        success: true,
        data: orders.iter().map(Into::into).collect(),
    }))
}
