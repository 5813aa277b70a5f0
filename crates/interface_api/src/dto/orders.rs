//! Store order DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_store::order::StoreOrder;

/// Checkout body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub tenant_id: Uuid,
    pub total_amount: Decimal,
    /// Item lines as submitted by the till
    pub items: serde_json::Value,
    /// Optional coupon to redeem against this purchase
    #[validate(length(min = 1, max = 50))]
    pub coupon_code: Option<String>,
}

/// Query parameters for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub tenant_id: Option<Uuid>,
}

/// An order over the wire
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub tenant_id: String,
    pub order_number: String,
    pub total_amount: String,
    pub coupon_amount: String,
    pub paid_amount: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&StoreOrder> for OrderResponse {
    fn from(order: &StoreOrder) -> Self {
        Self {
            id: order.id.to_string(),
            tenant_id: order.tenant_id.to_string(),
            order_number: order.order_number.clone(),
            total_amount: format!("{:.2}", order.total_amount.amount()),
            coupon_amount: format!("{:.2}", order.coupon_amount.amount()),
            paid_amount: format!("{:.2}", order.paid_amount.amount()),
            status: format!("{:?}", order.status).to_lowercase(),
            created_at: order.created_at,
        }
    }
}

/// Response for a checkout
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub data: OrderResponse,
    pub coupon_used: bool,
    pub discount_amount: String,
    pub message: String,
}

/// Response for order listings
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub data: Vec<OrderResponse>,
}
