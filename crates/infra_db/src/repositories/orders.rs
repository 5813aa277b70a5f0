//! Store order repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{OrderId, Money, PortError, DomainPort};
use domain_store::order::{OrderStatus, StoreOrder};
use domain_store::ports::{OrderFilter, OrderStore};

use crate::error::DatabaseError;
use crate::repositories::{currency_from_str, to_port};

/// PostgreSQL-backed order store
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, tenant_id, order_number, total_amount, coupon_amount, \
     paid_amount, currency, items, status, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    tenant_id: Uuid,
    order_number: String,
    total_amount: Decimal,
    coupon_amount: Decimal,
    paid_amount: Decimal,
    currency: String,
    items: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<StoreOrder, DatabaseError> {
        let currency = currency_from_str(&self.currency)?;
        Ok(StoreOrder {
            id: OrderId::from(self.id),
            tenant_id: self.tenant_id.into(),
            order_number: self.order_number,
            total_amount: Money::new(self.total_amount, currency),
            coupon_amount: Money::new(self.coupon_amount, currency),
            paid_amount: Money::new(self.paid_amount, currency),
            items: self.items,
            status: order_status_from_str(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn order_status_from_str(value: &str) -> Result<OrderStatus, DatabaseError> {
    match value {
        "pending" => Ok(OrderStatus::Pending),
        "completed" => Ok(OrderStatus::Completed),
        "cancelled" => Ok(OrderStatus::Cancelled),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown order status '{}'",
            other
        ))),
    }
}

fn order_status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Completed => "completed",
        OrderStatus::Cancelled => "cancelled",
    }
}

impl DomainPort for OrderRepository {}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn get(&self, id: OrderId) -> Result<StoreOrder, PortError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM store_orders WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        row.ok_or_else(|| PortError::not_found("Order", id))?
            .into_domain()
            .map_err(Into::into)
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<StoreOrder>, PortError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM store_orders WHERE 1=1",
            SELECT_COLUMNS
        ));

        if let Some(tenant_id) = filter.tenant_id {
            query.push(" AND tenant_id = ");
            query.push_bind(Uuid::from(tenant_id));
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(order_status_to_str(status));
        }
        query.push(" ORDER BY created_at DESC");

        let rows: Vec<OrderRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(to_port)?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(Into::into))
            .collect()
    }

    async fn insert(&self, order: &StoreOrder) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO store_orders (
                id, tenant_id, order_number, total_amount, coupon_amount,
                paid_amount, currency, items, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(Uuid::from(order.id))
        .bind(Uuid::from(order.tenant_id))
        .bind(&order.order_number)
        .bind(order.total_amount.amount())
        .bind(order.coupon_amount.amount())
        .bind(order.paid_amount.amount())
        .bind(order.total_amount.currency().code())
        .bind(&order.items)
        .bind(order_status_to_str(order.status))
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(to_port)?;

        Ok(())
    }
}
