//! Bill repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{BillId, Money, PortError, DomainPort};
use domain_billing::bill::{Bill, BillStatus, BillType};
use domain_billing::ports::{BillFilter, BillSettlement, BillStore};

use crate::error::DatabaseError;
use crate::repositories::{currency_from_str, to_port};

/// PostgreSQL-backed bill store
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: PgPool,
}

impl BillRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, tenant_id, room_id, bill_type, amount, paid_amount, currency, \
     status, due_date, paid_date, period_start, period_end, details, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct BillRow {
    id: Uuid,
    tenant_id: Uuid,
    room_id: Option<Uuid>,
    bill_type: String,
    amount: Decimal,
    paid_amount: Decimal,
    currency: String,
    status: String,
    due_date: Option<DateTime<Utc>>,
    paid_date: Option<DateTime<Utc>>,
    period_start: Option<DateTime<Utc>>,
    period_end: Option<DateTime<Utc>>,
    details: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BillRow {
    fn into_domain(self) -> Result<Bill, DatabaseError> {
        let currency = currency_from_str(&self.currency)?;
        Ok(Bill {
            id: BillId::from(self.id),
            tenant_id: self.tenant_id.into(),
            room_id: self.room_id.map(Into::into),
            bill_type: bill_type_from_str(&self.bill_type)?,
            amount: Money::new(self.amount, currency),
            paid_amount: Money::new(self.paid_amount, currency),
            status: bill_status_from_str(&self.status)?,
            due_date: self.due_date,
            paid_date: self.paid_date,
            period_start: self.period_start,
            period_end: self.period_end,
            details: self.details,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn bill_type_from_str(value: &str) -> Result<BillType, DatabaseError> {
    match value {
        "rent" => Ok(BillType::Rent),
        "electricity" => Ok(BillType::Electricity),
        "water" => Ok(BillType::Water),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown bill type '{}'",
            other
        ))),
    }
}

fn bill_status_from_str(value: &str) -> Result<BillStatus, DatabaseError> {
    match value {
        "unpaid" => Ok(BillStatus::Unpaid),
        "pending" => Ok(BillStatus::Pending),
        "paid" => Ok(BillStatus::Paid),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown bill status '{}'",
            other
        ))),
    }
}

fn bill_status_to_str(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Unpaid => "unpaid",
        BillStatus::Pending => "pending",
        BillStatus::Paid => "paid",
    }
}

impl DomainPort for BillRepository {}

#[async_trait]
impl BillStore for BillRepository {
    async fn get(&self, id: BillId) -> Result<Bill, PortError> {
        let row: Option<BillRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bills WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        row.ok_or_else(|| PortError::not_found("Bill", id))?
            .into_domain()
            .map_err(Into::into)
    }

    async fn list(&self, filter: BillFilter) -> Result<Vec<Bill>, PortError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM bills WHERE 1=1", SELECT_COLUMNS));

        if let Some(tenant_id) = filter.tenant_id {
            query.push(" AND tenant_id = ");
            query.push_bind(Uuid::from(tenant_id));
        }
        if let Some(room_id) = filter.room_id {
            query.push(" AND room_id = ");
            query.push_bind(Uuid::from(room_id));
        }
        if let Some(bill_type) = filter.bill_type {
            query.push(" AND bill_type = ");
            query.push_bind(bill_type.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(bill_status_to_str(status));
        }
        query.push(" ORDER BY created_at");

        let rows: Vec<BillRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(to_port)?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(Into::into))
            .collect()
    }

    async fn insert(&self, bill: &Bill) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO bills (
                id, tenant_id, room_id, bill_type, amount, paid_amount, currency,
                status, due_date, paid_date, period_start, period_end, details,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(Uuid::from(bill.id))
        .bind(Uuid::from(bill.tenant_id))
        .bind(bill.room_id.map(Uuid::from))
        .bind(bill.bill_type.as_str())
        .bind(bill.amount.amount())
        .bind(bill.paid_amount.amount())
        .bind(bill.amount.currency().code())
        .bind(bill_status_to_str(bill.status))
        .bind(bill.due_date)
        .bind(bill.paid_date)
        .bind(bill.period_start)
        .bind(bill.period_end)
        .bind(&bill.details)
        .bind(bill.created_at)
        .bind(bill.updated_at)
        .execute(&self.pool)
        .await
        .map_err(to_port)?;

        Ok(())
    }

    async fn apply_settlement(
        &self,
        id: BillId,
        settlement: BillSettlement,
        expected: BillStatus,
    ) -> Result<Bill, PortError> {
        // The WHERE status = $expected clause is the optimistic guard; zero
        // rows updated means someone else moved the bill first.
        let row: Option<BillRow> = sqlx::query_as(&format!(
            "UPDATE bills
             SET status = $1, paid_amount = $2, paid_date = $3, updated_at = $4
             WHERE id = $5 AND status = $6
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(bill_status_to_str(settlement.status))
        .bind(settlement.paid_amount.amount())
        .bind(settlement.paid_date)
        .bind(Utc::now())
        .bind(Uuid::from(id))
        .bind(bill_status_to_str(expected))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        match row {
            Some(row) => row.into_domain().map_err(Into::into),
            None => {
                let exists: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM bills WHERE id = $1")
                        .bind(Uuid::from(id))
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(to_port)?;

                if exists.is_some() {
                    Err(DatabaseError::stale("Bill", id).into())
                } else {
                    Err(PortError::not_found("Bill", id))
                }
            }
        }
    }
}
