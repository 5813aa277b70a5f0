//! Payment repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{PaymentId, Money, PortError, DomainPort};
use domain_billing::payment::{Payment, PaymentMethod, PaymentStatus, PaymentType};
use domain_billing::ports::{PaymentFilter, PaymentStore};

use crate::error::DatabaseError;
use crate::repositories::{currency_from_str, to_port};

/// PostgreSQL-backed payment store
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, tenant_id, bill_id, amount, currency, payment_type, method, \
     transaction_id, status, remarks, created_at, completed_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    tenant_id: Uuid,
    bill_id: Option<Uuid>,
    amount: Decimal,
    currency: String,
    payment_type: String,
    method: String,
    transaction_id: Option<String>,
    status: String,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PaymentRow {
    fn into_domain(self) -> Result<Payment, DatabaseError> {
        let currency = currency_from_str(&self.currency)?;
        Ok(Payment {
            id: PaymentId::from(self.id),
            tenant_id: self.tenant_id.into(),
            bill_id: self.bill_id.map(Into::into),
            amount: Money::new(self.amount, currency),
            payment_type: payment_type_from_str(&self.payment_type)?,
            method: method_from_str(&self.method)?,
            transaction_id: self.transaction_id,
            status: payment_status_from_str(&self.status)?,
            remarks: self.remarks,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

fn payment_type_from_str(value: &str) -> Result<PaymentType, DatabaseError> {
    match value {
        "rent" => Ok(PaymentType::Rent),
        "electricity" => Ok(PaymentType::Electricity),
        "water" => Ok(PaymentType::Water),
        "deposit" => Ok(PaymentType::Deposit),
        "refund" => Ok(PaymentType::Refund),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown payment type '{}'",
            other
        ))),
    }
}

fn method_from_str(value: &str) -> Result<PaymentMethod, DatabaseError> {
    match value {
        "wechat" => Ok(PaymentMethod::Wechat),
        "alipay" => Ok(PaymentMethod::Alipay),
        "cash" => Ok(PaymentMethod::Cash),
        "bank_transfer" => Ok(PaymentMethod::BankTransfer),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown payment method '{}'",
            other
        ))),
    }
}

fn payment_status_from_str(value: &str) -> Result<PaymentStatus, DatabaseError> {
    match value {
        "pending" => Ok(PaymentStatus::Pending),
        "completed" => Ok(PaymentStatus::Completed),
        "rejected" => Ok(PaymentStatus::Rejected),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown payment status '{}'",
            other
        ))),
    }
}

impl DomainPort for PaymentRepository {}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn get(&self, id: PaymentId) -> Result<Payment, PortError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        row.ok_or_else(|| PortError::not_found("Payment", id))?
            .into_domain()
            .map_err(Into::into)
    }

    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, PortError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM payments WHERE 1=1", SELECT_COLUMNS));

        if let Some(tenant_id) = filter.tenant_id {
            query.push(" AND tenant_id = ");
            query.push_bind(Uuid::from(tenant_id));
        }
        if let Some(bill_id) = filter.bill_id {
            query.push(" AND bill_id = ");
            query.push_bind(Uuid::from(bill_id));
        }
        if let Some(payment_type) = filter.payment_type {
            query.push(" AND payment_type = ");
            query.push_bind(payment_type.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status.as_str());
        }
        query.push(" ORDER BY created_at DESC");

        let rows: Vec<PaymentRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(to_port)?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(Into::into))
            .collect()
    }

    async fn insert(&self, payment: &Payment) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO payments (
                id, tenant_id, bill_id, amount, currency, payment_type, method,
                transaction_id, status, remarks, created_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(Uuid::from(payment.id))
        .bind(Uuid::from(payment.tenant_id))
        .bind(payment.bill_id.map(Uuid::from))
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(payment.payment_type.as_str())
        .bind(payment.method.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.status.as_str())
        .bind(&payment.remarks)
        .bind(payment.created_at)
        .bind(payment.completed_at)
        .execute(&self.pool)
        .await
        .map_err(to_port)?;

        Ok(())
    }

    async fn update_resolution(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> Result<(), PortError> {
        let result = sqlx::query(
            "UPDATE payments
             SET status = $1, remarks = $2, completed_at = $3
             WHERE id = $4 AND status = $5",
        )
        .bind(payment.status.as_str())
        .bind(&payment.remarks)
        .bind(payment.completed_at)
        .bind(Uuid::from(payment.id))
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(to_port)?;

        if result.rows_affected() == 0 {
            let exists: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM payments WHERE id = $1")
                    .bind(Uuid::from(payment.id))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(to_port)?;

            return if exists.is_some() {
                Err(DatabaseError::stale("Payment", payment.id).into())
            } else {
                Err(PortError::not_found("Payment", payment.id))
            };
        }

        Ok(())
    }
}
