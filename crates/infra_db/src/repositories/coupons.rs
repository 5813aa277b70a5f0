//! Coupon repository implementation
//!
//! The insert path is where the at-most-once issuance guarantee lives: the
//! partial unique index `coupons_active_bill_key` makes the INSERT itself
//! the arbiter between racing issuance attempts, and the constraint name on
//! the rejection tells the issuer whether to retry (code collision) or back
//! off (reward already exists).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{BillId, CouponId, TenantId, Money, PortError, DomainPort};
use domain_coupon::coupon::{Coupon, CouponStatus};
use domain_coupon::ports::{CouponFilter, CouponInsertError, CouponStore};
use domain_coupon::usage::CouponUsage;

use crate::error::DatabaseError;
use crate::repositories::{currency_from_str, to_port};

const CODE_CONSTRAINT: &str = "coupons_code_key";
const ACTIVE_BILL_CONSTRAINT: &str = "coupons_active_bill_key";

/// PostgreSQL-backed coupon store
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, tenant_id, bill_id, code, amount, min_spend, currency, \
     description, status, valid_until, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    tenant_id: Uuid,
    bill_id: Uuid,
    code: String,
    amount: Decimal,
    min_spend: Decimal,
    currency: String,
    description: String,
    status: String,
    valid_until: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CouponRow {
    fn into_domain(self) -> Result<Coupon, DatabaseError> {
        let currency = currency_from_str(&self.currency)?;
        Ok(Coupon {
            id: CouponId::from(self.id),
            tenant_id: self.tenant_id.into(),
            bill_id: self.bill_id.into(),
            code: self.code,
            amount: Money::new(self.amount, currency),
            min_spend: Money::new(self.min_spend, currency),
            description: self.description,
            status: coupon_status_from_str(&self.status)?,
            valid_until: self.valid_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn coupon_status_from_str(value: &str) -> Result<CouponStatus, DatabaseError> {
    match value {
        "active" => Ok(CouponStatus::Active),
        "used" => Ok(CouponStatus::Used),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown coupon status '{}'",
            other
        ))),
    }
}

fn coupon_status_to_str(status: CouponStatus) -> &'static str {
    match status {
        CouponStatus::Active => "active",
        CouponStatus::Used => "used",
    }
}

impl DomainPort for CouponRepository {}

#[async_trait]
impl CouponStore for CouponRepository {
    async fn get(&self, id: CouponId) -> Result<Coupon, PortError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        row.ok_or_else(|| PortError::not_found("Coupon", id))?
            .into_domain()
            .map_err(Into::into)
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, PortError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons WHERE code = $1",
            SELECT_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        row.map(|r| r.into_domain().map_err(Into::into)).transpose()
    }

    async fn list(&self, filter: CouponFilter) -> Result<Vec<Coupon>, PortError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM coupons WHERE 1=1", SELECT_COLUMNS));

        if let Some(tenant_id) = filter.tenant_id {
            query.push(" AND tenant_id = ");
            query.push_bind(Uuid::from(tenant_id));
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(coupon_status_to_str(status));
        }
        query.push(" ORDER BY created_at");

        let rows: Vec<CouponRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(to_port)?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(Into::into))
            .collect()
    }

    async fn find_active_for_bill(
        &self,
        tenant_id: TenantId,
        bill_id: BillId,
    ) -> Result<Option<Coupon>, PortError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons
             WHERE tenant_id = $1 AND bill_id = $2 AND status = 'active'",
            SELECT_COLUMNS
        ))
        .bind(Uuid::from(tenant_id))
        .bind(Uuid::from(bill_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        row.map(|r| r.into_domain().map_err(Into::into)).transpose()
    }

    async fn insert(&self, coupon: &Coupon) -> Result<(), CouponInsertError> {
        let result = sqlx::query(
            "INSERT INTO coupons (
                id, tenant_id, bill_id, code, amount, min_spend, currency,
                description, status, valid_until, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(Uuid::from(coupon.id))
        .bind(Uuid::from(coupon.tenant_id))
        .bind(Uuid::from(coupon.bill_id))
        .bind(&coupon.code)
        .bind(coupon.amount.amount())
        .bind(coupon.min_spend.amount())
        .bind(coupon.amount.currency().code())
        .bind(&coupon.description)
        .bind(coupon_status_to_str(coupon.status))
        .bind(coupon.valid_until)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(CODE_CONSTRAINT) =>
            {
                Err(CouponInsertError::DuplicateCode)
            }
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(ACTIVE_BILL_CONSTRAINT) =>
            {
                Err(CouponInsertError::DuplicateActiveBill)
            }
            Err(e) => Err(CouponInsertError::Store(to_port(e))),
        }
    }

    async fn consume(&self, id: CouponId) -> Result<Coupon, PortError> {
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "UPDATE coupons
             SET status = 'used', updated_at = $1
             WHERE id = $2 AND status = 'active'
             RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(Utc::now())
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(to_port)?;

        match row {
            Some(row) => row.into_domain().map_err(Into::into),
            None => {
                let exists: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM coupons WHERE id = $1")
                        .bind(Uuid::from(id))
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(to_port)?;

                if exists.is_some() {
                    Err(DatabaseError::stale("Coupon", id).into())
                } else {
                    Err(PortError::not_found("Coupon", id))
                }
            }
        }
    }

    async fn record_usage(&self, usage: &CouponUsage) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO coupon_usages (
                id, coupon_id, tenant_id, order_id, amount, currency, used_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::from(usage.id))
        .bind(Uuid::from(usage.coupon_id))
        .bind(Uuid::from(usage.tenant_id))
        .bind(Uuid::from(usage.order_id))
        .bind(usage.amount.amount())
        .bind(usage.amount.currency().code())
        .bind(usage.used_at)
        .execute(&self.pool)
        .await
        .map_err(to_port)?;

        Ok(())
    }
}
