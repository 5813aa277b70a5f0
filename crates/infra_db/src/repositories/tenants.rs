//! Tenant directory repository implementation
//!
//! Tenant CRUD lives outside this core; the settlement flows only need the
//! read-only directory lookup.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{TenantId, PortError, DomainPort};
use domain_billing::ports::{TenantDirectory, TenantRef};

use crate::repositories::to_port;

/// PostgreSQL-backed tenant directory
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    phone: String,
}

impl DomainPort for TenantRepository {}

#[async_trait]
impl TenantDirectory for TenantRepository {
    async fn lookup(&self, id: TenantId) -> Result<Option<TenantRef>, PortError> {
        let row: Option<TenantRow> =
            sqlx::query_as("SELECT id, name, phone FROM tenants WHERE id = $1")
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(to_port)?;

        Ok(row.map(|r| TenantRef {
            id: r.id.into(),
            name: r.name,
            phone: r.phone,
        }))
    }
}
