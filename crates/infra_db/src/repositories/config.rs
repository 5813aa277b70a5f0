//! System configuration repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use core_kernel::{PortError, DomainPort};
use domain_coupon::ports::ConfigStore;

use crate::repositories::to_port;

/// PostgreSQL-backed system-config reader
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: PgPool,
}

impl ConfigRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for ConfigRepository {}

#[async_trait]
impl ConfigStore for ConfigRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM system_config WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(to_port)?;

        Ok(row.map(|(value,)| value))
    }
}
