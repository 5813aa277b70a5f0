//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL adapters for the rental core,
//! implementing every domain store port on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each repository wraps the
//! connection pool and implements one domain port, hiding SQL from the
//! domain layer. Status-changing updates are conditional (`WHERE status =
//! $expected`), and the coupon table carries a partial unique index over
//! active `(tenant_id, bill_id)` pairs - the store-level guarantee the
//! settlement flows rely on under concurrent requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, repositories::BillRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/rental")).await?;
//! let bills = BillRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;

/// Embedded SQLx migrations for the rental schema
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
