//! Database error types
//!
//! This module defines the error types that can occur during database
//! operations and their mapping into the shared `PortError` taxonomy the
//! domain layer consumes.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// An expected-status guard did not match
    #[error("Stale state: {0}")]
    StaleState(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Bill", "BILL-123");
    /// assert!(error.to_string().contains("Bill"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Creates a stale-state error for a failed expected-status guard
    pub fn stale(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::StaleState(format!(
            "{} with id '{}' is not in the expected state",
            entity, id
        ))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// Analyzes the SQLx error and maps it based on the PostgreSQL error code.
/// See https://www.postgresql.org/docs/current/errcodes-appendix.html
pub fn classify_sqlx_error(error: sqlx::Error) -> DatabaseError {
    match &error {
        sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
        sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "23505" => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                    "23503" => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                    "23514" => DatabaseError::ConstraintViolation(db_err.message().to_string()),
                    _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                }
            } else {
                DatabaseError::QueryFailed(db_err.message().to_string())
            }
        }
        _ => DatabaseError::SqlError(error),
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(message) => PortError::NotFound {
                entity_type: "record".to_string(),
                id: message,
            },
            DatabaseError::DuplicateEntry(message)
            | DatabaseError::ConstraintViolation(message)
            | DatabaseError::ForeignKeyViolation(message)
            | DatabaseError::StaleState(message) => PortError::Conflict { message },
            DatabaseError::ConnectionFailed(message) => PortError::Connection {
                message,
                source: None,
            },
            DatabaseError::PoolExhausted => PortError::ServiceUnavailable {
                service: "postgres".to_string(),
            },
            other => PortError::Internal {
                message: other.to_string(),
                source: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let error = DatabaseError::not_found("Payment", "PAY-1");
        assert!(error.is_not_found());
        assert!(!error.is_constraint_violation());
    }

    #[test]
    fn test_stale_maps_to_conflict() {
        let port: PortError = DatabaseError::stale("Bill", "BILL-1").into();
        assert!(port.is_conflict());
    }

    #[test]
    fn test_pool_exhausted_is_transient() {
        let port: PortError = DatabaseError::PoolExhausted.into();
        assert!(port.is_transient());
    }
}
