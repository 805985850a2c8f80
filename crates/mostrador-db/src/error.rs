//! # Database Error Types
//!
//! ```text
//! sqlx::Error ──────────┐
//!                       ▼
//! CoreError ────────► DbError ────► ApiError (register)
//! (re-checked inside
//!  the sale transaction)
//! ```

use mostrador_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A unique index refused the row.
    ///
    /// `field` is `table.column` as SQLite reports it. Repositories fill in
    /// `value` where they know it: a resubmitted sale reports its sale id, a
    /// repeated receipt on the same device its receipt number.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin or commit failed; the transaction was rolled back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A sale guard (stock, points, credit) refused the write against live
    /// rows. Nothing was persisted.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Outbox payload or stored settings JSON.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}

/// Splits SQLite's constraint message into the failing `table.column`.
///
/// `"UNIQUE constraint failed: products.tenant_id, products.sku"` names the
/// last column, the one a cashier can act on.
fn constraint_field(message: &str) -> Option<&str> {
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
    columns.rsplit(", ").next()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(field) = constraint_field(msg) {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field() {
        assert_eq!(
            constraint_field("UNIQUE constraint failed: sales.id"),
            Some("sales.id")
        );
        assert_eq!(
            constraint_field("UNIQUE constraint failed: products.tenant_id, products.sku"),
            Some("products.sku")
        );
        assert_eq!(constraint_field("no such table: sales"), None);
    }

    #[test]
    fn test_rejected_keeps_core_message() {
        let err = DbError::from(CoreError::EmptyCart);
        assert_eq!(err.to_string(), "Cart is empty");
        assert!(!err.is_duplicate());
    }
}
