//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mostrador POS                          │
//! │                                                                         │
//! │  {"id":7,"cmd":"add_tender","args":{"amountCents":60000}}              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ─── CoreError::TenderRejected ── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"id":7,"ok":false,"error":{"code":"PAYMENT_ERROR",                   │
//! │                              "message":"Payment rejected: ..."}}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::error;

use mostrador_core::CoreError;
use mostrador_db::DbError;

/// Error half of a response envelope.
///
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for MATE-500: ..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes the frontend switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    /// Same sale, SKU or document already stored.
    Duplicate,
    DatabaseError,
    /// Operation not allowed in the entity's current state.
    BusinessLogic,
    Internal,
    CartError,
    InsufficientStock,
    /// Tender refused; the entered payments are unchanged.
    PaymentError,
    OutstandingBalance,
    LoyaltyError,
    CustomerRequired,
    CreditLimit,
    UnknownCommand,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn unknown_command(cmd: &str) -> Self {
        ApiError::new(ErrorCode::UnknownCommand, format!("Unknown command: {}", cmd))
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Rejected(core) => ApiError::from(core),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Serialization(e) => {
                error!("Stored data could not be (de)serialized: {}", e);
                ApiError::internal("Stored data is unreadable")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match err {
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InvalidSaleStatus { .. } => ErrorCode::BusinessLogic,
            CoreError::CartTooLarge { .. }
            | CoreError::NotInCart(_)
            | CoreError::EmptyCart => ErrorCode::CartError,
            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
            CoreError::TenderRejected { .. } | CoreError::TenderNotFound(_) => {
                ErrorCode::PaymentError
            }
            CoreError::OutstandingBalance { .. } => ErrorCode::OutstandingBalance,
            CoreError::PointsExceedBalance { .. } => ErrorCode::LoyaltyError,
            CoreError::CustomerRequired { .. } => ErrorCode::CustomerRequired,
            CoreError::CreditLimitExceeded { .. } => ErrorCode::CreditLimit,
        };
        ApiError::new(code, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use mostrador_core::Money;

    #[test]
    fn test_rejected_db_error_keeps_business_code() {
        let err = ApiError::from(DbError::Rejected(CoreError::PointsExceedBalance {
            requested: 500,
            available: 120,
        }));
        assert_eq!(err.code, ErrorCode::LoyaltyError);
        assert!(err.message.contains("500"));
    }

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::from(CoreError::OutstandingBalance {
            remaining: Money::from_cents(5890),
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "OUTSTANDING_BALANCE");
    }

    #[test]
    fn test_internal_details_not_leaked() {
        let err = ApiError::from(DbError::QueryFailed("no such column: secret".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("secret"));
    }
}
