//! # Error Types
//!
//! ```text
//! ValidationError ─► CoreError ─► DbError (mostrador-db) ─► ApiError (register)
//! ```
//!
//! Every checkout rule that can refuse an action has its own variant, and
//! each variant's message carries the values the cashier needs to fix it.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Checkout and sale rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Checked when a line is added and again inside the sale transaction.
    /// Untracked products and products allowing negative stock never fail.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Voiding a sale that is already voided.
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Product is not in the cart.
    #[error("Product {0} not in cart")]
    NotInCart(String),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A tender entry was refused; the ledger is unchanged.
    ///
    /// ## User Workflow
    /// ```text
    /// Remaining: $58.90
    ///      │
    ///      ▼
    /// Cashier types 60.00 on card
    ///      │
    ///      ▼
    /// TenderRejected { reason: "amount $60.00 exceeds remaining $58.90" }
    ///      │
    ///      ▼
    /// UI shows the message, entered tenders stay as they were
    /// ```
    #[error("Payment rejected: {reason}")]
    TenderRejected { reason: String },

    /// Tender entry id does not exist.
    #[error("Payment entry {0} not found")]
    TenderNotFound(u32),

    /// Completion attempted while part of the total is still unpaid.
    #[error("Outstanding balance of {remaining} must be paid before completing the sale")]
    OutstandingBalance { remaining: Money },

    /// More loyalty points requested than the customer holds.
    #[error("Cannot redeem {requested} points: customer has {available}")]
    PointsExceedBalance { requested: i64, available: i64 },

    /// Operation needs a customer attached to the checkout.
    #[error("A customer is required: {reason}")]
    CustomerRequired { reason: String },

    /// Account credit would go past the customer's limit.
    #[error("Credit limit exceeded: limit {limit}, balance would be {requested}")]
    CreditLimitExceeded { limit: Money, requested: Money },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Bad input, refused before any checkout rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Inclusive bounds.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// SKU characters, malformed ids.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "MATE-500".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for MATE-500: available 3, requested 5"
        );

        let err = CoreError::OutstandingBalance {
            remaining: Money::from_cents(5890),
        };
        assert_eq!(
            err.to_string(),
            "Outstanding balance of $58.90 must be paid before completing the sale"
        );
    }

    #[test]
    fn test_points_error_message() {
        let err = CoreError::PointsExceedBalance {
            requested: 500,
            available: 120,
        };
        assert_eq!(err.to_string(), "Cannot redeem 500 points: customer has 120");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 3,
        };
        assert_eq!(err.to_string(), "name must be at least 3 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
