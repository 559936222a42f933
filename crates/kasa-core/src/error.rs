//! # Error Types
//!
//! Domain-specific error types for kasa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasa-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasa-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in server app)                                            │
//! │  └── ApiError         - What clients see (serialized, with HTTP code)  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, ID, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic
/// failures. They should be caught and translated to user-friendly
/// messages at the API boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A credit (or partial-with-credit) sale was attempted without an
    /// attached customer.
    ///
    /// The source of truth for this rule is here, not the UI: credit
    /// means "defer to a customer balance", so there must be a balance
    /// to defer to.
    #[error("Credit payment requires a customer")]
    CreditRequiresCustomer,

    /// A credit sale would push the customer past their limit.
    #[error("Credit limit exceeded for customer {customer_id}: balance {balance_kurus} + credit {requested_kurus} > limit {limit_kurus}")]
    CreditLimitExceeded {
        customer_id: String,
        balance_kurus: i64,
        requested_kurus: i64,
        limit_kurus: i64,
    },

    /// Payment split buckets do not sum to the sale net.
    ///
    /// ## When This Occurs
    /// - Operator-entered partial amounts exceed the net
    /// - A derived remainder went negative
    #[error("Payment split {split_kurus} does not match net {net_kurus}")]
    SplitMismatch { split_kurus: i64, net_kurus: i64 },

    /// Payment amount is invalid (negative bucket, zero payment, ...).
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Cart is empty at checkout.
    #[error("Cart is empty")]
    EmptyCart,

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Line discount exceeds the line total.
    #[error("Discount {discount_kurus} exceeds line total {line_total_kurus}")]
    DiscountTooLarge {
        discount_kurus: i64,
        line_total_kurus: i64,
    },

    /// The cash day has already been opened/closed for this date.
    #[error("Cash day already has a {movement} record for {date}")]
    DayAlreadyRecorded { movement: String, date: String },

    /// Closing was attempted before opening the day.
    #[error("Cash day {date} has not been opened")]
    DayNotOpened { date: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::SplitMismatch {
            split_kurus: 11_000,
            net_kurus: 12_000,
        };
        assert_eq!(
            err.to_string(),
            "Payment split 11000 does not match net 12000"
        );

        let err = CoreError::CreditRequiresCustomer;
        assert_eq!(err.to_string(), "Credit payment requires a customer");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "name".to_string(),
            min: 3,
        };
        assert_eq!(err.to_string(), "name must be at least 3 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
