//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Cart, stock and return rule violations         │
//! │  └── ValidationError  - Malformed quantities, discounts, records       │
//! │                                                                         │
//! │  till-store errors (separate crate)                                    │
//! │  └── StoreError       - Store read/write failures                      │
//! │                                                                         │
//! │  terminal errors (in app)                                              │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ApiError → Screen    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal. The caller shows them and lets the cashier retry.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No product with this SKU exists in the Inventory Store.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The cart has no line for this SKU.
    #[error("No cart line for {0}")]
    LineNotInCart(String),

    /// No sale with this id exists in the Sales Ledger.
    #[error("Sale not found: {0}")]
    SaleNotFound(u64),

    /// Nothing on the loaded receipt matches the SKU or name given.
    #[error("No line matching '{query}' on sale {sale_id}")]
    ReturnLineNotFound { sale_id: u64, query: String },

    /// Nothing staged for return matches the SKU or name given.
    #[error("No staged return line matching '{0}'")]
    StagedLineNotFound(String),

    /// Requested more units than the store currently holds.
    ///
    /// ## User Workflow
    /// ```text
    /// add 1 5
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "1", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Staging would return more units than the sale originally sold.
    #[error(
        "Cannot return {requested} of {sku}: purchased {purchased}, already staged {already_staged}"
    )]
    ExceedsPurchased {
        sku: String,
        purchased: i64,
        already_staged: i64,
        requested: i64,
    },

    /// The sale already has a finalized return against it.
    #[error("Sale {0} has already been returned and is locked")]
    AlreadyLocked(u64),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("No items staged for return")]
    EmptyReturn,

    #[error("Nothing to undo")]
    NothingToUndo,

    /// A return operation was attempted with no receipt loaded.
    #[error("No receipt loaded")]
    NoReceiptLoaded,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input and record validation errors.
///
/// Raised for operator input before business logic runs, and by the store
/// codecs when a persisted record is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparseable date, non-numeric quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A merge into an existing cart line would mix two discounts.
    #[error("{sku} is already in the cart at {existing}% off, not {requested}%")]
    DiscountMismatch {
        sku: String,
        existing: u8,
        requested: u8,
    },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "123".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for 123: available 3, requested 5"
        );

        let err = CoreError::AlreadyLocked(7);
        assert_eq!(err.to_string(), "Sale 7 has already been returned and is locked");
    }

    #[test]
    fn test_exceeds_purchased_message() {
        let err = CoreError::ExceedsPurchased {
            sku: "1".to_string(),
            purchased: 2,
            already_staged: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Cannot return 2 of 1: purchased 2, already staged 1"
        );
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
