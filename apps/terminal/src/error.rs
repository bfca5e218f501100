//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till                                   │
//! │                                                                         │
//! │  Operator types:  add 123 500                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── StoreError::Io(...) ───────── PERSISTENCE ───►│  │
//! │  │         │     └── StoreError::MalformedRecord ── VALIDATION ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Rule broken? ─── CoreError::InsufficientStock ── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {"error": {"code": "INSUFFICIENT_STOCK",                               │
//! │             "message": "Insufficient stock for 123: ..."}}              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No error ends the session. Persistence failures get their own code so the
//! operator knows the data directory needs attention.

use serde::Serialize;
use till_core::{CoreError, ValidationError};
use till_store::StoreError;

/// API error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 123"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown SKU, sale, cart line or staged line
    NotFound,

    /// Malformed quantity, discount or id
    ValidationError,

    InsufficientStock,

    /// Return would exceed what the sale sold
    ExceedsPurchased,

    /// Sale already has a finalized return
    AlreadyLocked,

    EmptyCart,

    EmptyReturn,

    NothingToUndo,

    /// Return command with no receipt loaded
    NoReceipt,

    /// Cart line limit reached
    CartError,

    /// Store file could not be read or written
    PersistenceError,

    /// Input line did not name a command
    UnknownCommand,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn unknown_command(input: &str) -> Self {
        ApiError::new(
            ErrorCode::UnknownCommand,
            format!("Unknown command '{}'. Type 'help' for a list.", input),
        )
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(e) => ApiError::from(e),
            StoreError::MalformedRecord { .. } => {
                tracing::warn!(error = %err, "Store file holds an invalid record");
                ApiError::validation(err.to_string())
            }
            StoreError::RollbackFailed { .. } => {
                tracing::error!(error = %err, "Stores may be inconsistent");
                ApiError::new(
                    ErrorCode::PersistenceError,
                    format!("{}. Check the data directory before continuing.", err),
                )
            }
            other => {
                tracing::error!(error = %other, "Store operation failed");
                ApiError::new(ErrorCode::PersistenceError, other.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match err {
            CoreError::ProductNotFound(_)
            | CoreError::LineNotInCart(_)
            | CoreError::SaleNotFound(_)
            | CoreError::ReturnLineNotFound { .. }
            | CoreError::StagedLineNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::ExceedsPurchased { .. } => ErrorCode::ExceedsPurchased,
            CoreError::AlreadyLocked(_) => ErrorCode::AlreadyLocked,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::EmptyReturn => ErrorCode::EmptyReturn,
            CoreError::NothingToUndo => ErrorCode::NothingToUndo,
            CoreError::NoReceiptLoaded => ErrorCode::NoReceipt,
            CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::Validation(e) => return ApiError::from(e),
        };
        ApiError::new(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
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

    #[test]
    fn test_core_error_codes() {
        let err = ApiError::from(CoreError::AlreadyLocked(7));
        assert_eq!(err.code, ErrorCode::AlreadyLocked);

        let err = ApiError::from(CoreError::ProductNotFound("9".to_string()));
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = ApiError::from(CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "quantity must be positive");
    }

    #[test]
    fn test_store_error_codes() {
        let err = ApiError::from(StoreError::io(
            "/data/sales.json",
            std::io::Error::other("disk full"),
        ));
        assert_eq!(err.code, ErrorCode::PersistenceError);

        let err = ApiError::from(StoreError::Core(CoreError::SaleNotFound(4)));
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_malformed_record_is_validation_error() {
        let err = ApiError::from(StoreError::malformed(
            "/data/products.json",
            "1",
            ValidationError::MustNotBeNegative {
                field: "stock".to_string(),
            },
        ));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("/data/products.json"));
        assert!(err.message.contains("'1'"));
    }

    #[test]
    fn test_serialization() {
        let err = ApiError::from(CoreError::EmptyCart);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "EMPTY_CART");
        assert_eq!(json["message"], "Cart is empty");
    }
}
