//! # Store Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error / ValidationError (record)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds the file and record involved          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in terminal app) ← PERSISTENCE_ERROR or a domain code       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Operator sees the message and may retry                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Core` carries domain failures raised while a store operation runs (an
//! unknown sale id, a sale locked since it was loaded). `MalformedRecord`
//! is a data-validation failure: the file was read and parsed, but a record
//! in it breaks a rule. The rest is the persistence family, reported through
//! [`StoreError::is_persistence`].

use std::path::{Path, PathBuf};

use thiserror::Error;
use till_core::{CoreError, ValidationError};

/// Store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming a store file failed.
    ///
    /// ## When This Occurs
    /// - Data directory not writable
    /// - Disk full
    /// - Target path is occupied by a directory
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A store file is not valid JSON, or has the wrong top-level shape.
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// One record in a store file failed validation at load time.
    #[error("Malformed record '{id}' in {}: {source}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        id: String,
        #[source]
        source: ValidationError,
    },

    /// A multi-file write failed and a file could not be put back.
    ///
    /// The stores may now disagree with each other; the operator must
    /// inspect the data directory.
    #[error("Could not restore {} after a failed write: {reason}", .path.display())]
    RollbackFailed { path: PathBuf, reason: String },

    /// Domain failure raised inside a store operation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StoreError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn malformed(path: impl AsRef<Path>, id: impl Into<String>, source: ValidationError) -> Self {
        StoreError::MalformedRecord {
            path: path.as_ref().to_path_buf(),
            id: id.into(),
            source,
        }
    }

    /// True for failures of the storage itself rather than of a business rule.
    ///
    /// A `MalformedRecord` is not one: the file is readable but its data is
    /// invalid.
    pub fn is_persistence(&self) -> bool {
        !matches!(self, StoreError::Core(_) | StoreError::MalformedRecord { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_classification() {
        let io = StoreError::io("/data/sales.json", std::io::Error::other("disk full"));
        assert!(io.is_persistence());
        assert!(io.to_string().contains("/data/sales.json"));

        let core: StoreError = CoreError::AlreadyLocked(3).into();
        assert!(!core.is_persistence());
        assert_eq!(core.to_string(), "Sale 3 has already been returned and is locked");
    }

    #[test]
    fn test_malformed_message() {
        let err = StoreError::malformed(
            "products.json",
            "17",
            ValidationError::MustNotBeNegative {
                field: "stock".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Malformed record '17' in products.json: stock must not be negative"
        );
        assert!(!err.is_persistence());
    }
}
