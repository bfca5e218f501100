//! # Repository Module
//!
//! File-backed repositories for the three stores.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Register / ReturnsDesk (terminal app)                                  │
//! │       │                                                                 │
//! │       │  store.sales().commit(&checkout, now)                           │
//! │       ▼                                                                 │
//! │  SaleRepository                                                         │
//! │  ├── load products.json + sales.json                                    │
//! │  ├── apply the change in memory (till-core)                             │
//! │  └── WriteBatch: replace both files, or neither                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JSON files in the data directory                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Inventory Store reads and write-back
//! - [`SaleRepository`](sale::SaleRepository) - Sales Ledger commit and lookup
//! - [`ReturnRepository`](returns::ReturnRepository) - Returns Ledger and return finalize

pub mod product;
pub mod returns;
pub mod sale;

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{StoreError, StoreResult};

/// Reads a store file. A missing or blank file is `None` (empty store).
pub(crate) fn read_store_file(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(path, err)),
    }
}

/// Next id in a ledger: one past the largest, or 1 when empty.
pub(crate) fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}
