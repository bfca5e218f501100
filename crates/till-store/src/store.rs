//! # Store Handle
//!
//! Locates the three store files and hands out repositories over them.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Data Directory                                     │
//! │                                                                         │
//! │  StoreConfig::new(dir) ← file names default, builder overrides         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::open(config) ← creates the directory if missing                │
//! │       │                                                                 │
//! │       ├── store.products() ──► <dir>/products.json  (Inventory Store)  │
//! │       ├── store.sales()    ──► <dir>/sales.json     (Sales Ledger)     │
//! │       └── store.returns()  ──► <dir>/returns.json   (Returns Ledger)   │
//! │                                                                         │
//! │  Missing files read as empty stores and are created on first write.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is cached: every operation reads the current file, so edits made
//! by hand between commands are picked up.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::repository::product::ProductRepository;
use crate::repository::returns::ReturnRepository;
use crate::repository::sale::SaleRepository;

pub const DEFAULT_PRODUCTS_FILE: &str = "products.json";
pub const DEFAULT_SALES_FILE: &str = "sales.json";
pub const DEFAULT_RETURNS_FILE: &str = "returns.json";

// =============================================================================
// Configuration
// =============================================================================

/// Where the store files live.
///
/// ## Example
/// ```rust
/// use till_store::StoreConfig;
///
/// let config = StoreConfig::new("/var/lib/till").sales_file("sales-2025.json");
/// assert!(config.sales_path().ends_with("sales-2025.json"));
/// assert!(config.products_path().ends_with("products.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding all three files.
    pub data_dir: PathBuf,

    /// Default: `products.json`
    pub products_file: String,

    /// Default: `sales.json`
    pub sales_file: String,

    /// Default: `returns.json`
    pub returns_file: String,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            products_file: DEFAULT_PRODUCTS_FILE.to_string(),
            sales_file: DEFAULT_SALES_FILE.to_string(),
            returns_file: DEFAULT_RETURNS_FILE.to_string(),
        }
    }

    pub fn products_file(mut self, name: impl Into<String>) -> Self {
        self.products_file = name.into();
        self
    }

    pub fn sales_file(mut self, name: impl Into<String>) -> Self {
        self.sales_file = name.into();
        self
    }

    pub fn returns_file(mut self, name: impl Into<String>) -> Self {
        self.returns_file = name.into();
        self
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(&self.products_file)
    }

    pub fn sales_path(&self) -> PathBuf {
        self.data_dir.join(&self.sales_file)
    }

    pub fn returns_path(&self) -> PathBuf {
        self.data_dir.join(&self.returns_file)
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handle over the data directory providing repository access.
///
/// ## Usage
/// ```rust,ignore
/// let store = Store::open(StoreConfig::new("./data"))?;
/// let product = store.products().get("123")?;
/// let sale = store.sales().commit(&checkout, now)?;
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Opens the store, creating the data directory if needed.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.data_dir).map_err(|e| StoreError::io(&config.data_dir, e))?;

        info!(
            data_dir = %config.data_dir.display(),
            products = %config.products_file,
            sales = %config.sales_file,
            returns = %config.returns_file,
            "Store opened"
        );

        Ok(Store { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Returns the Inventory Store repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.config.products_path())
    }

    /// Returns the Sales Ledger repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.config.products_path(), self.config.sales_path())
    }

    /// Returns the Returns Ledger repository.
    pub fn returns(&self) -> ReturnRepository {
        ReturnRepository::new(
            self.config.products_path(),
            self.config.sales_path(),
            self.config.returns_path(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::new("/data");
        assert_eq!(config.products_path(), PathBuf::from("/data/products.json"));
        assert_eq!(config.sales_path(), PathBuf::from("/data/sales.json"));
        assert_eq!(config.returns_path(), PathBuf::from("/data/returns.json"));
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("nested").join("data");

        let store = Store::open(StoreConfig::new(&data_dir)).unwrap();

        assert!(data_dir.is_dir());
        assert_eq!(store.data_dir(), data_dir.as_path());
        assert!(store.products().list().unwrap().is_empty());
        assert!(store.sales().load_all().unwrap().is_empty());
        assert!(store.returns().load_all().unwrap().is_empty());
    }
}
