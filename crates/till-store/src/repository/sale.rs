//! # Sale Repository
//!
//! The Sales Ledger: `sales.json`, an append-only array of sales.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Commit                                       │
//! │                                                                         │
//! │  1. LOAD                                                               │
//! │     └── products.json → Inventory, sales.json → Vec<Sale>              │
//! │                                                                         │
//! │  2. APPLY (in memory)                                                  │
//! │     └── id = max(ids) + 1, or 1                                        │
//! │     └── stock -= line.quantity for every line, clamped at 0            │
//! │     └── push Sale { locked: false }                                    │
//! │                                                                         │
//! │  3. WRITE (one WriteBatch)                                             │
//! │     └── products.json, then sales.json                                 │
//! │     └── failure: both files as they were, error returned               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use chrono::NaiveDateTime;
use till_core::{Checkout, CoreError, Sale};
use tracing::{debug, info, warn};

use super::{next_id, read_store_file};
use crate::batch::WriteBatch;
use crate::codec::{decode_inventory, decode_sales, encode_inventory, encode_sales};
use crate::error::StoreResult;
use crate::repository::product::ProductRepository;

/// Repository for the Sales Ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    products_path: PathBuf,
    sales_path: PathBuf,
}

impl SaleRepository {
    pub fn new(products_path: impl Into<PathBuf>, sales_path: impl Into<PathBuf>) -> Self {
        SaleRepository {
            products_path: products_path.into(),
            sales_path: sales_path.into(),
        }
    }

    /// All sales in commit order.
    pub fn load_all(&self) -> StoreResult<Vec<Sale>> {
        match read_store_file(&self.sales_path)? {
            Some(bytes) => decode_sales(&self.sales_path, &bytes),
            None => Ok(Vec::new()),
        }
    }

    /// Gets a sale by id.
    ///
    /// ## Errors
    /// * `Core(SaleNotFound)` - no sale with that id
    pub fn find_by_id(&self, id: u64) -> StoreResult<Sale> {
        debug!(sale_id = id, "Finding sale");
        self.load_all()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::SaleNotFound(id).into())
    }

    /// Commits a checked-out cart as a new sale.
    ///
    /// Stock for each line is decremented (clamped at zero) and the sale is
    /// appended; both files are written together or not at all. A line whose
    /// SKU has since left the Inventory Store is still recorded on the sale.
    ///
    /// ## Returns
    /// The new sale with its assigned id.
    pub fn commit(&self, checkout: &Checkout, timestamp: NaiveDateTime) -> StoreResult<Sale> {
        let mut inventory = ProductRepository::new(&self.products_path).load()?;
        let mut sales = self.load_all()?;

        let id = next_id(sales.iter().map(|s| s.id));
        debug!(sale_id = id, lines = checkout.lines.len(), "Committing sale");

        for line in &checkout.lines {
            match inventory.decrement(&line.sku, line.quantity) {
                Some(change) if change.clamped => warn!(
                    sku = %line.sku,
                    on_hand = change.before,
                    sold = line.quantity,
                    "Sale exceeds stock on hand, clamping at zero"
                ),
                Some(_) => {}
                None => warn!(sku = %line.sku, "Sold product is no longer in inventory"),
            }
        }

        let sale = Sale {
            id,
            timestamp,
            lines: checkout.lines.clone(),
            total: checkout.total,
            locked: false,
        };
        sales.push(sale.clone());

        // Nothing the loader would reject may reach disk.
        let products_bytes = encode_inventory(&self.products_path, &inventory)?;
        let sales_bytes = encode_sales(&self.sales_path, &sales)?;
        decode_inventory(&self.products_path, &products_bytes)?;
        decode_sales(&self.sales_path, &sales_bytes)?;

        let mut batch = WriteBatch::new();
        batch
            .stage(&self.products_path, products_bytes)
            .stage(&self.sales_path, sales_bytes);
        batch.commit()?;

        info!(sale_id = id, total = %sale.total, "Sale committed");
        Ok(sale)
    }
}
