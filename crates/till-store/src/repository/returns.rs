//! # Return Repository
//!
//! The Returns Ledger (`returns.json`) and the finalize step that ties it to
//! the other two stores.
//!
//! ## Finalize
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Return Finalize                                   │
//! │                                                                         │
//! │  RefundPlan (till-core)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load sales.json ── sale gone? SaleNotFound ── locked? AlreadyLocked    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stock += quantity per line    (unknown SKU: warn, skip)                │
//! │  append ReturnRecord           (id = max + 1)                           │
//! │  sale.locked = true                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WriteBatch: products.json, returns.json, sales.json                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is checked again here, not just when the receipt was loaded, so
//! two sessions opened on the same sale cannot both finalize.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use till_core::{CoreError, RefundPlan, ReturnRecord};
use tracing::{debug, info, warn};

use super::{next_id, read_store_file};
use crate::batch::WriteBatch;
use crate::codec::{
    decode_inventory, decode_returns, decode_sales, encode_inventory, encode_returns, encode_sales,
};
use crate::error::StoreResult;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;

/// Repository for the Returns Ledger.
#[derive(Debug, Clone)]
pub struct ReturnRepository {
    products_path: PathBuf,
    sales_path: PathBuf,
    returns_path: PathBuf,
}

impl ReturnRepository {
    pub fn new(
        products_path: impl Into<PathBuf>,
        sales_path: impl Into<PathBuf>,
        returns_path: impl Into<PathBuf>,
    ) -> Self {
        ReturnRepository {
            products_path: products_path.into(),
            sales_path: sales_path.into(),
            returns_path: returns_path.into(),
        }
    }

    /// All finalized returns, oldest first.
    pub fn load_all(&self) -> StoreResult<Vec<ReturnRecord>> {
        match read_store_file(&self.returns_path)? {
            Some(bytes) => decode_returns(&self.returns_path, &bytes),
            None => Ok(Vec::new()),
        }
    }

    /// The return finalized against `sale_id`, if any.
    pub fn find_for_sale(&self, sale_id: u64) -> StoreResult<Option<ReturnRecord>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|r| r.source_sale_id == sale_id))
    }

    /// Applies a refund: restock, record the return, lock the sale.
    ///
    /// All three files are written together or not at all.
    ///
    /// ## Errors
    /// * `Core(SaleNotFound)` - the source sale has left the ledger
    /// * `Core(AlreadyLocked)` - a return was finalized since the receipt was loaded
    /// * persistence errors from reading or writing any of the three files
    pub fn finalize(&self, plan: &RefundPlan, timestamp: NaiveDateTime) -> StoreResult<ReturnRecord> {
        debug!(
            sale_id = plan.source_sale_id,
            lines = plan.lines.len(),
            "Finalizing return"
        );

        let sales_repo = SaleRepository::new(&self.products_path, &self.sales_path);
        let mut sales = sales_repo.load_all()?;
        let sale = sales
            .iter_mut()
            .find(|s| s.id == plan.source_sale_id)
            .ok_or(CoreError::SaleNotFound(plan.source_sale_id))?;
        if sale.locked {
            return Err(CoreError::AlreadyLocked(sale.id).into());
        }
        sale.locked = true;

        let mut inventory = ProductRepository::new(&self.products_path).load()?;
        for line in &plan.lines {
            if inventory.restock(&line.sku, line.quantity).is_none() {
                warn!(sku = %line.sku, quantity = line.quantity, "Returned product not in inventory, restock skipped");
            }
        }

        let mut returns = self.load_all()?;
        let record = ReturnRecord {
            id: next_id(returns.iter().map(|r| r.id)),
            timestamp,
            source_sale_id: plan.source_sale_id,
            lines: plan.lines.clone(),
            refund_total: plan.refund_total,
        };
        returns.push(record.clone());

        let products_bytes = encode_inventory(&self.products_path, &inventory)?;
        let returns_bytes = encode_returns(&self.returns_path, &returns)?;
        let sales_bytes = encode_sales(&self.sales_path, &sales)?;
        decode_inventory(&self.products_path, &products_bytes)?;
        decode_returns(&self.returns_path, &returns_bytes)?;
        decode_sales(&self.sales_path, &sales_bytes)?;

        let mut batch = WriteBatch::new();
        batch
            .stage(&self.products_path, products_bytes)
            .stage(&self.returns_path, returns_bytes)
            .stage(&self.sales_path, sales_bytes);
        batch.commit()?;

        info!(
            return_id = record.id,
            sale_id = record.source_sale_id,
            refund = %record.refund_total,
            "Return finalized"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Store, StoreConfig, StoreError};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;
    use till_core::{Cart, Inventory, Money, Product, ReturnSession};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 3)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    /// Store with one committed sale: 3 × Hammer ($10.00, 20% off), 1 × Saw.
    fn store_with_sale(dir: &TempDir) -> Store {
        let store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let products = ["Hammer", "Saw"]
            .iter()
            .enumerate()
            .map(|(i, name)| Product {
                id: (i + 1).to_string(),
                category: "Hand Tools".to_string(),
                name: name.to_string(),
                price: Money::from_cents(1000 * (i as i64 + 1)),
                stock: 10,
                next_shipment: None,
                next_shipment_qty: 0,
            })
            .collect();
        store
            .products()
            .save(&Inventory::from_products(products).unwrap())
            .unwrap();

        let inv = store.products().load().unwrap();
        let mut cart = Cart::new();
        cart.add_line(&inv, "1", 3, 20).unwrap();
        cart.add_line(&inv, "2", 1, 0).unwrap();
        store.sales().commit(&cart.checkout().unwrap(), at(9)).unwrap();
        store
    }

    fn plan(store: &Store, stage: &[(&str, i64)]) -> RefundPlan {
        let mut session = ReturnSession::open(store.sales().find_by_id(1).unwrap()).unwrap();
        for (query, qty) in stage {
            session.stage_line(query, *qty).unwrap();
        }
        session.prepare_refund().unwrap()
    }

    fn stock(store: &Store, sku: &str) -> Option<i64> {
        store.products().get(sku).unwrap().map(|p| p.stock)
    }

    #[test]
    fn test_finalize_applies_all_three() {
        let dir = TempDir::new().unwrap();
        let store = store_with_sale(&dir);
        assert_eq!(stock(&store, "1"), Some(7));

        let record = store.returns().finalize(&plan(&store, &[("hammer", 2)]), at(11)).unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.source_sale_id, 1);
        // Undiscounted unit price
        assert_eq!(record.refund_total, Money::from_cents(2000));
        assert_eq!(stock(&store, "1"), Some(9));
        assert!(store.sales().find_by_id(1).unwrap().locked);
        assert_eq!(store.returns().find_for_sale(1).unwrap(), Some(record));
    }

    #[test]
    fn test_second_finalize_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_with_sale(&dir);
        let first = plan(&store, &[("1", 1)]);
        let second = plan(&store, &[("2", 1)]);

        store.returns().finalize(&first, at(11)).unwrap();
        let err = store.returns().finalize(&second, at(12)).unwrap_err();

        assert!(matches!(err, StoreError::Core(CoreError::AlreadyLocked(1))));
        assert_eq!(store.returns().load_all().unwrap().len(), 1);
        assert_eq!(stock(&store, "2"), Some(9));
    }

    #[test]
    fn test_missing_product_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store_with_sale(&dir);
        let refund = plan(&store, &[("Saw", 1)]);

        let mut inv = store.products().load().unwrap().into_products();
        inv.retain(|p| p.id != "2");
        store
            .products()
            .save(&Inventory::from_products(inv).unwrap())
            .unwrap();

        let record = store.returns().finalize(&refund, at(11)).unwrap();
        assert_eq!(record.refund_total, Money::from_cents(2000));
        assert_eq!(stock(&store, "2"), None);
        assert!(store.sales().find_by_id(1).unwrap().locked);
    }

    #[test]
    fn test_failed_write_leaves_every_store() {
        let dir = TempDir::new().unwrap();
        let store = store_with_sale(&dir);
        let refund = plan(&store, &[("1", 3)]);
        let products_before = fs::read(dir.path().join("products.json")).unwrap();
        let sales_before = fs::read(dir.path().join("sales.json")).unwrap();

        // returns.json can be neither read nor replaced
        let returns_path = dir.path().join("returns.json");
        fs::create_dir(&returns_path).unwrap();
        fs::write(returns_path.join("blocker"), "x").unwrap();

        let err = store.returns().finalize(&refund, at(11)).unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(fs::read(dir.path().join("products.json")).unwrap(), products_before);
        assert_eq!(fs::read(dir.path().join("sales.json")).unwrap(), sales_before);
        assert!(!store.sales().find_by_id(1).unwrap().locked);
    }
}
