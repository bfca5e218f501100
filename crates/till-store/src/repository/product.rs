//! # Product Repository
//!
//! The Inventory Store: `products.json`, an object keyed by SKU.
//!
//! Reads are point-in-time snapshots for the catalog and cart checks.
//! Stock only changes inside a sale commit or a return finalize, both of
//! which write this file through their own [`WriteBatch`](crate::WriteBatch).

use std::path::PathBuf;

use till_core::{Inventory, Product};
use tracing::debug;

use super::read_store_file;
use crate::batch::WriteBatch;
use crate::codec::{decode_inventory, encode_inventory};
use crate::error::StoreResult;

/// Repository for the Inventory Store.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    path: PathBuf,
}

impl ProductRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProductRepository { path: path.into() }
    }

    /// Loads the whole Inventory Store.
    pub fn load(&self) -> StoreResult<Inventory> {
        match read_store_file(&self.path)? {
            Some(bytes) => decode_inventory(&self.path, &bytes),
            None => Ok(Inventory::new()),
        }
    }

    /// Gets a product by SKU.
    ///
    /// ## Returns
    /// * `Ok(Some(product))` - Product found
    /// * `Ok(None)` - No product with that SKU
    pub fn get(&self, sku: &str) -> StoreResult<Option<Product>> {
        debug!(sku = %sku, "Getting product");
        Ok(self.load()?.get(sku).cloned())
    }

    /// All products in store order.
    pub fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(self.load()?.into_products())
    }

    /// Replaces the Inventory Store with `inventory`.
    pub fn save(&self, inventory: &Inventory) -> StoreResult<()> {
        debug!(products = inventory.len(), "Saving inventory");
        let mut batch = WriteBatch::new();
        batch.stage(&self.path, encode_inventory(&self.path, inventory)?);
        batch.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use crate::error::StoreError;
    use till_core::Money;

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            category: "Plumbing".to_string(),
            name: format!("Fitting {}", id),
            price: Money::from_cents(450),
            stock,
            next_shipment: None,
            next_shipment_qty: 0,
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let repo = ProductRepository::new(dir.path().join("products.json"));
        let inv = Inventory::from_products(vec![product("51", 3), product("50", 0)]).unwrap();

        repo.save(&inv).unwrap();

        assert_eq!(repo.load().unwrap(), inv);
        assert_eq!(repo.get("50").unwrap().map(|p| p.stock), Some(0));
        assert!(repo.get("52").unwrap().is_none());
        let ids: Vec<String> = repo.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["51", "50"]);
    }

    #[test]
    fn test_load_reports_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");
        fs::write(&path, "not json").unwrap();

        let err = ProductRepository::new(&path).load().unwrap_err();
        assert!(err.is_persistence());
    }

    #[test]
    fn test_load_reports_malformed_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("products.json");
        fs::write(
            &path,
            r#"{"1": {"category": "Tools", "name": "Hammer", "price": 10.0, "stock": -3}}"#,
        )
        .unwrap();

        let err = ProductRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { ref id, .. } if id == "1"));
        assert!(!err.is_persistence());
    }
}
