//! # Inventory Snapshot
//!
//! An in-memory copy of the Inventory Store.
//!
//! The store crate loads the whole product file into an [`Inventory`], the
//! engine reads and adjusts it, and the store writes it back whole
//! (read-modify-write). Nothing here can drive stock below zero.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::types::Product;

/// Read access to current stock, used by the cart to validate quantities.
///
/// Implemented by [`Inventory`]; tests and callers may supply their own.
pub trait StockSource {
    /// Looks up a product by SKU.
    fn product(&self, sku: &str) -> Option<&Product>;

    /// Units on hand for `sku`, if the product exists.
    fn stock(&self, sku: &str) -> Option<i64> {
        self.product(sku).map(|p| p.stock)
    }
}

/// Result of one stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub before: i64,
    pub after: i64,
    /// True when a decrement asked for more than was on hand.
    pub clamped: bool,
}

/// The product catalog and stock counts, keyed by SKU.
///
/// Products keep the order they were loaded in so a write-back does not
/// shuffle the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an inventory from products, rejecting duplicate SKUs.
    pub fn from_products(products: Vec<Product>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(products.len());
        for (i, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), i).is_some() {
                return Err(ValidationError::InvalidFormat {
                    field: "product id".to_string(),
                    reason: format!("duplicate id '{}'", product.id),
                });
            }
        }
        Ok(Inventory { products, index })
    }

    /// Looks up a product by SKU.
    pub fn get(&self, sku: &str) -> Option<&Product> {
        self.index.get(sku).map(|&i| &self.products[i])
    }

    /// All products in store order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Takes `quantity` units out of stock, clamping at zero.
    ///
    /// Returns `None` if the SKU is unknown.
    pub fn decrement(&mut self, sku: &str, quantity: i64) -> Option<StockChange> {
        let product = self.get_mut(sku)?;
        let before = product.stock;
        let after = (before - quantity).max(0);
        product.stock = after;
        Some(StockChange {
            before,
            after,
            clamped: quantity > before,
        })
    }

    /// Puts `quantity` units back into stock.
    ///
    /// Returns `None` if the SKU is unknown.
    pub fn restock(&mut self, sku: &str, quantity: i64) -> Option<StockChange> {
        let product = self.get_mut(sku)?;
        let before = product.stock;
        product.stock = before.saturating_add(quantity);
        Some(StockChange {
            before,
            after: product.stock,
            clamped: false,
        })
    }

    fn get_mut(&mut self, sku: &str) -> Option<&mut Product> {
        let i = *self.index.get(sku)?;
        self.products.get_mut(i)
    }
}

impl StockSource for Inventory {
    fn product(&self, sku: &str) -> Option<&Product> {
        self.get(sku)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            category: "Hand Tools".to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(1000),
            stock,
            next_shipment: None,
            next_shipment_qty: 0,
        }
    }

    #[test]
    fn test_lookup_and_order() {
        let inv = Inventory::from_products(vec![product("2", 5), product("10", 1), product("1", 9)]).unwrap();
        assert_eq!(inv.len(), 3);
        assert_eq!(inv.stock("10"), Some(1));
        assert_eq!(inv.stock("missing"), None);
        let ids: Vec<&str> = inv.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "10", "1"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Inventory::from_products(vec![product("1", 5), product("1", 6)]);
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut inv = Inventory::from_products(vec![product("1", 3)]).unwrap();

        let change = inv.decrement("1", 2).unwrap();
        assert_eq!((change.before, change.after, change.clamped), (3, 1, false));

        let change = inv.decrement("1", 5).unwrap();
        assert_eq!((change.before, change.after, change.clamped), (1, 0, true));
        assert_eq!(inv.stock("1"), Some(0));
    }

    #[test]
    fn test_restock() {
        let mut inv = Inventory::from_products(vec![product("1", 0)]).unwrap();
        assert_eq!(inv.restock("1", 4).map(|c| c.after), Some(4));
        assert!(inv.restock("nope", 1).is_none());
    }
}
