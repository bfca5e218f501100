//! # Register State
//!
//! The cart bound to the stores it validates and commits against.
//!
//! ## Register Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register Operations                                  │
//! │                                                                         │
//! │  Command            Register method        Touches                      │
//! │  ───────            ───────────────        ───────                      │
//! │                                                                         │
//! │  add 1 2 ──────────► add_line() ─────────► products.json (read)        │
//! │  edit 1 4 ─────────► edit_line() ────────► products.json (read)        │
//! │  remove 1 ─────────► remove_line() ──────► (cart only)                 │
//! │  undo ─────────────► undo() ─────────────► (cart only)                 │
//! │  commit ───────────► commit() ───────────► products.json + sales.json  │
//! │  abandon ──────────► abandon() ──────────► (cart only)                 │
//! │                                                                         │
//! │  Stock is read fresh for every add/edit so the cart always validates   │
//! │  against what is on disk right now.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use till_core::{Cart, CartEvent, CartTotals, Sale};
use till_store::{Store, StoreResult};
use tracing::debug;

/// The in-progress sale and the stores behind it.
#[derive(Debug, Clone)]
pub struct Register {
    store: Store,
    cart: Cart,
}

impl Register {
    /// Creates a register with an empty cart.
    pub fn new(store: Store) -> Self {
        Register {
            store,
            cart: Cart::new(),
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn add_line(&mut self, sku: &str, quantity: i64, discount_percent: u8) -> StoreResult<CartEvent> {
        debug!(sku = %sku, quantity, discount_percent, "add_line");
        let inventory = self.store.products().load()?;
        Ok(self.cart.add_line(&inventory, sku, quantity, discount_percent)?)
    }

    pub fn edit_line(&mut self, sku: &str, quantity: i64) -> StoreResult<CartEvent> {
        debug!(sku = %sku, quantity, "edit_line");
        let inventory = self.store.products().load()?;
        Ok(self.cart.edit_line(&inventory, sku, quantity)?)
    }

    pub fn remove_line(&mut self, sku: &str) -> StoreResult<CartEvent> {
        debug!(sku = %sku, "remove_line");
        Ok(self.cart.remove_line(sku)?)
    }

    pub fn undo(&mut self) -> StoreResult<CartEvent> {
        debug!(history = self.cart.history().len(), "undo");
        Ok(self.cart.undo()?)
    }

    /// Commits the cart to the Sales Ledger.
    ///
    /// The cart is cleared only once both files are written. On any error it
    /// is left exactly as it was, so the cashier can retry.
    pub fn commit(&mut self, timestamp: NaiveDateTime) -> StoreResult<(Sale, CartEvent)> {
        let checkout = self.cart.checkout()?;
        let sale = self.store.sales().commit(&checkout, timestamp)?;
        let event = self.cart.complete_commit(sale.id);
        Ok((sale, event))
    }

    /// Drops the cart and its undo history. Nothing is written.
    pub fn abandon(&mut self) -> CartEvent {
        debug!(lines = self.cart.lines().len(), "abandon");
        self.cart.abandon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;
    use till_core::{CartPhase, CoreError, Inventory, Money, Product};
    use till_store::{StoreConfig, StoreError};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .unwrap()
    }

    fn product(id: &str, name: &str, cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            category: "Hand Tools".to_string(),
            name: name.to_string(),
            price: Money::from_cents(cents),
            stock,
            next_shipment: None,
            next_shipment_qty: 0,
        }
    }

    fn register(dir: &TempDir) -> Register {
        let store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let inv = Inventory::from_products(vec![
            product("1", "Hammer", 1000, 50),
            product("2", "Tape Measure", 799, 4),
        ])
        .unwrap();
        store.products().save(&inv).unwrap();
        Register::new(store)
    }

    fn stock(reg: &Register, sku: &str) -> i64 {
        reg.store.products().get(sku).unwrap().map(|p| p.stock).unwrap()
    }

    #[test]
    fn test_add_and_commit_hammers() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);

        reg.add_line("1", 2, 0).unwrap();
        let (sale, event) = reg.commit(now()).unwrap();

        assert_eq!(sale.total, Money::from_cents(2000));
        assert_eq!(stock(&reg, "1"), 48);
        assert_eq!(
            event,
            CartEvent::Committed {
                sale_id: sale.id,
                total: Money::from_cents(2000)
            }
        );
        assert_eq!(reg.cart().phase(), CartPhase::Empty);
        assert!(reg.cart().history().is_empty());
    }

    #[test]
    fn test_commit_empty_cart() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);

        let err = reg.commit(now()).unwrap_err();

        assert!(matches!(err, StoreError::Core(CoreError::EmptyCart)));
        assert!(reg.store.sales().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_repeated_add_merges() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);

        reg.add_line("1", 3, 0).unwrap();
        reg.add_line("1", 2, 0).unwrap();

        assert_eq!(reg.cart().lines().len(), 1);
        assert_eq!(reg.cart().line("1").map(|l| l.quantity), Some(5));
        assert_eq!(reg.totals().total, Money::from_cents(5000));
    }

    #[test]
    fn test_undo_reverses_merge() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);

        reg.add_line("1", 3, 10).unwrap();
        let before = reg.cart().lines().to_vec();
        reg.add_line("1", 2, 10).unwrap();
        reg.undo().unwrap();

        assert_eq!(reg.cart().lines(), before.as_slice());
    }

    #[test]
    fn test_stock_read_fresh() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);
        reg.add_line("2", 1, 0).unwrap();

        let mut inv = reg.store.products().load().unwrap();
        inv.decrement("2", 3);
        reg.store.products().save(&inv).unwrap();

        let err = reg.edit_line("2", 2).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { available: 1, .. })
        ));
        assert_eq!(reg.cart().line("2").map(|l| l.quantity), Some(1));
    }

    #[test]
    fn test_failed_commit_keeps_cart() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);
        reg.add_line("1", 2, 0).unwrap();
        reg.add_line("2", 1, 0).unwrap();
        let lines = reg.cart().lines().to_vec();

        let sales_path = dir.path().join("sales.json");
        fs::create_dir(&sales_path).unwrap();
        fs::write(sales_path.join("blocker"), "x").unwrap();

        let err = reg.commit(now()).unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(reg.cart().phase(), CartPhase::Building);
        assert_eq!(reg.cart().lines(), lines.as_slice());
        assert_eq!(reg.cart().history().len(), 2);
        assert_eq!(stock(&reg, "1"), 50);
    }

    #[test]
    fn test_abandon_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);
        let before = fs::read(dir.path().join("products.json")).unwrap();

        reg.add_line("1", 5, 0).unwrap();
        reg.remove_line("1").unwrap();
        reg.add_line("2", 2, 0).unwrap();
        let event = reg.abandon();

        assert_eq!(event, CartEvent::Abandoned { discarded_lines: 1 });
        assert_eq!(reg.cart().phase(), CartPhase::Empty);
        assert_eq!(fs::read(dir.path().join("products.json")).unwrap(), before);
        assert!(!dir.path().join("sales.json").exists());
    }
}
