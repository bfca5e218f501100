//! # Cart Commands
//!
//! Commands that change or show the cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐  add   ┌──────────┐  commit (sale.rs)  ┌──────────┐      │
//! │  │  Empty   │───────►│ Building │───────────────────►│  Empty   │      │
//! │  └──────────┘        └──────────┘                    └──────────┘      │
//! │                        │      ▲                           ▲             │
//! │                   add / edit / remove / undo              │             │
//! │                        │      │                           │             │
//! │                        └──────┘                           │             │
//! │                        │                                  │             │
//! │                        └──────────── abandon ─────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response carries the whole cart, so the display never has to track
//! changes itself.

use serde::Serialize;
use till_core::{Cart, CartEvent, CartLine, CartTotals};
use tracing::debug;

use crate::error::ApiError;
use crate::state::Register;

/// Cart contents and totals, plus the event that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub can_undo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<CartEvent>,
}

impl CartResponse {
    fn new(cart: &Cart, event: Option<CartEvent>) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            totals: cart.totals(),
            can_undo: !cart.history().is_empty(),
            event,
        }
    }
}

/// Shows the current cart.
pub fn get_cart(register: &Register) -> CartResponse {
    debug!("get_cart command");
    CartResponse::new(register.cart(), None)
}

/// Adds units of a product, merging with the line already in the cart.
pub fn add_to_cart(
    register: &mut Register,
    sku: &str,
    quantity: i64,
    discount_percent: u8,
) -> Result<CartResponse, ApiError> {
    let event = register.add_line(sku, quantity, discount_percent)?;
    Ok(CartResponse::new(register.cart(), Some(event)))
}

pub fn edit_cart_line(register: &mut Register, sku: &str, quantity: i64) -> Result<CartResponse, ApiError> {
    let event = register.edit_line(sku, quantity)?;
    Ok(CartResponse::new(register.cart(), Some(event)))
}

pub fn remove_from_cart(register: &mut Register, sku: &str) -> Result<CartResponse, ApiError> {
    let event = register.remove_line(sku)?;
    Ok(CartResponse::new(register.cart(), Some(event)))
}

pub fn undo(register: &mut Register) -> Result<CartResponse, ApiError> {
    let event = register.undo()?;
    Ok(CartResponse::new(register.cart(), Some(event)))
}

pub fn abandon_cart(register: &mut Register) -> CartResponse {
    let event = register.abandon();
    CartResponse::new(register.cart(), Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;
    use till_core::{Inventory, Money, Product};
    use till_store::{Store, StoreConfig};

    fn register(dir: &TempDir) -> Register {
        let store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let inv = Inventory::from_products(vec![Product {
            id: "1".to_string(),
            category: "Hand Tools".to_string(),
            name: "Hammer".to_string(),
            price: Money::from_cents(1000),
            stock: 50,
            next_shipment: None,
            next_shipment_qty: 0,
        }])
        .unwrap();
        store.products().save(&inv).unwrap();
        Register::new(store)
    }

    #[test]
    fn test_add_response() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);

        let response = add_to_cart(&mut reg, "1", 2, 10).unwrap();

        assert_eq!(response.totals.total, Money::from_cents(1800));
        assert!(response.can_undo);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["event"]["event"], "lineAdded");
        assert_eq!(json["event"]["merged"], false);
        assert_eq!(json["lines"][0]["discountPercent"], 10);
    }

    #[test]
    fn test_errors_map_to_codes() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);

        assert_eq!(add_to_cart(&mut reg, "9", 1, 0).unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            add_to_cart(&mut reg, "1", 51, 0).unwrap_err().code,
            ErrorCode::InsufficientStock
        );
        assert_eq!(edit_cart_line(&mut reg, "1", 3).unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(undo(&mut reg).unwrap_err().code, ErrorCode::NothingToUndo);
    }

    #[test]
    fn test_undo_and_abandon_responses() {
        let dir = TempDir::new().unwrap();
        let mut reg = register(&dir);
        add_to_cart(&mut reg, "1", 2, 0).unwrap();
        remove_from_cart(&mut reg, "1").unwrap();

        let response = undo(&mut reg).unwrap();
        assert_eq!(response.lines.len(), 1);

        let response = abandon_cart(&mut reg);
        assert!(response.lines.is_empty());
        assert!(!response.can_undo);
        assert_eq!(get_cart(&reg).totals.line_count, 0);
    }
}
