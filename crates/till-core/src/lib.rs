//! # till-core: Pure Business Logic for Till
//!
//! This crate is the **heart** of Till. It holds the cart, its undo history,
//! the return-staging rules and the stock arithmetic as pure functions over
//! in-memory values. Nothing in here touches the filesystem.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/terminal (till binary)                    │   │
//! │  │     add / edit / remove / undo / commit ── return-* commands    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │  returns  │  │ inventory │  │   money   │  │   │
//! │  │   │   Cart    │  │  Return   │  │ Inventory │  │   Money   │  │   │
//! │  │   │ UndoEntry │  │  Session  │  │  Product  │  │ discounts │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • NO CLOCK • PURE FUNCTIONS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  till-store (Persistence Layer)                 │   │
//! │  │        products.json • sales.json • returns.json                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, ReturnRecord, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`inventory`] - In-memory snapshot of the Inventory Store
//! - [`cart`] - The in-progress sale and its undo history
//! - [`returns`] - Staging of return lines against a completed sale
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_cents(1000); // $10.00
//! let line = price.multiply_quantity(2).apply_percentage_discount(1000);
//! assert_eq!(line.cents(), 1800); // 2 × $10.00, 10% off
//! ```

pub mod cart;
pub mod error;
pub mod inventory;
pub mod money;
pub mod returns;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartEvent, CartLine, CartPhase, CartTotals, Checkout, UndoAction, UndoEntry};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::{Inventory, StockSource};
pub use money::Money;
pub use returns::{RefundPlan, ReturnSession, StagedLine};
pub use types::*;

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// Catches keying mistakes (1000 instead of 10) before they reach stock.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum whole-percent discount on a cart line.
pub const MAX_DISCOUNT_PERCENT: u8 = 100;

/// Largest unit price, in cents, a product or sale line may carry.
///
/// A full cart of maximum-quantity lines at this price still fits in `i64`.
pub const MAX_PRICE_CENTS: i64 = i64::MAX / (MAX_ITEM_QUANTITY * MAX_CART_LINES as i64);
