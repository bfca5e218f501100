//! # Cart / Transaction Engine
//!
//! Holds the in-progress sale and its undo history.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐   add_line    ┌──────────┐   checkout +   ┌──────────┐   │
//! │  │  Empty   │──────────────►│ Building │───────────────►│  Empty   │   │
//! │  └──────────┘               └──────────┘ complete_commit└──────────┘   │
//! │                               │      ▲                                  │
//! │                   add / edit /│      │                                  │
//! │                   remove/undo └──────┘                                  │
//! │                                                                         │
//! │  abandon() from Building discards lines and history, persists nothing. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Undo
//! Every successful mutation pushes an [`UndoEntry`] holding a full copy of
//! the lines as they were just before it. `undo()` swaps that copy back in
//! verbatim, which also reverses a quantity merge.
//!
//! Every mutating method returns a [`CartEvent`] describing what changed, so
//! the display layer never has to diff the cart itself.
//!
//! The cart does not talk to the stores. `checkout()` hands back what should
//! be committed; the caller commits it to the Sales Ledger and only then calls
//! `complete_commit()`. A failed commit therefore leaves the cart untouched.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::inventory::StockSource;
use crate::money::Money;
use crate::types::{Product, SaleLine};
use crate::validation::{validate_cart_size, validate_discount_percent, validate_quantity};
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart. At most one line per SKU.
///
/// `name` and `unit_price` are copied from the product when the line is
/// first added; a later price change in the store does not touch the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub discount_percent: u8,
    /// `unit_price × quantity × (1 − discount_percent/100)`, to the cent.
    pub total: Money,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64, discount_percent: u8) -> Self {
        CartLine {
            sku: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            discount_percent,
            total: line_total(product.price, quantity, discount_percent),
        }
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total = line_total(self.unit_price, quantity, self.discount_percent);
    }
}

/// Computes a discounted line total, rounded to the cent.
///
/// ## Example
/// ```rust
/// use till_core::cart::line_total;
/// use till_core::Money;
///
/// assert_eq!(line_total(Money::from_cents(1000), 2, 0).cents(), 2000);
/// assert_eq!(line_total(Money::from_cents(1000), 2, 25).cents(), 1500);
/// ```
pub fn line_total(unit_price: Money, quantity: i64, discount_percent: u8) -> Money {
    unit_price
        .multiply_quantity(quantity)
        .apply_percentage_discount(discount_percent as u32 * 100)
}

// =============================================================================
// Undo History
// =============================================================================

/// What a recorded cart action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UndoAction {
    AddLine { sku: String, quantity: i64 },
    #[serde(rename_all = "camelCase")]
    EditQuantity {
        sku: String,
        old_quantity: i64,
        new_quantity: i64,
    },
    RemoveLine { line: CartLine },
}

/// One entry of the undo history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub action: UndoAction,
    /// Cart lines immediately before the action.
    pub snapshot: Vec<CartLine>,
}

// =============================================================================
// Events
// =============================================================================

/// Describes a change to the cart, returned by every mutating method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CartEvent {
    /// A line was created, or merged into the existing line for the SKU.
    #[serde(rename_all = "camelCase")]
    LineAdded {
        line: CartLine,
        added_quantity: i64,
        merged: bool,
    },
    #[serde(rename_all = "camelCase")]
    LineEdited { line: CartLine, old_quantity: i64 },
    LineRemoved { line: CartLine },
    /// The most recent action was reverted.
    Undone { action: UndoAction },
    #[serde(rename_all = "camelCase")]
    Committed { sale_id: u64, total: Money },
    #[serde(rename_all = "camelCase")]
    Abandoned { discarded_lines: usize },
}

// =============================================================================
// Cart
// =============================================================================

/// The cart's lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartPhase {
    Empty,
    Building,
}

/// What `checkout()` hands to the Sales Ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub lines: Vec<SaleLine>,
    /// Sum of the line totals.
    pub total: Money,
}

/// Cart totals summary for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

/// The in-progress sale.
///
/// ## Invariants
/// - Lines are unique by SKU (adding the same SKU merges quantities)
/// - Every line has quantity > 0 and a total consistent with its discount
/// - At most 100 lines, at most 999 units per line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    history: Vec<UndoEntry>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// `Empty` until the first action, `Building` until commit or abandon.
    pub fn phase(&self) -> CartPhase {
        if self.lines.is_empty() && self.history.is_empty() {
            CartPhase::Empty
        } else {
            CartPhase::Building
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `sku`, if any.
    pub fn line(&self, sku: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.sku == sku)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Recorded actions, oldest first.
    pub fn history(&self) -> &[UndoEntry] {
        &self.history
    }

    /// Grand total: the sum of line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            line_count: self.lines.len(),
            total_quantity: self.lines.iter().map(|l| l.quantity).sum(),
            total: self.total(),
        }
    }

    /// Adds `quantity` of `sku`, merging into the existing line if present.
    ///
    /// ## Errors
    /// - `Validation` - quantity ≤ 0 or > 999, discount > 100, merged
    ///   quantity > 999, or a merge with a different discount
    /// - `ProductNotFound` - SKU not in the Inventory Store
    /// - `InsufficientStock` - `quantity` exceeds current stock
    /// - `CartTooLarge` - a new line would exceed 100 lines
    ///
    /// Stock is checked against `quantity` alone, not against units of the
    /// same SKU already in the cart; the ledger clamps at zero on commit.
    ///
    /// Adding a SKU already in the cart at a different discount fails with
    /// `ValidationError::DiscountMismatch`; use [`Cart::edit_line`] or
    /// [`Cart::remove_line`] to change the existing line first.
    pub fn add_line(
        &mut self,
        stock: &impl StockSource,
        sku: &str,
        quantity: i64,
        discount_percent: u8,
    ) -> CoreResult<CartEvent> {
        validate_quantity(quantity)?;
        validate_discount_percent(discount_percent)?;

        let product = stock
            .product(sku)
            .ok_or_else(|| CoreError::ProductNotFound(sku.to_string()))?;

        if !product.can_sell(quantity) {
            return Err(CoreError::InsufficientStock {
                sku: sku.to_string(),
                available: product.stock,
                requested: quantity,
            });
        }

        let snapshot = self.lines.clone();

        let (line, merged) = match self.position(sku) {
            Some(index) => {
                let existing = &mut self.lines[index];
                if existing.discount_percent != discount_percent {
                    return Err(ValidationError::DiscountMismatch {
                        sku: sku.to_string(),
                        existing: existing.discount_percent,
                        requested: discount_percent,
                    }
                    .into());
                }
                let merged_quantity = existing.quantity + quantity;
                validate_quantity(merged_quantity)?;
                existing.set_quantity(merged_quantity);
                (existing.clone(), true)
            }
            None => {
                validate_cart_size(self.lines.len())
                    .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_LINES })?;
                let line = CartLine::from_product(product, quantity, discount_percent);
                self.lines.push(line.clone());
                (line, false)
            }
        };

        self.history.push(UndoEntry {
            action: UndoAction::AddLine {
                sku: sku.to_string(),
                quantity,
            },
            snapshot,
        });

        Ok(CartEvent::LineAdded {
            line,
            added_quantity: quantity,
            merged,
        })
    }

    /// Sets the quantity of an existing line, keeping its discount.
    ///
    /// The new quantity is checked against current store stock only; units
    /// held by this cart are not subtracted first.
    ///
    /// ## Errors
    /// - `Validation` - quantity ≤ 0 or > 999 (use `remove_line` to drop a line)
    /// - `LineNotInCart` - no line for `sku`
    /// - `ProductNotFound` - the product has left the Inventory Store
    /// - `InsufficientStock` - `new_quantity` exceeds current stock
    pub fn edit_line(
        &mut self,
        stock: &impl StockSource,
        sku: &str,
        new_quantity: i64,
    ) -> CoreResult<CartEvent> {
        validate_quantity(new_quantity)?;

        let index = self
            .position(sku)
            .ok_or_else(|| CoreError::LineNotInCart(sku.to_string()))?;

        let available = stock
            .stock(sku)
            .ok_or_else(|| CoreError::ProductNotFound(sku.to_string()))?;
        if new_quantity > available {
            return Err(CoreError::InsufficientStock {
                sku: sku.to_string(),
                available,
                requested: new_quantity,
            });
        }

        let snapshot = self.lines.clone();
        let line = &mut self.lines[index];
        let old_quantity = line.quantity;
        line.set_quantity(new_quantity);
        let line = line.clone();

        self.history.push(UndoEntry {
            action: UndoAction::EditQuantity {
                sku: sku.to_string(),
                old_quantity,
                new_quantity,
            },
            snapshot,
        });

        Ok(CartEvent::LineEdited { line, old_quantity })
    }

    /// Removes the line for `sku`.
    pub fn remove_line(&mut self, sku: &str) -> CoreResult<CartEvent> {
        let index = self
            .position(sku)
            .ok_or_else(|| CoreError::LineNotInCart(sku.to_string()))?;

        let snapshot = self.lines.clone();
        let line = self.lines.remove(index);

        self.history.push(UndoEntry {
            action: UndoAction::RemoveLine { line: line.clone() },
            snapshot,
        });

        Ok(CartEvent::LineRemoved { line })
    }

    /// Restores the lines from before the most recent action.
    pub fn undo(&mut self) -> CoreResult<CartEvent> {
        let entry = self.history.pop().ok_or(CoreError::NothingToUndo)?;
        self.lines = entry.snapshot;
        Ok(CartEvent::Undone {
            action: entry.action,
        })
    }

    /// Prepares the cart for commit without changing it.
    ///
    /// ## Errors
    /// - `EmptyCart` - no lines
    pub fn checkout(&self) -> CoreResult<Checkout> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        Ok(Checkout {
            lines: self.lines.iter().map(SaleLine::from).collect(),
            total: self.total(),
        })
    }

    /// Clears lines and history after the Sales Ledger accepted the sale.
    pub fn complete_commit(&mut self, sale_id: u64) -> CartEvent {
        let total = self.total();
        self.clear();
        CartEvent::Committed { sale_id, total }
    }

    /// Discards lines and history without persisting anything.
    pub fn abandon(&mut self) -> CartEvent {
        let discarded_lines = self.lines.len();
        self.clear();
        CartEvent::Abandoned { discarded_lines }
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.history.clear();
    }

    fn position(&self, sku: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.sku == sku)
    }
}
