//! # Commands Module
//!
//! Everything the operator can type at the `till>` prompt.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (parsing)
//! ├── product.rs  ◄─── inventory, product
//! ├── cart.rs     ◄─── add, edit, remove, undo, cart, abandon
//! ├── sale.rs     ◄─── commit, receipt
//! └── returns.rs  ◄─── return-load, return-stage, ..., return-finalize
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  till> add 1 2 10%                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Command::parse ──► Command::Add { sku: "1", quantity: 2, discount: 10 }│
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Terminal::execute                                                      │
//! │  cart::add_to_cart(&mut Register, ...) -> Result<CartResponse, ApiError>│
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  {"lines": [...], "totals": {...}, "event": {"event": "lineAdded"}}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command function takes only the state it needs, so it can be tested
//! without the rest of the terminal.

pub mod cart;
pub mod product;
pub mod returns;
pub mod sale;

use till_core::validation::{parse_discount_percent, parse_quantity, parse_sale_id};

use crate::error::ApiError;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        sku: String,
        quantity: i64,
        discount_percent: u8,
    },
    Edit {
        sku: String,
        quantity: i64,
    },
    Remove {
        sku: String,
    },
    Undo,
    Cart,
    Commit,
    Abandon,
    Inventory,
    Product {
        sku: String,
    },
    Receipt {
        sale_id: u64,
    },
    ReturnLoad {
        sale_id: u64,
    },
    ReturnStage {
        query: String,
        quantity: i64,
    },
    ReturnUnstage {
        query: String,
        quantity: i64,
    },
    ReturnSummary,
    ReturnFinalize,
    ReturnCancel,
    Help,
    Quit,
}

/// Usage text for `help`.
pub const HELP: &[(&str, &str)] = &[
    ("add <sku> <qty> [discount%]", "Add units to the cart"),
    ("edit <sku> <qty>", "Set the quantity of a cart line"),
    ("remove <sku>", "Remove a cart line"),
    ("undo", "Revert the last cart action"),
    ("cart", "Show the cart"),
    ("commit", "Record the sale and clear the cart"),
    ("abandon", "Discard the cart"),
    ("inventory", "List products"),
    ("product <sku>", "Show one product"),
    ("receipt <saleId>", "Show a completed sale"),
    ("return-load <saleId>", "Start a return against a sale"),
    ("return-stage <sku|name> <qty>", "Stage units for return"),
    ("return-unstage <sku|name> <qty>", "Take staged units back off"),
    ("return-summary", "Show staged lines and refund"),
    ("return-finalize", "Restock, refund and lock the sale"),
    ("return-cancel", "Discard the return"),
    ("help", "Show this list"),
    ("quit", "Leave the terminal"),
];

impl Command {
    /// Parses one input line.
    ///
    /// Item names for the return commands may contain spaces; the quantity
    /// is always the last word.
    ///
    /// ## Example
    /// ```rust
    /// use till_terminal::commands::Command;
    ///
    /// let cmd = Command::parse("return-stage tape measure 2").unwrap();
    /// assert_eq!(
    ///     cmd,
    ///     Command::ReturnStage { query: "tape measure".to_string(), quantity: 2 }
    /// );
    /// ```
    pub fn parse(line: &str) -> Result<Command, ApiError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Err(ApiError::validation("Empty command"));
        };

        let command = match (name.to_ascii_lowercase().as_str(), args) {
            ("add", [sku, qty]) => Command::Add {
                sku: sku.to_string(),
                quantity: parse_quantity(qty)?,
                discount_percent: 0,
            },
            ("add", [sku, qty, discount]) => Command::Add {
                sku: sku.to_string(),
                quantity: parse_quantity(qty)?,
                discount_percent: parse_discount_percent(discount)?,
            },
            ("edit", [sku, qty]) => Command::Edit {
                sku: sku.to_string(),
                quantity: parse_quantity(qty)?,
            },
            ("remove", [sku]) => Command::Remove {
                sku: sku.to_string(),
            },
            ("undo", []) => Command::Undo,
            ("cart", []) => Command::Cart,
            ("commit", []) => Command::Commit,
            ("abandon", []) => Command::Abandon,
            ("inventory", []) => Command::Inventory,
            ("product", [sku]) => Command::Product {
                sku: sku.to_string(),
            },
            ("receipt", [id]) => Command::Receipt {
                sale_id: parse_sale_id(id)?,
            },
            ("return-load", [id]) => Command::ReturnLoad {
                sale_id: parse_sale_id(id)?,
            },
            ("return-stage", [query @ .., qty]) if !query.is_empty() => Command::ReturnStage {
                query: query.join(" "),
                quantity: parse_quantity(qty)?,
            },
            ("return-unstage", [query @ .., qty]) if !query.is_empty() => Command::ReturnUnstage {
                query: query.join(" "),
                quantity: parse_quantity(qty)?,
            },
            ("return-summary", []) => Command::ReturnSummary,
            ("return-finalize", []) => Command::ReturnFinalize,
            ("return-cancel", []) => Command::ReturnCancel,
            ("help", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (other, _) => {
                return Err(match usage(other) {
                    Some(usage) => ApiError::validation(format!("Usage: {}", usage)),
                    None => ApiError::unknown_command(name),
                });
            }
        };

        Ok(command)
    }
}

/// Usage line for a known command word.
fn usage(command: &str) -> Option<&'static str> {
    HELP.iter()
        .map(|(usage, _)| *usage)
        .find(|usage| usage.split(' ').next() == Some(command))
}
