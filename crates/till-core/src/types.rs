//! # Domain Types
//!
//! Core domain types used throughout Till.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  ReturnRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (sku)       │   │  id (1, 2, ..)  │   │  id (1, 2, ..)  │       │
//! │  │  name           │   │  lines (frozen) │   │  source_sale_id │       │
//! │  │  price          │   │  total          │   │  lines          │       │
//! │  │  stock          │   │  locked         │   │  refund_total   │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                      │                │
//! │                        ┌────────▼────────┐   ┌────────▼────────┐       │
//! │                        │    SaleLine     │   │   ReturnLine    │       │
//! │                        │  sku, quantity  │   │  sku, quantity  │       │
//! │                        │  unit_price     │   │  charge         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A Product's SKU is its stable key. Sales and returns copy the name and
//! price they need at the moment they are created (snapshot pattern), so a
//! later catalog change never rewrites history.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::money::Money;

/// Timestamp layout used by the sales and returns ledgers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout used for next-shipment dates.
pub const SHIPMENT_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Product
// =============================================================================

/// A product in the Inventory Store.
///
/// Mutated only by sale commit (stock down) and return finalize (stock up).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// SKU - the stable key of the product.
    pub id: String,

    pub category: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Date of the next inbound shipment, if one is scheduled.
    #[ts(as = "Option<String>")]
    pub next_shipment: Option<NaiveDate>,

    /// Units expected on the next shipment.
    pub next_shipment_qty: i64,
}

impl Product {
    /// Checks if `quantity` units can be taken from stock right now.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item frozen into a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    pub sku: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    pub discount_percent: u8,
    /// Line total after discount.
    pub total: Money,
}

impl From<&CartLine> for SaleLine {
    fn from(line: &CartLine) -> Self {
        SaleLine {
            sku: line.sku.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            discount_percent: line.discount_percent,
            total: line.total,
        }
    }
}

/// A committed sale in the Sales Ledger.
///
/// ## Lifecycle
/// ```text
/// Sales Ledger commit ──► Sale { locked: false }
///                               │
///            Returns finalize   │  (exactly once)
///                               ▼
///                         Sale { locked: true }
/// ```
/// The lines never change after commit. `locked` is the only field the
/// engine ever rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: u64,
    #[ts(as = "String")]
    pub timestamp: NaiveDateTime,
    pub lines: Vec<SaleLine>,
    pub total: Money,
    /// True once a return has been finalized against this sale.
    pub locked: bool,
}

impl Sale {
    /// Total units of `sku` sold on this sale, across every line carrying it.
    pub fn purchased_quantity(&self, sku: &str) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.sku == sku)
            .map(|l| l.quantity)
            .sum()
    }

    /// Finds the line matching a SKU or a case-insensitive product name.
    ///
    /// Whitespace around `query` is ignored. SKU comparison is also
    /// case-insensitive so scanned and typed codes behave the same.
    pub fn find_line(&self, query: &str) -> Option<&SaleLine> {
        let query = query.trim();
        self.lines
            .iter()
            .find(|l| l.sku.eq_ignore_ascii_case(query) || l.name.to_lowercase() == query.to_lowercase())
    }

    /// Sum of the line totals. Equal to `total` for every committed sale.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }
}

// =============================================================================
// Returns
// =============================================================================

/// A line of a finalized return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnLine {
    pub sku: String,
    pub name: String,
    /// Units handed back.
    pub quantity: i64,
    /// Refund per unit - the original unit price on the sale.
    pub charge: Money,
}

impl ReturnLine {
    /// Refund for this line (`charge × quantity`).
    pub fn refund(&self) -> Money {
        self.charge.multiply_quantity(self.quantity)
    }
}

/// A finalized return in the Returns Ledger. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnRecord {
    pub id: u64,
    #[ts(as = "String")]
    pub timestamp: NaiveDateTime,
    pub source_sale_id: u64,
    pub lines: Vec<ReturnLine>,
    pub refund_total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sale_line(sku: &str, name: &str, quantity: i64, cents: i64) -> SaleLine {
        SaleLine {
            sku: sku.to_string(),
            name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
            discount_percent: 0,
            total: Money::from_cents(cents * quantity),
        }
    }

    fn test_sale() -> Sale {
        Sale {
            id: 1,
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0))
                .unwrap(),
            lines: vec![
                sale_line("123", "Hammer", 2, 999),
                sale_line("456", "Wire Stripper", 1, 1450),
                sale_line("123", "Hammer", 1, 999),
            ],
            total: Money::from_cents(999 * 3 + 1450),
            locked: false,
        }
    }

    #[test]
    fn test_purchased_quantity_sums_repeated_lines() {
        let sale = test_sale();
        assert_eq!(sale.purchased_quantity("123"), 3);
        assert_eq!(sale.purchased_quantity("456"), 1);
        assert_eq!(sale.purchased_quantity("789"), 0);
    }

    #[test]
    fn test_find_line_by_sku_or_name() {
        let sale = test_sale();
        assert_eq!(sale.find_line("456").map(|l| l.name.as_str()), Some("Wire Stripper"));
        assert_eq!(sale.find_line("  wire STRIPPER ").map(|l| l.sku.as_str()), Some("456"));
        assert!(sale.find_line("Mallet").is_none());
    }

    #[test]
    fn test_lines_total_matches_total() {
        let sale = test_sale();
        assert_eq!(sale.lines_total(), sale.total);
    }

    #[test]
    fn test_return_line_refund() {
        let line = ReturnLine {
            sku: "123".to_string(),
            name: "Hammer".to_string(),
            quantity: 3,
            charge: Money::from_cents(999),
        };
        assert_eq!(line.refund().cents(), 2997);
    }
}
