//! # Return Staging
//!
//! Stages lines for return against one completed sale.
//!
//! ## Returns Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Returns Processor                                  │
//! │                                                                         │
//! │   Idle ──load_receipt(id)──► Staging ──finalize──► Idle                 │
//! │              │                 │  ▲                                     │
//! │    locked? ──┘ AlreadyLocked   │  │ stage_line / unstage_line           │
//! │                                └──┘                                     │
//! │                                                                         │
//! │   finalize applies together:                                            │
//! │     1. stock += staged quantity      (Inventory Store)                  │
//! │     2. append ReturnRecord           (Returns Ledger)                   │
//! │     3. sale.locked = true            (Sales Ledger)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`ReturnSession`] is the `Staging` state. Holding one means a receipt is
//! loaded; dropping it is the only cancellation there is. Stores are applied
//! by till-store from the [`RefundPlan`] this module produces.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ReturnLine, Sale, SaleLine};
use crate::validation::validate_quantity;

/// A line staged for return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StagedLine {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    /// Refund per unit: the undiscounted unit price on the sale.
    pub charge: Money,
}

impl StagedLine {
    pub fn refund(&self) -> Money {
        self.charge.multiply_quantity(self.quantity)
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.sku.eq_ignore_ascii_case(query) || self.name.to_lowercase() == query.to_lowercase()
    }
}

impl From<&StagedLine> for ReturnLine {
    fn from(line: &StagedLine) -> Self {
        ReturnLine {
            sku: line.sku.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            charge: line.charge,
        }
    }
}

/// Everything finalize needs to write: what to restock and what to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundPlan {
    pub source_sale_id: u64,
    pub lines: Vec<ReturnLine>,
    pub refund_total: Money,
}

/// An open return against a loaded, unlocked sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSession {
    sale: Sale,
    staged: Vec<StagedLine>,
}

impl ReturnSession {
    /// Opens a session on `sale`.
    ///
    /// Fails with `AlreadyLocked` if a return was already finalized against
    /// it; no session exists in that case.
    pub fn open(sale: Sale) -> CoreResult<Self> {
        if sale.locked {
            return Err(CoreError::AlreadyLocked(sale.id));
        }
        Ok(ReturnSession {
            sale,
            staged: Vec::new(),
        })
    }

    /// The receipt this session is against.
    pub fn sale(&self) -> &Sale {
        &self.sale
    }

    pub fn sale_id(&self) -> u64 {
        self.sale.id
    }

    pub fn staged(&self) -> &[StagedLine] {
        &self.staged
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Units of `sku` currently staged.
    pub fn staged_quantity(&self, sku: &str) -> i64 {
        self.staged
            .iter()
            .filter(|l| l.sku == sku)
            .map(|l| l.quantity)
            .sum()
    }

    /// Refund the staged lines would pay out right now.
    pub fn refund_total(&self) -> Money {
        self.staged.iter().map(StagedLine::refund).sum()
    }

    /// Stages `quantity` units of the sale line matching `query` (SKU or
    /// case-insensitive name), merging with anything already staged.
    ///
    /// Returns the staged line after the change.
    ///
    /// ## Errors
    /// - `Validation` - quantity ≤ 0 or > 999
    /// - `ReturnLineNotFound` - nothing on the receipt matches `query`
    /// - `ExceedsPurchased` - staged total would pass what the sale sold
    pub fn stage_line(&mut self, query: &str, quantity: i64) -> CoreResult<StagedLine> {
        validate_quantity(quantity)?;

        let SaleLine {
            sku,
            name,
            unit_price,
            ..
        } = self
            .sale
            .find_line(query)
            .cloned()
            .ok_or_else(|| CoreError::ReturnLineNotFound {
                sale_id: self.sale.id,
                query: query.trim().to_string(),
            })?;

        let purchased = self.sale.purchased_quantity(&sku);
        let already_staged = self.staged_quantity(&sku);
        if quantity + already_staged > purchased {
            return Err(CoreError::ExceedsPurchased {
                sku,
                purchased,
                already_staged,
                requested: quantity,
            });
        }

        match self.staged.iter_mut().find(|l| l.sku == sku) {
            Some(line) => {
                line.quantity += quantity;
                Ok(line.clone())
            }
            None => {
                let line = StagedLine {
                    sku,
                    name,
                    quantity,
                    charge: unit_price,
                };
                self.staged.push(line.clone());
                Ok(line)
            }
        }
    }

    /// Takes `quantity` units off the staged line matching `query`.
    ///
    /// Returns the remaining line, or `None` if it dropped to zero and was
    /// removed.
    pub fn unstage_line(&mut self, query: &str, quantity: i64) -> CoreResult<Option<StagedLine>> {
        validate_quantity(quantity)?;

        let index = self
            .staged
            .iter()
            .position(|l| l.matches(query))
            .ok_or_else(|| CoreError::StagedLineNotFound(query.trim().to_string()))?;

        let line = &mut self.staged[index];
        line.quantity -= quantity;
        if line.quantity <= 0 {
            self.staged.remove(index);
            return Ok(None);
        }
        Ok(Some(line.clone()))
    }

    /// Builds the refund to apply on finalize. The session is left as is so
    /// a failed write can be retried.
    ///
    /// ## Errors
    /// - `EmptyReturn` - nothing staged
    pub fn prepare_refund(&self) -> CoreResult<RefundPlan> {
        if self.staged.is_empty() {
            return Err(CoreError::EmptyReturn);
        }
        Ok(RefundPlan {
            source_sale_id: self.sale.id,
            lines: self.staged.iter().map(ReturnLine::from).collect(),
            refund_total: self.refund_total(),
        })
    }
}
