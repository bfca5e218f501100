//! # Returns Desk State
//!
//! The Returns Processor bound to the stores.
//!
//! ## Returns Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Returns Desk                                         │
//! │                                                                         │
//! │   ┌──────────┐  load_receipt   ┌─────────────────┐                     │
//! │   │   Idle   │────────────────►│ ReceiptLoaded / │◄──┐ stage_line      │
//! │   │ (None)   │                 │    Staging      │───┘ unstage_line    │
//! │   └──────────┘◄────────────────└─────────────────┘                     │
//! │        ▲         cancel                 │                               │
//! │        │                                │ finalize                      │
//! │        │                                ▼                               │
//! │        └──────────────────────── products + returns + sales written    │
//! │                                                                         │
//! │  A locked or missing sale never opens a session. A persistence         │
//! │  failure during finalize keeps the session so it can be retried.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::Serialize;
use till_core::{CoreError, Money, ReturnRecord, ReturnSession, StagedLine};
use till_store::{Store, StoreError, StoreResult};
use tracing::{debug, info};

/// Staged lines with their refunds, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnSummary {
    pub sale_id: u64,
    pub sale_total: Money,
    pub lines: Vec<StagedRefund>,
    pub refund_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedRefund {
    #[serde(flatten)]
    pub line: StagedLine,
    pub refund: Money,
}

/// The return in progress, if any.
#[derive(Debug, Clone)]
pub struct ReturnsDesk {
    store: Store,
    session: Option<ReturnSession>,
}

impl ReturnsDesk {
    pub fn new(store: Store) -> Self {
        ReturnsDesk {
            store,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&ReturnSession> {
        self.session.as_ref()
    }

    /// Opens a return against `sale_id`, replacing any session in progress.
    ///
    /// ## Errors
    /// * `Core(SaleNotFound)` - no such sale
    /// * `Core(AlreadyLocked)` - the sale was already returned
    ///
    /// On error the desk is left idle.
    pub fn load_receipt(&mut self, sale_id: u64) -> StoreResult<&ReturnSession> {
        debug!(sale_id, "load_receipt");
        self.session = None;
        let sale = self.store.sales().find_by_id(sale_id)?;
        let session = self.session.insert(ReturnSession::open(sale)?);
        Ok(&*session)
    }

    pub fn stage_line(&mut self, query: &str, quantity: i64) -> StoreResult<StagedLine> {
        debug!(query = %query, quantity, "stage_line");
        Ok(self.active()?.stage_line(query, quantity)?)
    }

    /// Returns the remaining staged line, or `None` if it was removed.
    pub fn unstage_line(&mut self, query: &str, quantity: i64) -> StoreResult<Option<StagedLine>> {
        debug!(query = %query, quantity, "unstage_line");
        Ok(self.active()?.unstage_line(query, quantity)?)
    }

    pub fn summary(&self) -> StoreResult<ReturnSummary> {
        let session = self.session.as_ref().ok_or(CoreError::NoReceiptLoaded)?;
        Ok(ReturnSummary {
            sale_id: session.sale_id(),
            sale_total: session.sale().total,
            lines: session
                .staged()
                .iter()
                .map(|line| StagedRefund {
                    line: line.clone(),
                    refund: line.refund(),
                })
                .collect(),
            refund_total: session.refund_total(),
        })
    }

    /// Restocks, records the return and locks the sale.
    ///
    /// The desk returns to idle on success, and also when the sale turned
    /// out to be locked or gone since it was loaded. Any other failure keeps
    /// the session for a retry.
    pub fn finalize(&mut self, timestamp: NaiveDateTime) -> StoreResult<ReturnRecord> {
        let plan = self.active()?.prepare_refund()?;
        match self.store.returns().finalize(&plan, timestamp) {
            Ok(record) => {
                self.session = None;
                Ok(record)
            }
            Err(err @ StoreError::Core(CoreError::AlreadyLocked(_)))
            | Err(err @ StoreError::Core(CoreError::SaleNotFound(_))) => {
                self.session = None;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Discards the session. Nothing is written.
    pub fn cancel(&mut self) -> Option<u64> {
        let sale_id = self.session.take().map(|s| s.sale_id());
        if let Some(id) = sale_id {
            info!(sale_id = id, "Return cancelled");
        }
        sale_id
    }

    fn active(&mut self) -> StoreResult<&mut ReturnSession> {
        Ok(self.session.as_mut().ok_or(CoreError::NoReceiptLoaded)?)
    }
}
