//! # Return Commands
//!
//! ```text
//! return-load 12 ──► return-stage hammer 1 ──► return-summary ──► return-finalize
//!       │                    │                                          │
//!   NOT_FOUND          NOT_FOUND                                  EMPTY_RETURN
//!   ALREADY_LOCKED     EXCEEDS_PURCHASED                          ALREADY_LOCKED
//!                                                                 PERSISTENCE_ERROR
//! ```
//!
//! Every command but `return-load` needs a receipt loaded first
//! (`NO_RECEIPT` otherwise).

use chrono::NaiveDateTime;
use serde::Serialize;
use till_core::{ReturnLine, StagedLine};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::{ReturnSummary, ReturnsDesk};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub return_id: u64,
    pub sale_id: u64,
    pub lines: Vec<ReturnLine>,
    pub refund_cents: i64,
    pub refund_display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnstageResponse {
    /// What is still staged for the item, if anything.
    pub remaining: Option<StagedLine>,
    pub summary: ReturnSummary,
}

/// Opens a return against a completed sale.
pub fn load_receipt(desk: &mut ReturnsDesk, sale_id: u64) -> Result<ReturnSummary, ApiError> {
    desk.load_receipt(sale_id)?;
    Ok(desk.summary()?)
}

pub fn stage_return_line(
    desk: &mut ReturnsDesk,
    query: &str,
    quantity: i64,
) -> Result<ReturnSummary, ApiError> {
    desk.stage_line(query, quantity)?;
    Ok(desk.summary()?)
}

pub fn unstage_return_line(
    desk: &mut ReturnsDesk,
    query: &str,
    quantity: i64,
) -> Result<UnstageResponse, ApiError> {
    let remaining = desk.unstage_line(query, quantity)?;
    Ok(UnstageResponse {
        remaining,
        summary: desk.summary()?,
    })
}

pub fn return_summary(desk: &ReturnsDesk) -> Result<ReturnSummary, ApiError> {
    Ok(desk.summary()?)
}

/// Restocks the staged items, records the refund and locks the sale.
pub fn finalize_return(
    desk: &mut ReturnsDesk,
    config: &AppConfig,
    now: NaiveDateTime,
) -> Result<FinalizeResponse, ApiError> {
    debug!("finalize_return command");
    let record = desk.finalize(now)?;
    Ok(FinalizeResponse {
        return_id: record.id,
        sale_id: record.source_sale_id,
        refund_cents: record.refund_total.cents(),
        refund_display: config.format_currency(record.refund_total.cents()),
        lines: record.lines,
    })
}

/// Drops the return in progress. Returns the sale it was against.
pub fn cancel_return(desk: &mut ReturnsDesk) -> Option<u64> {
    desk.cancel()
}
