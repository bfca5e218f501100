//! # Sale Commands

use chrono::NaiveDateTime;
use serde::Serialize;
use till_core::types::TIMESTAMP_FORMAT;
use till_core::{CartEvent, Sale};
use till_store::Store;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::Register;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub sale_id: u64,
    pub total_cents: i64,
    pub total_display: String,
    pub line_count: usize,
    pub event: CartEvent,
}

/// A completed sale, laid out for the receipt printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub sale_id: u64,
    pub store_name: String,
    pub timestamp: String,
    pub items: Vec<ReceiptItem>,
    pub total_cents: i64,
    pub total_display: String,
    /// True once a return was finalized against this sale.
    pub returned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_percent: u8,
    pub line_total_cents: i64,
}

impl ReceiptResponse {
    fn new(sale: Sale, config: &AppConfig) -> Self {
        ReceiptResponse {
            sale_id: sale.id,
            store_name: config.store.name.clone(),
            timestamp: sale.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            items: sale
                .lines
                .into_iter()
                .map(|l| ReceiptItem {
                    sku: l.sku,
                    name: l.name,
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price.cents(),
                    discount_percent: l.discount_percent,
                    line_total_cents: l.total.cents(),
                })
                .collect(),
            total_cents: sale.total.cents(),
            total_display: config.format_currency(sale.total.cents()),
            returned: sale.locked,
        }
    }
}

/// Records the cart as a sale and clears it.
///
/// ## Flow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  commit                                                                 │
/// │     │                                                                   │
/// │     ▼                                                                   │
/// │  Cart empty? ──────────────────────────────► EMPTY_CART                │
/// │     │                                                                   │
/// │     ▼                                                                   │
/// │  products.json (stock down) + sales.json (append)                      │
/// │     │                    │                                              │
/// │     │                    └── write failed ──► PERSISTENCE_ERROR        │
/// │     ▼                                         (cart untouched)          │
/// │  Cart cleared, sale id returned                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn commit_sale(
    register: &mut Register,
    config: &AppConfig,
    now: NaiveDateTime,
) -> Result<CommitResponse, ApiError> {
    debug!(lines = register.cart().lines().len(), "commit_sale command");
    let (sale, event) = register.commit(now)?;

    info!(sale_id = sale.id, total = %sale.total, "Sale complete");
    Ok(CommitResponse {
        sale_id: sale.id,
        total_cents: sale.total.cents(),
        total_display: config.format_currency(sale.total.cents()),
        line_count: sale.lines.len(),
        event,
    })
}

/// Looks up a completed sale by id.
pub fn get_receipt(store: &Store, config: &AppConfig, sale_id: u64) -> Result<ReceiptResponse, ApiError> {
    debug!(sale_id, "get_receipt command");
    let sale = store.sales().find_by_id(sale_id)?;
    Ok(ReceiptResponse::new(sale, config))
}
