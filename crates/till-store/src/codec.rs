//! # Record Codecs
//!
//! Maps the JSON store files to validated domain values and back.
//!
//! ## Load Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bytes ──► serde_json::Value ──► per-record DTO ──► validated entity   │
//! │              │                      │                    │              │
//! │              ▼                      ▼                    ▼              │
//! │        StoreError::Json     StoreError::MalformedRecord  Product /     │
//! │        (not JSON, wrong     (missing field, bad date,    Sale /        │
//! │         top-level shape)     negative stock, ...)        ReturnRecord  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are decoded one at a time so a failure names the record id.
//! Older files used `next_ship`, `next_ship_qty`, `"no shipment"` and
//! `total_refund`; those are accepted on read. Writes always use the
//! camelCase names.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use till_core::validation::{
    validate_discount_percent, validate_price_cents, validate_product_name, validate_quantity,
    validate_sku, validate_stock, ValidationResult,
};
use till_core::{
    Inventory, Money, Product, ReturnLine, ReturnRecord, Sale, SaleLine, ValidationError,
    SHIPMENT_DATE_FORMAT, TIMESTAMP_FORMAT,
};

use crate::error::{StoreError, StoreResult};

/// Written for a product with no shipment scheduled.
const NO_SHIPMENT: &str = "none";

// =============================================================================
// Record DTOs
// =============================================================================

/// A product as stored, keyed by id in the enclosing object.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    category: String,
    name: String,
    price: f64,
    stock: i64,
    #[serde(alias = "next_ship", default)]
    next_shipment: Option<String>,
    #[serde(alias = "next_ship_qty", default)]
    next_shipment_qty: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleRecord {
    id: u64,
    date: String,
    items: Vec<SaleLineRecord>,
    total: f64,
    #[serde(default)]
    locked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleLineRecord {
    #[serde(deserialize_with = "string_or_number")]
    sku: String,
    name: String,
    quantity: i64,
    /// Unit price.
    price: f64,
    #[serde(default)]
    discount_percent: u8,
    /// Missing in older files; recomputed from price and quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnRecordDto {
    id: u64,
    date: String,
    /// Older files did not record it; 0 stands for unknown.
    #[serde(default)]
    source_sale_id: u64,
    items: Vec<ReturnLineRecord>,
    #[serde(alias = "total_refund")]
    refund_total: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnLineRecord {
    #[serde(deserialize_with = "string_or_number")]
    sku: String,
    name: String,
    quantity: i64,
    charge: f64,
}

/// SKUs were sometimes written as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

// =============================================================================
// Field Conversions
// =============================================================================

fn money(field: &str, amount: f64) -> ValidationResult<Money> {
    let money = Money::from_decimal(amount).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("{} is not a representable amount", amount),
    })?;
    if money.cents() < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(money)
}

/// A unit amount: non-negative and no larger than `MAX_PRICE_CENTS`.
fn unit_amount(field: &str, amount: f64) -> ValidationResult<Money> {
    let money = money(field, amount)?;
    validate_price_cents(money.cents()).map_err(|e| match e {
        ValidationError::OutOfRange { min, max, .. } => ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        },
        other => other,
    })?;
    Ok(money)
}

fn timestamp(raw: &str) -> ValidationResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: format!("'{}': {}", raw, e),
        }
    })
}

fn next_shipment(raw: Option<&str>) -> ValidationResult<Option<NaiveDate>> {
    let raw = match raw.map(str::trim) {
        None => return Ok(None),
        Some(s) if s.is_empty() => return Ok(None),
        Some(s) if s.eq_ignore_ascii_case(NO_SHIPMENT) || s.eq_ignore_ascii_case("no shipment") => {
            return Ok(None)
        }
        Some(s) => s,
    };
    NaiveDate::parse_from_str(raw, SHIPMENT_DATE_FORMAT)
        .map(Some)
        .map_err(|e| ValidationError::InvalidFormat {
            field: "nextShipment".to_string(),
            reason: format!("'{}': {}", raw, e),
        })
}

fn line_quantity(quantity: i64) -> ValidationResult<i64> {
    validate_quantity(quantity)?;
    Ok(quantity)
}

fn record<T: DeserializeOwned>(value: Value) -> ValidationResult<T> {
    serde_json::from_value(value).map_err(|e| ValidationError::InvalidFormat {
        field: "record".to_string(),
        reason: e.to_string(),
    })
}

/// Best label for a record in an error: its `id` field, else its position.
fn record_label(value: &Value, index: usize) -> String {
    match value.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => format!("#{}", index),
    }
}

fn parse_root<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::json(path, e))
}

fn pretty<T: Serialize>(path: &Path, value: &T) -> StoreResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    bytes.push(b'\n');
    Ok(bytes)
}

// =============================================================================
// Inventory Store
// =============================================================================

fn decode_product(id: &str, value: Value) -> ValidationResult<Product> {
    validate_sku(id)?;
    let rec: ProductRecord = record(value)?;
    validate_product_name(&rec.name)?;
    validate_stock(rec.stock)?;
    if rec.next_shipment_qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "nextShipmentQty".to_string(),
        });
    }

    Ok(Product {
        id: id.to_string(),
        category: rec.category,
        name: rec.name,
        price: unit_amount("price", rec.price)?,
        stock: rec.stock,
        next_shipment: next_shipment(rec.next_shipment.as_deref())?,
        next_shipment_qty: rec.next_shipment_qty,
    })
}

/// Decodes `products.json`: an object of `id → product`.
pub fn decode_inventory(path: &Path, bytes: &[u8]) -> StoreResult<Inventory> {
    let root: Map<String, Value> = parse_root(path, bytes)?;
    let mut products = Vec::with_capacity(root.len());
    for (id, value) in root {
        let product = decode_product(&id, value).map_err(|e| StoreError::malformed(path, &id, e))?;
        products.push(product);
    }
    Inventory::from_products(products).map_err(|e| StoreError::malformed(path, "catalog", e))
}

pub fn encode_inventory(path: &Path, inventory: &Inventory) -> StoreResult<Vec<u8>> {
    let mut root = Map::with_capacity(inventory.len());
    for product in inventory.products() {
        let rec = ProductRecord {
            category: product.category.clone(),
            name: product.name.clone(),
            price: product.price.to_decimal(),
            stock: product.stock,
            next_shipment: Some(
                product
                    .next_shipment
                    .map(|d| d.format(SHIPMENT_DATE_FORMAT).to_string())
                    .unwrap_or_else(|| NO_SHIPMENT.to_string()),
            ),
            next_shipment_qty: product.next_shipment_qty,
        };
        let value = serde_json::to_value(rec).map_err(|e| StoreError::json(path, e))?;
        root.insert(product.id.clone(), value);
    }
    pretty(path, &root)
}

// =============================================================================
// Sales Ledger
// =============================================================================

fn decode_sale(value: Value) -> ValidationResult<Sale> {
    let rec: SaleRecord = record(value)?;

    let mut lines = Vec::with_capacity(rec.items.len());
    for item in rec.items {
        let quantity = line_quantity(item.quantity)?;
        validate_discount_percent(item.discount_percent)?;
        let unit_price = unit_amount("price", item.price)?;
        let total = match item.total {
            Some(total) => money("total", total)?,
            None => till_core::cart::line_total(unit_price, quantity, item.discount_percent),
        };
        lines.push(SaleLine {
            sku: item.sku,
            name: item.name,
            quantity,
            unit_price,
            discount_percent: item.discount_percent,
            total,
        });
    }

    Ok(Sale {
        id: rec.id,
        timestamp: timestamp(&rec.date)?,
        lines,
        total: money("total", rec.total)?,
        locked: rec.locked,
    })
}

/// Decodes `sales.json`: an array of sales in commit order.
pub fn decode_sales(path: &Path, bytes: &[u8]) -> StoreResult<Vec<Sale>> {
    let root: Vec<Value> = parse_root(path, bytes)?;
    root.into_iter()
        .enumerate()
        .map(|(i, value)| {
            let label = record_label(&value, i);
            decode_sale(value).map_err(|e| StoreError::malformed(path, label, e))
        })
        .collect()
}

pub fn encode_sales(path: &Path, sales: &[Sale]) -> StoreResult<Vec<u8>> {
    let records: Vec<SaleRecord> = sales
        .iter()
        .map(|sale| SaleRecord {
            id: sale.id,
            date: sale.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            items: sale
                .lines
                .iter()
                .map(|line| SaleLineRecord {
                    sku: line.sku.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    price: line.unit_price.to_decimal(),
                    discount_percent: line.discount_percent,
                    total: Some(line.total.to_decimal()),
                })
                .collect(),
            total: sale.total.to_decimal(),
            locked: sale.locked,
        })
        .collect();
    pretty(path, &records)
}

// =============================================================================
// Returns Ledger
// =============================================================================

fn decode_return(value: Value) -> ValidationResult<ReturnRecord> {
    let rec: ReturnRecordDto = record(value)?;

    let mut lines = Vec::with_capacity(rec.items.len());
    for item in rec.items {
        lines.push(ReturnLine {
            sku: item.sku,
            name: item.name,
            quantity: line_quantity(item.quantity)?,
            charge: unit_amount("charge", item.charge)?,
        });
    }

    Ok(ReturnRecord {
        id: rec.id,
        timestamp: timestamp(&rec.date)?,
        source_sale_id: rec.source_sale_id,
        lines,
        refund_total: money("refundTotal", rec.refund_total)?,
    })
}

/// Decodes `returns.json`: an array of finalized returns.
pub fn decode_returns(path: &Path, bytes: &[u8]) -> StoreResult<Vec<ReturnRecord>> {
    let root: Vec<Value> = parse_root(path, bytes)?;
    root.into_iter()
        .enumerate()
        .map(|(i, value)| {
            let label = record_label(&value, i);
            decode_return(value).map_err(|e| StoreError::malformed(path, label, e))
        })
        .collect()
}

pub fn encode_returns(path: &Path, returns: &[ReturnRecord]) -> StoreResult<Vec<u8>> {
    let records: Vec<ReturnRecordDto> = returns
        .iter()
        .map(|ret| ReturnRecordDto {
            id: ret.id,
            date: ret.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            source_sale_id: ret.source_sale_id,
            items: ret
                .lines
                .iter()
                .map(|line| ReturnLineRecord {
                    sku: line.sku.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    charge: line.charge.to_decimal(),
                })
                .collect(),
            refund_total: ret.refund_total.to_decimal(),
        })
        .collect();
    pretty(path, &records)
}
