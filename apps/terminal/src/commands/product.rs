//! # Product Commands
//!
//! Read-only views of the Inventory Store.

use serde::Serialize;
use till_core::types::SHIPMENT_DATE_FORMAT;
use till_core::Product;
use till_store::Store;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::ApiError;

/// Product as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    /// Price formatted with the configured currency symbol.
    pub price_display: String,
    pub stock: i64,
    /// `YYYY-MM-DD`, or `"none"`.
    pub next_shipment: String,
    pub next_shipment_qty: i64,
}

impl ProductDto {
    fn new(product: Product, config: &AppConfig) -> Self {
        ProductDto {
            price_display: config.format_currency(product.price.cents()),
            price_cents: product.price.cents(),
            next_shipment: product
                .next_shipment
                .map(|d| d.format(SHIPMENT_DATE_FORMAT).to_string())
                .unwrap_or_else(|| "none".to_string()),
            next_shipment_qty: product.next_shipment_qty,
            stock: product.stock,
            sku: product.id,
            name: product.name,
            category: product.category,
        }
    }
}

/// Lists every product in file order.
pub fn list_inventory(store: &Store, config: &AppConfig) -> Result<Vec<ProductDto>, ApiError> {
    debug!("list_inventory command");
    let products = store.products().list()?;
    Ok(products
        .into_iter()
        .map(|p| ProductDto::new(p, config))
        .collect())
}

pub fn get_product(store: &Store, config: &AppConfig, sku: &str) -> Result<ProductDto, ApiError> {
    debug!(sku = %sku, "get_product command");
    store
        .products()
        .get(sku)?
        .map(|p| ProductDto::new(p, config))
        .ok_or_else(|| ApiError::not_found("Product", sku))
}
