//! # Product Commands
//!
//! Catalog search and lookup for the sale screen.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types "7790" or scans a barcode                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_products { query: "7790" }                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_search_query (trim, length)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE on sku / name / barcode, exact sku or barcode ranked first        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<ProductDto>                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::page_size;
use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use mostrador_core::validation::validate_search_query;
use mostrador_core::Product;

/// Product as the frontend sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub track_inventory: bool,
    /// Used by the frontend to show "Back-order" vs "Out of Stock".
    pub allow_negative_stock: bool,
    pub current_stock: Option<i64>,
    pub is_active: bool,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            sku: p.sku,
            barcode: p.barcode,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            track_inventory: p.track_inventory,
            allow_negative_stock: p.allow_negative_stock,
            current_stock: p.current_stock,
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    pub query: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkuArgs {
    pub sku: String,
}

/// Searches active products by SKU, name or barcode.
///
/// An empty query lists active products by name.
pub async fn search_products(
    db: &DbState,
    config: &ConfigState,
    args: SearchArgs,
) -> Result<Vec<ProductDto>, ApiError> {
    let start = Instant::now();
    let query = validate_search_query(&args.query).map_err(|e| ApiError::validation(e.to_string()))?;
    let limit = page_size(args.limit);

    debug!(query = %query, limit = %limit, "search_products command");

    let products = if query.is_empty() {
        db.inner().products().list_active(config.tenant_id(), limit).await?
    } else {
        db.inner().products().search(config.tenant_id(), &query, limit).await?
    };
    let dtos: Vec<ProductDto> = products.into_iter().map(ProductDto::from).collect();

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = dtos.len(),
        query = %query,
        "search_products complete"
    );

    Ok(dtos)
}

pub async fn get_product_by_id(db: &DbState, args: IdArgs) -> Result<ProductDto, ApiError> {
    debug!(id = %args.id, "get_product_by_id command");
    let product = db
        .inner()
        .products()
        .get_by_id(&args.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &args.id))?;
    Ok(ProductDto::from(product))
}

/// Manual SKU entry by the cashier.
pub async fn get_product_by_sku(
    db: &DbState,
    config: &ConfigState,
    args: SkuArgs,
) -> Result<ProductDto, ApiError> {
    debug!(sku = %args.sku, "get_product_by_sku command");
    let product = db
        .inner()
        .products()
        .get_by_sku(config.tenant_id(), args.sku.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &args.sku))?;
    Ok(ProductDto::from(product))
}
