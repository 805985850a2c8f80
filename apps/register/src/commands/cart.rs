//! # Cart Commands
//!
//! Cart lines of the checkout in progress.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Tenders  │────►│ Recorded │       │
//! │  │  Cart    │     │          │     │          │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart       complete_sale                      │
//! │                   update_item       (sale.rs)                          │
//! │                   remove_item                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────► (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices are frozen when a line is added. Confirmed tenders stay when lines
//! change; if the cart shrinks below what was paid the summary shows
//! `changeDue`.

use serde::Deserialize;
use tracing::{debug, warn};

use super::checkout::{respond, CheckoutResponse};
use crate::error::ApiError;
use crate::state::{CheckoutState, ConfigState, DbState};
use mostrador_core::CoreError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartArgs {
    pub product_id: String,
    /// Defaults to 1.
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemArgs {
    pub product_id: String,
    /// 0 removes the line.
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdArgs {
    pub product_id: String,
}

pub fn get_cart(checkout: &CheckoutState, config: &ConfigState) -> CheckoutResponse {
    debug!("get_cart command");
    respond(checkout, config)
}

/// Adds a product, or more of it if already in the cart.
///
/// Stock is checked here for early feedback and again when the sale is
/// recorded.
pub async fn add_to_cart(
    db: &DbState,
    checkout: &CheckoutState,
    config: &ConfigState,
    args: AddToCartArgs,
) -> Result<CheckoutResponse, ApiError> {
    let quantity = args.quantity.unwrap_or(1);
    debug!(product_id = %args.product_id, quantity = %quantity, "add_to_cart command");

    let product = db
        .inner()
        .products()
        .get_by_id(&args.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &args.product_id))?;

    if !product.is_active {
        return Err(ApiError::validation("Product is not available for sale"));
    }

    let in_cart = checkout.with_checkout(|c| {
        c.cart
            .lines
            .iter()
            .find(|l| l.product_id == product.id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    });
    if !product.can_sell(in_cart + quantity) {
        warn!(sku = %product.sku, stock = ?product.current_stock, requested = in_cart + quantity, "Not enough stock");
        return Err(CoreError::InsufficientStock {
            sku: product.sku.clone(),
            available: product.current_stock.unwrap_or(0),
            requested: in_cart + quantity,
        }
        .into());
    }

    checkout.with_checkout_mut(|c| c.cart.add_product(&product, quantity))?;
    Ok(respond(checkout, config))
}

pub fn update_cart_item(
    checkout: &CheckoutState,
    config: &ConfigState,
    args: UpdateCartItemArgs,
) -> Result<CheckoutResponse, ApiError> {
    debug!(product_id = %args.product_id, quantity = %args.quantity, "update_cart_item command");
    checkout.with_checkout_mut(|c| {
        c.cart.update_quantity(&args.product_id, args.quantity)?;
        c.clear_tenders_if_cart_empty();
        Ok::<_, CoreError>(())
    })?;
    Ok(respond(checkout, config))
}

pub fn remove_from_cart(
    checkout: &CheckoutState,
    config: &ConfigState,
    args: ProductIdArgs,
) -> Result<CheckoutResponse, ApiError> {
    debug!(product_id = %args.product_id, "remove_from_cart command");
    checkout.with_checkout_mut(|c| {
        c.cart.remove_line(&args.product_id)?;
        c.clear_tenders_if_cart_empty();
        Ok::<_, CoreError>(())
    })?;
    Ok(respond(checkout, config))
}

/// Abandons the checkout: lines, customer, discounts and tenders.
pub fn clear_cart(checkout: &CheckoutState, config: &ConfigState) -> CheckoutResponse {
    debug!("clear_cart command");
    checkout.discard();
    respond(checkout, config)
}
