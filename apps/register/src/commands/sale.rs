//! # Sale Commands
//!
//! Completing the checkout, and reading or voiding recorded sales.
//!
//! ## complete_sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. snapshot checkout + reserved sale id (lock released)               │
//! │  2. receipt number: YYYYMMDD-<device>-<sequence of the day>            │
//! │  3. SaleRecord::build ── empty cart, balance, points, credit gates     │
//! │  4. record_sale ──────── one transaction, live re-checks, outbox row   │
//! │  5. finish(sale id) ──── fresh checkout, new sale id                   │
//! │  6. receipt                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Any failure before step 5 leaves the checkout untouched so the cashier
//! can fix it and retry.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::product::IdArgs;
use super::page_size;
use crate::error::ApiError;
use crate::state::{CheckoutState, ConfigState, DbState};
use mostrador_core::record::{describe, receipt_number, SaleRecord};
use mostrador_core::validation::validate_uuid;
use mostrador_core::{CoreError, Sale, SaleItem, SalePayment};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSaleArgs {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSalesArgs {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub sale_id: String,
    pub receipt_number: String,
    pub store_name: String,
    pub store_address: Vec<String>,
    pub timestamp: String,
    pub customer_name: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub surcharge_cents: i64,
    pub total_cents: i64,
    /// Total formatted in the store currency.
    pub total_display: String,
    pub installments: u32,
    pub installment_amount_cents: i64,
    pub payments: Vec<ReceiptPayment>,
    pub change_cents: i64,
    pub points_redeemed: i64,
    pub points_earned: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPayment {
    pub method: String,
    pub installments: u32,
    pub surcharge_cents: i64,
    pub amount_cents: i64,
}

/// A recorded sale with its lines and payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payments: Vec<SalePayment>,
}

/// Records the checkout as a sale and starts a new checkout.
pub async fn complete_sale(
    db: &DbState,
    checkout: &CheckoutState,
    config: &ConfigState,
    args: CompleteSaleArgs,
) -> Result<ReceiptResponse, ApiError> {
    let (current, sale_id) = checkout.snapshot();
    let settings = config.pricing();
    let ctx = config.context();
    debug!(sale_id = %sale_id, lines = current.cart.item_count(), "complete_sale command");

    let now = Utc::now();
    let sequence = db
        .inner()
        .sales()
        .next_receipt_sequence(&ctx.device_id, now)
        .await?;
    let receipt = receipt_number(now, &ctx.device_id, sequence);

    let record = SaleRecord::build(&ctx, &current, &settings, &sale_id, &receipt, now)
        .and_then(|r| r.with_notes(args.notes))
        .map_err(|e| {
            warn!(sale_id = %sale_id, error = %e, "Checkout cannot complete");
            ApiError::from(e)
        })?;

    if let Err(e) = db.inner().sales().record_sale(&record).await {
        warn!(sale_id = %sale_id, error = %e, "Sale not recorded");
        return Err(e.into());
    }

    if !checkout.finish(&sale_id) {
        warn!(sale_id = %sale_id, "Checkout changed while the sale was being recorded");
    }

    let summary = current.summary(&settings);
    info!(
        sale_id = %sale_id,
        receipt_number = %receipt,
        customer = ?record.sale.customer_id,
        "Sale completed: {}",
        describe(&summary)
    );

    Ok(ReceiptResponse {
        sale_id: record.sale.id.clone(),
        receipt_number: record.sale.receipt_number.clone(),
        store_name: config.store().store_name.clone(),
        store_address: config.store().store_address.clone(),
        timestamp: record.sale.created_at.to_rfc3339(),
        customer_name: current.customer().map(|c| c.name.clone()),
        items: record
            .items
            .iter()
            .map(|i| ReceiptItem {
                name: i.name_snapshot.clone(),
                quantity: i.quantity,
                unit_price_cents: i.unit_price_cents,
                line_total_cents: i.line_total_cents,
            })
            .collect(),
        subtotal_cents: record.sale.subtotal_cents,
        discount_cents: record.sale.discount_cents,
        tax_cents: record.sale.tax_cents,
        surcharge_cents: record.sale.surcharge_cents,
        total_cents: record.sale.total_cents,
        total_display: config.format_currency(record.sale.total_cents),
        installments: record.sale.installments,
        installment_amount_cents: record.sale.installment_amount_cents,
        payments: record
            .payments
            .iter()
            .map(|p| ReceiptPayment {
                method: p.method.to_string(),
                installments: p.installments,
                surcharge_cents: p.card_surcharge_cents,
                amount_cents: p.amount_cents,
            })
            .collect(),
        change_cents: summary.change_due.cents(),
        points_redeemed: record.sale.points_redeemed,
        points_earned: record.sale.points_earned,
    })
}

pub async fn get_sale(db: &DbState, args: IdArgs) -> Result<SaleDetail, ApiError> {
    debug!(id = %args.id, "get_sale command");
    validate_uuid(&args.id).map_err(CoreError::from)?;
    let sales = db.inner().sales();
    let sale = sales
        .get_by_id(&args.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &args.id))?;
    let items = sales.get_items(&sale.id).await?;
    let payments = sales.get_payments(&sale.id).await?;

    Ok(SaleDetail {
        sale,
        items,
        payments,
    })
}

pub async fn list_recent_sales(
    db: &DbState,
    config: &ConfigState,
    args: ListSalesArgs,
) -> Result<Vec<Sale>, ApiError> {
    let limit = page_size(args.limit);
    debug!(limit = %limit, "list_recent_sales command");
    Ok(db.inner().sales().list_recent(config.tenant_id(), limit).await?)
}

/// Voids a completed sale, reversing stock, points and account credit.
pub async fn void_sale(db: &DbState, args: IdArgs) -> Result<Sale, ApiError> {
    debug!(id = %args.id, "void_sale command");
    validate_uuid(&args.id).map_err(CoreError::from)?;
    let sale = db.inner().sales().void_sale(&args.id).await?;
    info!(sale_id = %sale.id, receipt_number = %sale.receipt_number, "Sale voided by cashier");
    Ok(sale)
}
