//! # Checkout Commands
//!
//! Discounts, customer, loyalty points and tenders for the checkout in
//! progress. Every command answers with the full [`CheckoutResponse`], so the
//! payment screen re-renders from one fresh calculation.
//!
//! ## Payment Screen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Subtotal                     $ 100,00                                 │
//! │  Descuento (10%)              -$ 10,00     ◄── set_discount            │
//! │  Puntos (0)                    $ 0,00      ◄── set_points              │
//! │  IVA 21%                      $ 18,90                                  │
//! │  ─────────────────────────────────────                                 │
//! │  Efectivo                     $ 50,00      ◄── add_tender              │
//! │  Tarjeta 3 cuotas (+15%)      $ 67,74      ◄── set_pending_tender +    │
//! │                                                pay_remaining           │
//! │  Restante                     $ 0,00                                   │
//! │                                   [ Cobrar ] ◄── complete_sale (sale)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{CheckoutState, ConfigState, DbState};
use mostrador_core::cart::CartLine;
use mostrador_core::checkout::{Checkout, CheckoutSummary, PricingSettings};
use mostrador_core::tender::{PendingTender, TenderEntry};
use mostrador_core::{CoreError, Customer, Money, Percentage, TenderMethod};

use super::customer::CustomerDto;

/// Checkout as the frontend sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Sale id reserved for this checkout.
    pub sale_id: String,
    pub lines: Vec<CartLine>,
    pub customer: Option<CustomerDto>,
    pub manual_discount_bps: u32,
    pub points_redeemed: i64,
    pub pending: PendingTender,
    pub tenders: Vec<TenderEntry>,
    pub summary: CheckoutSummary,
}

impl CheckoutResponse {
    pub fn build(checkout: &Checkout, sale_id: String, settings: &PricingSettings) -> Self {
        CheckoutResponse {
            sale_id,
            lines: checkout.cart.lines.clone(),
            customer: checkout
                .customer()
                .cloned()
                .map(|c| CustomerDto::new(c, &settings.loyalty)),
            manual_discount_bps: checkout.manual_discount().bps(),
            points_redeemed: checkout.points_redeemed(),
            pending: checkout.pending(),
            tenders: checkout.tenders().entries().to_vec(),
            summary: checkout.summary(settings),
        }
    }
}

/// Current checkout, recalculated with the current pricing settings.
pub(crate) fn respond(checkout: &CheckoutState, config: &ConfigState) -> CheckoutResponse {
    let settings = config.pricing();
    let (current, sale_id) = checkout.snapshot();
    CheckoutResponse::build(&current, sale_id, &settings)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountArgs {
    /// Manual discount in basis points, 0..=10000.
    pub rate_bps: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachCustomerArgs {
    pub customer_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointsArgs {
    pub points: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingTenderArgs {
    pub method: TenderMethod,
    pub installments: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderArgs {
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenderIdArgs {
    pub id: u32,
}

pub fn get_checkout(checkout: &CheckoutState, config: &ConfigState) -> CheckoutResponse {
    debug!("get_checkout command");
    respond(checkout, config)
}

pub fn set_discount(
    checkout: &CheckoutState,
    config: &ConfigState,
    args: DiscountArgs,
) -> Result<CheckoutResponse, ApiError> {
    debug!(rate_bps = args.rate_bps, "set_discount command");
    checkout.with_checkout_mut(|c| c.set_manual_discount(Percentage::from_bps(args.rate_bps)))?;
    Ok(respond(checkout, config))
}

/// Attaches a customer loaded fresh from the database, so the points
/// balance and tier are current.
pub async fn attach_customer(
    db: &DbState,
    checkout: &CheckoutState,
    config: &ConfigState,
    args: AttachCustomerArgs,
) -> Result<CheckoutResponse, ApiError> {
    debug!(customer_id = %args.customer_id, "attach_customer command");

    let customer: Customer = db
        .inner()
        .customers()
        .get_by_id(&args.customer_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| ApiError::not_found("Customer", &args.customer_id))?;

    info!(customer_id = %customer.id, points = customer.loyalty_points, "Customer attached");
    checkout.with_checkout_mut(|c| c.attach_customer(customer));
    Ok(respond(checkout, config))
}

/// Detaches the customer; redeemed points go back to zero.
pub fn detach_customer(checkout: &CheckoutState, config: &ConfigState) -> CheckoutResponse {
    debug!("detach_customer command");
    checkout.with_checkout_mut(|c| c.detach_customer());
    respond(checkout, config)
}

/// Sets the points to redeem.
///
/// Only negative input is an error. Too many points, or points without a
/// customer, are kept and show up as `summary.loyaltyWarning`, which blocks
/// completion until fixed.
pub fn set_points(
    checkout: &CheckoutState,
    config: &ConfigState,
    args: PointsArgs,
) -> Result<CheckoutResponse, ApiError> {
    debug!(points = args.points, "set_points command");

    match checkout.with_checkout_mut(|c| c.set_points_redeemed(args.points)) {
        Ok(()) => {}
        Err(e @ (CoreError::PointsExceedBalance { .. } | CoreError::CustomerRequired { .. })) => {
            warn!(points = args.points, error = %e, "Points redemption not valid yet");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(respond(checkout, config))
}

pub fn set_pending_tender(
    checkout: &CheckoutState,
    config: &ConfigState,
    args: PendingTenderArgs,
) -> Result<CheckoutResponse, ApiError> {
    let installments = args.installments.unwrap_or(1);
    debug!(method = %args.method, installments, "set_pending_tender command");
    checkout.with_checkout_mut(|c| c.set_pending_tender(args.method, installments))?;
    Ok(respond(checkout, config))
}

/// Confirms a tender of `amountCents` (pre-surcharge) with the pending method.
pub fn add_tender(
    checkout: &CheckoutState,
    config: &ConfigState,
    args: TenderArgs,
) -> Result<CheckoutResponse, ApiError> {
    debug!(amount_cents = args.amount_cents, "add_tender command");
    let settings = config.pricing();
    let entry = checkout
        .with_checkout_mut(|c| c.add_tender(Money::from_cents(args.amount_cents), &settings))?;
    log_tender(&entry);
    Ok(respond(checkout, config))
}

/// Confirms a tender for everything still owed.
pub fn pay_remaining(
    checkout: &CheckoutState,
    config: &ConfigState,
) -> Result<CheckoutResponse, ApiError> {
    debug!("pay_remaining command");
    let settings = config.pricing();
    let entry = checkout.with_checkout_mut(|c| c.pay_remaining(&settings))?;
    log_tender(&entry);
    Ok(respond(checkout, config))
}

pub fn remove_tender(
    checkout: &CheckoutState,
    config: &ConfigState,
    args: TenderIdArgs,
) -> Result<CheckoutResponse, ApiError> {
    debug!(id = args.id, "remove_tender command");
    let removed = checkout.with_checkout_mut(|c| c.remove_tender(args.id))?;
    info!(id = removed.id, method = %removed.method, amount = %removed.total_amount(), "Tender removed");
    Ok(respond(checkout, config))
}

fn log_tender(entry: &TenderEntry) {
    info!(
        id = entry.id,
        method = %entry.method,
        installments = entry.installments,
        base = %entry.base_amount(),
        surcharge = %entry.surcharge(),
        "Tender added"
    );
}
