//! # Domain Types
//!
//! Core domain types used throughout Mostrador POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  SalePayment    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  receipt_number │   │  sale_id (FK)   │       │
//! │  │  name           │   │  status         │   │  method         │       │
//! │  │  price_cents    │   │  total_cents    │   │  amount_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Percentage    │   │    Customer     │   │  TenderMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  loyalty_points │   │  Cash / Card    │       │
//! │  │  2100 = 21%     │   │  credit_balance │   │  Transfer/Credit│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, receipt_number, etc.) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Percentage
// =============================================================================

/// A rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2100 bps = 21% (IVA), 825 bps = 8.25%
///
/// Used for tax, manual and loyalty discounts, and the per-installment
/// card surcharge.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// One hundred percent.
    pub const FULL: Percentage = Percentage(10_000);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a rate from a percentage (for config parsing).
    ///
    /// Negative and non-finite inputs become zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percentage(0);
        }
        Percentage((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Clamps the rate to `[0, 100%]`.
    #[inline]
    pub const fn clamped(&self) -> Self {
        if self.0 > Self::FULL.0 {
            Self::FULL
        } else {
            *self
        }
    }

    /// Adds two rates without overflowing.
    #[inline]
    pub const fn saturating_add(&self, other: Percentage) -> Self {
        Percentage(self.0.saturating_add(other.0))
    }

    /// Subtracts, stopping at zero.
    #[inline]
    pub const fn saturating_sub(&self, other: Percentage) -> Self {
        Percentage(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Tender Method
// =============================================================================

/// How a tender entry is paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TenderMethod {
    /// Physical cash.
    Cash,
    /// Card on an external terminal; may be split into installments.
    Card,
    /// Bank transfer.
    Transfer,
    /// Charged to the customer's store account.
    Credit,
}

impl TenderMethod {
    /// Only card payments can carry installments.
    #[inline]
    pub const fn allows_installments(&self) -> bool {
        matches!(self, TenderMethod::Card)
    }

    /// Lowercase wire/SQL name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TenderMethod::Cash => "cash",
            TenderMethod::Card => "card",
            TenderMethod::Transfer => "transfer",
            TenderMethod::Credit => "credit",
        }
    }
}

impl Default for TenderMethod {
    fn default() -> Self {
        TenderMethod::Cash
    }
}

impl fmt::Display for TenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Checkout Context
// =============================================================================

/// Who is selling, where, for which tenant.
///
/// Passed explicitly into sale building and persistence; nothing in the
/// core reads ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutContext {
    pub tenant_id: String,
    pub user_id: String,
    pub device_id: String,
}

impl CheckoutContext {
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        CheckoutContext {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            device_id: device_id.into(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost in cents (for margin reporting).
    pub cost_cents: Option<i64>,

    /// Whether to track inventory for this product.
    pub track_inventory: bool,

    /// Allow selling when stock is zero or negative.
    pub allow_negative_stock: bool,

    pub current_stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    pub sync_version: i64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if product can be sold (in stock or doesn't track inventory).
    pub fn can_sell(&self, quantity: i64) -> bool {
        if !self.track_inventory {
            return true;
        }

        let stock = self.current_stock.unwrap_or(0);
        if stock >= quantity {
            return true;
        }

        self.allow_negative_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer account with loyalty points and store credit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// National id / tax id, free form.
    pub document_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Redeemable points balance.
    pub loyalty_points: i64,
    /// Total spent across completed sales; drives the loyalty tier.
    pub lifetime_spend_cents: i64,
    /// Maximum account balance allowed; `None` means unlimited.
    pub credit_limit_cents: Option<i64>,
    /// Amount owed on the store account.
    pub credit_balance_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub sync_version: i64,
}

impl Customer {
    #[inline]
    pub fn lifetime_spend(&self) -> Money {
        Money::from_cents(self.lifetime_spend_cents)
    }

    #[inline]
    pub fn credit_balance(&self) -> Money {
        Money::from_cents(self.credit_balance_cents)
    }

    #[inline]
    pub fn credit_limit(&self) -> Option<Money> {
        self.credit_limit_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a persisted sale.
///
/// Sales are only written once fully paid, so there is no draft state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale has been paid and recorded.
    Completed,
    /// Sale was cancelled after completion.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleStatus::Completed => f.write_str("completed"),
            SaleStatus::Voided => f.write_str("voided"),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub tenant_id: String,
    pub receipt_number: String,
    pub status: SaleStatus,
    pub customer_id: Option<String>,
    pub subtotal_cents: i64,
    /// Manual + loyalty rate discount + points value.
    pub discount_cents: i64,
    /// Manual + loyalty rate actually applied.
    pub discount_rate_bps: u32,
    pub tax_cents: i64,
    pub tax_rate_bps: u32,
    /// Card surcharges across all tenders.
    pub surcharge_cents: i64,
    /// Post-tax total plus surcharges.
    pub total_cents: i64,
    /// Method of the largest tender entry.
    pub payment_method: TenderMethod,
    /// Highest installment count across tenders.
    pub installments: u32,
    /// `total / installments` when installments > 1, else 0.
    pub installment_amount_cents: i64,
    pub points_redeemed: i64,
    pub points_earned: i64,
    pub user_id: String,
    pub device_id: String,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub voided_at: Option<DateTime<Utc>>,
    pub sync_version: i64,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Sale Payment
// =============================================================================

/// One tender entry as persisted.
/// A sale can have multiple payments for split tender scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalePayment {
    pub id: String,
    pub sale_id: String,
    pub method: TenderMethod,
    /// Portion counted against the pre-surcharge total.
    pub base_amount_cents: i64,
    pub card_surcharge_cents: i64,
    /// base + surcharge, what the customer was charged.
    pub amount_cents: i64,
    pub installments: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SalePayment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Sync Outbox
// =============================================================================

/// An entry in the backend submission queue.
/// Uses outbox pattern so a sale is written locally and uploaded later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SyncOutboxEntry {
    pub id: String,
    pub tenant_id: String,
    /// Type of entity being synced: "SALE", "SALE_VOID", "SETTINGS".
    pub entity_type: String,
    pub entity_id: String,
    /// The full entity data as JSON.
    pub payload: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub attempted_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub synced_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================
