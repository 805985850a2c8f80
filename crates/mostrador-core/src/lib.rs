//! # mostrador-core: Pure Business Logic for Mostrador POS
//!
//! This crate is the **heart** of Mostrador POS. It holds the checkout
//! pricing rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Checkout screen (frontend)                   │   │
//! │  │    Search ──► Cart ──► Discounts ──► Tenders ──► Receipt       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON lines over stdio                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Register commands                            │   │
//! │  │    add_to_cart, set_discount, add_tender, complete_sale, ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ mostrador-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────┐ ┌──────────┐ ┌──────────┐   │   │
//! │  │   │ money  │ │  cart  │ │ tender │ │ checkout │ │  record  │   │   │
//! │  │   │ Money  │ │  Cart  │ │ Ledger │ │ Summary  │ │SaleRecord│   │   │
//! │  │   └────────┘ └────────┘ └────────┘ └──────────┘ └──────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  mostrador-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Percentage, Product, Customer, Sale, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart lines with frozen prices
//! - [`tender`] - Tender entries, card surcharge rule, tender ledger
//! - [`loyalty`] - Loyalty tiers, point value, redemption validation
//! - [`checkout`] - The pricing calculator and the checkout session
//! - [`record`] - Building the persisted sale record from a checkout
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use mostrador_core::checkout::{Checkout, PricingSettings};
//! use mostrador_core::cart::CartLine;
//! use mostrador_core::{Money, Percentage, TenderMethod};
//!
//! let settings = PricingSettings {
//!     tax_rate: Percentage::from_bps(2100),
//!     ..PricingSettings::default()
//! };
//!
//! let mut checkout = Checkout::new();
//! checkout
//!     .cart
//!     .add_line(CartLine::new("p-1", "MATE-500", "Yerba 500g", Money::from_cents(5000), 2))
//!     .unwrap();
//! checkout.set_manual_discount(Percentage::from_bps(1000)).unwrap();
//!
//! let summary = checkout.summary(&settings);
//! assert_eq!(summary.total_base.cents(), 10890);
//!
//! checkout.set_pending_tender(TenderMethod::Cash, 1).unwrap();
//! checkout.pay_remaining(&settings).unwrap();
//! assert!(checkout.summary(&settings).can_complete);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod loyalty;
pub mod money;
pub mod record;
pub mod tender;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID (single-tenant runtime with multi-tenant schema).
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// Catches typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price accepted, in cents ($1,000,000,000.00).
///
/// A full cart at this price (`MAX_CART_ITEMS` lines of `MAX_ITEM_QUANTITY`)
/// stays near 1e16 cents, so tax and a 24-installment surcharge on it still
/// fit in `i64`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Maximum number of card installments accepted for one tender.
pub const MAX_INSTALLMENTS: u32 = 24;
