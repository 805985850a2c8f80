//! # Register Commands
//!
//! Everything the frontend can ask the register to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── product.rs   ◄─── Catalog search and lookup
//! ├── customer.rs  ◄─── Customer search for loyalty and account sales
//! ├── cart.rs      ◄─── Cart lines
//! ├── checkout.rs  ◄─── Discounts, customer, points, tenders
//! ├── sale.rs      ◄─── Completing, reading and voiding sales
//! ├── config.rs    ◄─── Store config and pricing settings
//! └── sync.rs      ◄─── Outbox status
//! ```
//!
//! ## How Commands Work
//! ```text
//! {"id":3,"cmd":"add_to_cart","args":{"productId":"…","quantity":2}}
//!        │
//!        ▼  ipc::dispatch: args → AddToCartArgs (serde, camelCase)
//! commands::cart::add_to_cart(&db, &checkout, &config, args)
//!        │
//!        ▼  Result<CheckoutResponse, ApiError>
//! {"id":3,"ok":true,"data":{"lines":[…],"summary":{…}}}
//! ```
//!
//! Each command takes only the state it needs.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod customer;
pub mod product;
pub mod sale;
pub mod sync;

/// Default and maximum page size for search commands.
pub(crate) const DEFAULT_LIMIT: u32 = 20;
pub(crate) const MAX_LIMIT: u32 = 100;

pub(crate) fn page_size(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
