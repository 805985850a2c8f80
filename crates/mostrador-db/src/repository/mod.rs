//! # Repositories
//!
//! Each repository owns the SQL for one aggregate and holds a clone of the
//! pool.
//!
//! ```text
//! Register command
//!      │  db.sales().record_sale(&record)
//!      ▼
//! SaleRepository ──► BEGIN … sales, sale_items, sale_payments,
//!                          products (stock), customers (points, credit),
//!                          sync_outbox … COMMIT
//! ```
//!
//! - [`ProductRepository`](product::ProductRepository): catalog search and CRUD
//! - [`CustomerRepository`](customer::CustomerRepository): customers, points, account
//! - [`SaleRepository`](sale::SaleRepository): recording and voiding sales
//! - [`SettingsRepository`](settings::SettingsRepository): per-tenant pricing settings
//! - [`SyncOutboxRepository`](sync::SyncOutboxRepository): upload queue

pub mod customer;
pub mod product;
pub mod sale;
pub mod settings;
pub mod sync;

/// Column list shared by every `SELECT` that maps to `Product`.
pub(crate) const PRODUCT_COLUMNS: &str = "id, tenant_id, sku, barcode, name, description, \
     price_cents, cost_cents, track_inventory, allow_negative_stock, current_stock, \
     is_active, created_at, updated_at, sync_version";

/// Column list shared by every `SELECT` that maps to `Customer`.
pub(crate) const CUSTOMER_COLUMNS: &str = "id, tenant_id, name, document_id, email, phone, \
     loyalty_points, lifetime_spend_cents, credit_limit_cents, credit_balance_cents, \
     is_active, created_at, updated_at, sync_version";

/// Escapes `%`, `_` and `\` for a `LIKE … ESCAPE '\'` pattern.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("mate"), "%mate%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
