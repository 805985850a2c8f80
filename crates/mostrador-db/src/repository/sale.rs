//! # Sale Repository
//!
//! Writing completed sales, reading them back, and voiding them.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. RECORD (one transaction)                                            │
//! │     ├── re-check points against the live customer balance               │
//! │     ├── re-check the account credit limit                               │
//! │     ├── re-check stock for tracked products                             │
//! │     ├── INSERT sales, sale_items, sale_payments                         │
//! │     ├── stock − quantity, points − redeemed + earned,                   │
//! │     │   lifetime spend + total, account balance + credit                │
//! │     └── INSERT sync_outbox ('SALE')                                     │
//! │                                                                         │
//! │  2. (OPTIONAL) VOID (one transaction)                                   │
//! │     ├── status = voided                                                 │
//! │     ├── every effect of step 1 reversed                                 │
//! │     └── INSERT sync_outbox ('SALE_VOID')                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A guard failing inside the transaction returns `DbError::Rejected` and
//! nothing is written.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::sync::{queue_in, ENTITY_SALE, ENTITY_SALE_VOID};
use crate::error::{DbError, DbResult};
use mostrador_core::loyalty::validate_points_redemption;
use mostrador_core::record::SaleRecord;
use mostrador_core::{CoreError, Money, Sale, SaleItem, SalePayment, SaleStatus, TenderMethod};

const SALE_COLUMNS: &str = "id, tenant_id, receipt_number, status, customer_id, \
     subtotal_cents, discount_cents, discount_rate_bps, tax_cents, tax_rate_bps, \
     surcharge_cents, total_cents, payment_method, installments, installment_amount_cents, \
     points_redeemed, points_earned, user_id, device_id, notes, \
     created_at, updated_at, voided_at, sync_version";

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Persists a completed sale and all of its side effects atomically.
    ///
    /// ## Errors
    /// - `Rejected(PointsExceedBalance)`: the customer's balance changed since
    ///   the checkout was built
    /// - `Rejected(CreditLimitExceeded)`, `Rejected(InsufficientStock)`
    /// - `UniqueViolation` on `sales.id`: this sale id was already recorded
    /// - `UniqueViolation` on `sales.receipt_number`: the device already
    ///   issued this receipt number
    pub async fn record_sale(&self, record: &SaleRecord) -> DbResult<()> {
        let sale = &record.sale;
        debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Recording sale");

        let payload = serde_json::to_string(record)?;
        let mut tx = self.pool.begin().await?;

        check_customer(&mut tx, record).await?;
        check_stock(&mut tx, &record.items).await?;

        insert_sale(&mut tx, sale).await.map_err(|e| match e {
            DbError::UniqueViolation { field, .. } if field == "sales.id" => {
                DbError::UniqueViolation {
                    field,
                    value: sale.id.clone(),
                }
            }
            DbError::UniqueViolation { field, .. } if field == "sales.receipt_number" => {
                DbError::UniqueViolation {
                    field,
                    value: sale.receipt_number.clone(),
                }
            }
            other => other,
        })?;

        for item in &record.items {
            insert_item(&mut tx, item).await?;
            adjust_stock(&mut tx, &item.product_id, -item.quantity).await?;
        }
        for payment in &record.payments {
            insert_payment(&mut tx, payment).await?;
        }

        if let Some(customer_id) = &sale.customer_id {
            adjust_customer(
                &mut tx,
                customer_id,
                sale.points_earned - sale.points_redeemed,
                record.total_base(),
                record.credit_charged(),
                sale.updated_at,
            )
            .await?;
        }

        queue_in(&mut tx, &sale.tenant_id, ENTITY_SALE, &sale.id, &payload).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %sale.id,
            receipt_number = %sale.receipt_number,
            total_cents = sale.total_cents,
            payments = record.payments.len(),
            "Sale recorded"
        );
        Ok(())
    }

    /// Next receipt sequence for the device on the day of `now` (1-based).
    pub async fn next_receipt_sequence(&self, device_id: &str, now: DateTime<Utc>) -> DbResult<u32> {
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);
        let day_end = day_start + Duration::days(1);

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sales WHERE device_id = ?1 AND created_at >= ?2 AND created_at < ?3",
        )
        .bind(device_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX - 1) + 1)
    }

    // =========================================================================
    // Reading
    // =========================================================================

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, sku_snapshot, name_snapshot,
                   unit_price_cents, quantity, line_total_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn get_payments(&self, sale_id: &str) -> DbResult<Vec<SalePayment>> {
        let payments = sqlx::query_as::<_, SalePayment>(
            r#"
            SELECT id, sale_id, method, base_amount_cents, card_surcharge_cents,
                   amount_cents, installments, created_at
            FROM sale_payments
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Most recent sales for the tenant, newest first.
    pub async fn list_recent(&self, tenant_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE tenant_id = ?1 ORDER BY created_at DESC LIMIT ?2"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(tenant_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    // =========================================================================
    // Voiding
    // =========================================================================

    /// Voids a completed sale, reversing stock, points, spend and account
    /// credit, and queues the void for upload.
    pub async fn void_sale(&self, sale_id: &str) -> DbResult<Sale> {
        debug!(id = %sale_id, "Voiding sale");

        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        if sale.status != SaleStatus::Completed {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale.id.clone(),
                current_status: sale.status.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE sales SET
                status = ?2,
                voided_at = ?3,
                updated_at = ?3,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(&sale.id)
        .bind(SaleStatus::Voided)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let items: Vec<(String, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM sale_items WHERE sale_id = ?1")
                .bind(&sale.id)
                .fetch_all(&mut *tx)
                .await?;
        for (product_id, quantity) in &items {
            adjust_stock(&mut tx, product_id, *quantity).await?;
        }

        if let Some(customer_id) = &sale.customer_id {
            let credit: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(amount_cents), 0) FROM sale_payments WHERE sale_id = ?1 AND method = ?2",
            )
            .bind(&sale.id)
            .bind(TenderMethod::Credit)
            .fetch_one(&mut *tx)
            .await?;

            adjust_customer(
                &mut tx,
                customer_id,
                sale.points_redeemed - sale.points_earned,
                -Money::from_cents(sale.total_cents - sale.surcharge_cents),
                -Money::from_cents(credit),
                now,
            )
            .await?;
        }

        let payload = json!({ "saleId": sale.id, "voidedAt": now }).to_string();
        queue_in(&mut tx, &sale.tenant_id, ENTITY_SALE_VOID, &sale.id, &payload).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %sale.id, receipt_number = %sale.receipt_number, "Sale voided");

        Ok(Sale {
            status: SaleStatus::Voided,
            voided_at: Some(now),
            updated_at: now,
            sync_version: sale.sync_version + 1,
            ..sale
        })
    }
}

// =============================================================================
// Transaction steps
// =============================================================================

/// Points and account credit against the customer row as it is now.
async fn check_customer(conn: &mut SqliteConnection, record: &SaleRecord) -> DbResult<()> {
    let sale = &record.sale;
    let credit = record.credit_charged();

    let Some(customer_id) = &sale.customer_id else {
        if sale.points_redeemed > 0 || credit.is_positive() {
            return Err(CoreError::CustomerRequired {
                reason: "points and account credit need a customer".to_string(),
            }
            .into());
        }
        return Ok(());
    };

    let row: Option<(i64, Option<i64>, i64)> = sqlx::query_as(
        "SELECT loyalty_points, credit_limit_cents, credit_balance_cents FROM customers WHERE id = ?1",
    )
    .bind(customer_id)
    .fetch_optional(&mut *conn)
    .await?;
    let (points, credit_limit, credit_balance) =
        row.ok_or_else(|| DbError::not_found("Customer", customer_id))?;

    if let Err(e) = validate_points_redemption(sale.points_redeemed, points) {
        warn!(customer_id = %customer_id, requested = sale.points_redeemed, available = points, "Points redemption refused");
        return Err(e.into());
    }

    if let Some(limit) = credit_limit {
        let new_balance = Money::from_cents(credit_balance) + credit;
        if credit.is_positive() && new_balance > Money::from_cents(limit) {
            return Err(CoreError::CreditLimitExceeded {
                limit: Money::from_cents(limit),
                requested: new_balance,
            }
            .into());
        }
    }

    Ok(())
}

async fn check_stock(conn: &mut SqliteConnection, items: &[SaleItem]) -> DbResult<()> {
    for item in items {
        let row: Option<(bool, bool, Option<i64>)> = sqlx::query_as(
            "SELECT track_inventory, allow_negative_stock, current_stock FROM products WHERE id = ?1",
        )
        .bind(&item.product_id)
        .fetch_optional(&mut *conn)
        .await?;

        let (track, allow_negative, stock) =
            row.ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;
        let available = stock.unwrap_or(0);
        if track && !allow_negative && available < item.quantity {
            return Err(CoreError::InsufficientStock {
                sku: item.sku_snapshot.clone(),
                available,
                requested: item.quantity,
            }
            .into());
        }
    }
    Ok(())
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, tenant_id, receipt_number, status, customer_id,
            subtotal_cents, discount_cents, discount_rate_bps, tax_cents, tax_rate_bps,
            surcharge_cents, total_cents, payment_method, installments, installment_amount_cents,
            points_redeemed, points_earned, user_id, device_id, notes,
            created_at, updated_at, voided_at, sync_version
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19, ?20,
            ?21, ?22, ?23, ?24
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.tenant_id)
    .bind(&sale.receipt_number)
    .bind(sale.status)
    .bind(&sale.customer_id)
    .bind(sale.subtotal_cents)
    .bind(sale.discount_cents)
    .bind(sale.discount_rate_bps)
    .bind(sale.tax_cents)
    .bind(sale.tax_rate_bps)
    .bind(sale.surcharge_cents)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .bind(sale.installments)
    .bind(sale.installment_amount_cents)
    .bind(sale.points_redeemed)
    .bind(sale.points_earned)
    .bind(&sale.user_id)
    .bind(&sale.device_id)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .bind(sale.voided_at)
    .bind(sale.sync_version)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, sku_snapshot, name_snapshot,
            unit_price_cents, quantity, line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.sku_snapshot)
    .bind(&item.name_snapshot)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_payment(conn: &mut SqliteConnection, payment: &SalePayment) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_payments (
            id, sale_id, method, base_amount_cents, card_surcharge_cents,
            amount_cents, installments, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.sale_id)
    .bind(payment.method)
    .bind(payment.base_amount_cents)
    .bind(payment.card_surcharge_cents)
    .bind(payment.amount_cents)
    .bind(payment.installments)
    .bind(payment.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Relative stock change; untracked products are left alone.
async fn adjust_stock(conn: &mut SqliteConnection, product_id: &str, delta: i64) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET current_stock = COALESCE(current_stock, 0) + ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1 AND track_inventory = 1
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Points never drop below zero; a void after the earned points were
/// spent takes back what is left.
async fn adjust_customer(
    conn: &mut SqliteConnection,
    customer_id: &str,
    points_delta: i64,
    spend_delta: Money,
    credit_delta: Money,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE customers SET
            loyalty_points = MAX(loyalty_points + ?2, 0),
            lifetime_spend_cents = lifetime_spend_cents + ?3,
            credit_balance_cents = credit_balance_cents + ?4,
            updated_at = ?5,
            sync_version = sync_version + 1
        WHERE id = ?1
        "#,
    )
    .bind(customer_id)
    .bind(points_delta)
    .bind(spend_delta.cents())
    .bind(credit_delta.cents())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Customer", customer_id));
    }
    Ok(())
}
