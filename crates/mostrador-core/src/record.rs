//! # Sale Record
//!
//! Turns a completed checkout into the rows that get persisted.
//!
//! ```text
//! Checkout ──ensure_complete──► CheckoutSummary
//!     │                               │
//!     ▼                               ▼
//! SaleRecord::build ──► Sale          (totals, largest tender, installments)
//!                   ├─► Vec<SaleItem> (one per cart line, frozen snapshot)
//!                   └─► Vec<SalePayment> (one per tender entry)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::checkout::{Checkout, CheckoutSummary, PricingSettings};
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{CheckoutContext, Sale, SaleItem, SalePayment, SaleStatus, TenderMethod};
use crate::validation::validate_notes;

/// A sale with its items and payments, ready to write in one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub payments: Vec<SalePayment>,
}

impl SaleRecord {
    /// Builds the record, refusing checkouts that cannot complete.
    ///
    /// ## Gates
    /// - cart not empty
    /// - no outstanding balance
    /// - redeemed points within the attached customer's balance
    /// - account credit only with a customer
    pub fn build(
        ctx: &CheckoutContext,
        checkout: &Checkout,
        settings: &PricingSettings,
        sale_id: &str,
        receipt_number: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<SaleRecord> {
        let summary = checkout.ensure_complete(settings)?;
        let ledger = checkout.tenders();

        let payment_method = ledger.largest().map(|e| e.method).unwrap_or_default();
        let installments = ledger.max_installments();
        let installment_amount = if installments > 1 {
            summary.total.split(installments)
        } else {
            Money::zero()
        };

        let customer_id = checkout.customer().map(|c| c.id.clone());
        let points_earned = match customer_id {
            Some(_) => settings.loyalty.points_earned(summary.total_base),
            None => 0,
        };

        let sale = Sale {
            id: sale_id.to_string(),
            tenant_id: ctx.tenant_id.clone(),
            receipt_number: receipt_number.to_string(),
            status: SaleStatus::Completed,
            customer_id,
            subtotal_cents: summary.subtotal.cents(),
            discount_cents: summary.total_discount.cents(),
            discount_rate_bps: summary.discount_rate.bps(),
            tax_cents: summary.tax.cents(),
            tax_rate_bps: summary.tax_rate.bps(),
            surcharge_cents: summary.surcharge_paid.cents(),
            total_cents: summary.total.cents(),
            payment_method,
            installments,
            installment_amount_cents: installment_amount.cents(),
            points_redeemed: checkout.points_redeemed(),
            points_earned,
            user_id: ctx.user_id.clone(),
            device_id: ctx.device_id.clone(),
            notes: None,
            created_at: now,
            updated_at: now,
            voided_at: None,
            sync_version: 0,
        };

        let items = checkout
            .cart
            .lines
            .iter()
            .map(|line| SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.to_string(),
                product_id: line.product_id.clone(),
                sku_snapshot: line.sku.clone(),
                name_snapshot: line.name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line.subtotal().cents(),
                created_at: now,
            })
            .collect();

        let payments = ledger
            .entries()
            .iter()
            .map(|entry| SalePayment {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.to_string(),
                method: entry.method,
                base_amount_cents: entry.base_amount_cents,
                card_surcharge_cents: entry.surcharge_cents,
                amount_cents: entry.total_amount_cents,
                installments: entry.installments,
                created_at: now,
            })
            .collect();

        Ok(SaleRecord {
            sale,
            items,
            payments,
        })
    }

    /// Attaches cashier notes to the sale.
    pub fn with_notes(mut self, notes: Option<String>) -> CoreResult<Self> {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(n) = &notes {
            validate_notes(n)?;
        }
        self.sale.notes = notes;
        Ok(self)
    }

    /// Amount charged to the customer's store account.
    pub fn credit_charged(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.method == TenderMethod::Credit)
            .map(SalePayment::amount)
            .sum()
    }

    /// Pre-surcharge amount owed, the base for lifetime spend.
    pub fn total_base(&self) -> Money {
        Money::from_cents(self.sale.total_cents - self.sale.surcharge_cents)
    }
}

/// Receipt number `YYYYMMDD-DD-NNNN`: date, last two chars of the device
/// id, and the device's sequence for the day.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use mostrador_core::record::receipt_number;
///
/// let day = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
/// assert_eq!(receipt_number(day, "register-07", 12), "20260314-07-0012");
/// assert_eq!(receipt_number(day, "x", 1), "20260314-00-0001");
/// ```
pub fn receipt_number(now: DateTime<Utc>, device_id: &str, sequence: u32) -> String {
    let chars: Vec<char> = device_id.chars().collect();
    let device_code: String = if chars.len() < 2 {
        "00".to_string()
    } else {
        chars[chars.len() - 2..].iter().collect()
    };
    format!("{}-{}-{:04}", now.format("%Y%m%d"), device_code, sequence)
}

/// Summary line for logs and receipts.
pub fn describe(summary: &CheckoutSummary) -> String {
    format!(
        "total {} (base {}, surcharge {}), paid {}",
        summary.total, summary.total_base, summary.surcharge_paid, summary.total_collected
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::types::{Customer, Percentage};
    use crate::CoreError;

    fn ctx() -> CheckoutContext {
        CheckoutContext::new(crate::DEFAULT_TENANT_ID, "cashier-1", "register-01")
    }

    fn settings() -> PricingSettings {
        PricingSettings {
            tax_rate: Percentage::from_bps(2100),
            card_surcharge_rate: Percentage::from_bps(500),
            ..PricingSettings::default()
        }
    }

    fn checkout() -> Checkout {
        let mut checkout = Checkout::new();
        checkout
            .cart
            .add_line(CartLine::new("p-1", "MATE-500", "Yerba 500g", Money::from_cents(5000), 2))
            .unwrap();
        checkout
            .set_manual_discount(Percentage::from_bps(1000))
            .unwrap();
        checkout
    }

    fn customer() -> Customer {
        Customer {
            id: "c-9".to_string(),
            tenant_id: crate::DEFAULT_TENANT_ID.to_string(),
            name: "Juan Pérez".to_string(),
            document_id: None,
            email: None,
            phone: None,
            loyalty_points: 40,
            lifetime_spend_cents: 0,
            credit_limit_cents: Some(50_000),
            credit_balance_cents: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }

    #[test]
    fn test_build_split_tender_sale() {
        let settings = settings();
        let mut checkout = checkout();
        checkout
            .add_tender(Money::from_cents(5_000), &settings)
            .unwrap();
        checkout.set_pending_tender(TenderMethod::Card, 3).unwrap();
        checkout.pay_remaining(&settings).unwrap();

        let record = SaleRecord::build(&ctx(), &checkout, &settings, "s-1", "20260101-01-0001", Utc::now())
            .unwrap();
        let sale = &record.sale;

        assert_eq!(sale.subtotal_cents, 10_000);
        assert_eq!(sale.discount_cents, 1_000);
        assert_eq!(sale.discount_rate_bps, 1_000);
        assert_eq!(sale.tax_cents, 1_890);
        assert_eq!(sale.tax_rate_bps, 2_100);
        assert_eq!(sale.surcharge_cents, 884);
        assert_eq!(sale.total_cents, 11_774);
        // Card entry is the largest charged amount
        assert_eq!(sale.payment_method, TenderMethod::Card);
        assert_eq!(sale.installments, 3);
        assert_eq!(sale.installment_amount_cents, 3_924);
        assert_eq!(sale.points_earned, 0);
        assert_eq!(sale.user_id, "cashier-1");

        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].line_total_cents, 10_000);
        assert_eq!(record.payments.len(), 2);
        assert_eq!(record.payments[1].amount_cents, 6_774);
        assert_eq!(record.payments[1].card_surcharge_cents, 884);
        assert_eq!(record.total_base().cents(), 10_890);
    }

    #[test]
    fn test_single_payment_has_no_installment_amount() {
        let settings = settings();
        let mut checkout = checkout();
        checkout.pay_remaining(&settings).unwrap();

        let record = SaleRecord::build(&ctx(), &checkout, &settings, "s-2", "r", Utc::now()).unwrap();
        assert_eq!(record.sale.payment_method, TenderMethod::Cash);
        assert_eq!(record.sale.installments, 1);
        assert_eq!(record.sale.installment_amount_cents, 0);
        assert_eq!(record.sale.total_cents, 10_890);
    }

    #[test]
    fn test_build_refuses_outstanding_balance() {
        let settings = settings();
        let mut checkout = checkout();
        checkout
            .add_tender(Money::from_cents(890), &settings)
            .unwrap();

        let result = SaleRecord::build(&ctx(), &checkout, &settings, "s-3", "r", Utc::now());
        assert_eq!(
            result,
            Err(CoreError::OutstandingBalance {
                remaining: Money::from_cents(10_000)
            })
        );
    }

    #[test]
    fn test_customer_points_and_credit() {
        let settings = settings();
        let mut checkout = checkout();
        checkout.attach_customer(customer());
        checkout.set_points_redeemed(40).unwrap();
        checkout.set_pending_tender(TenderMethod::Credit, 1).unwrap();
        checkout.pay_remaining(&settings).unwrap();

        let record = SaleRecord::build(&ctx(), &checkout, &settings, "s-4", "r", Utc::now()).unwrap();
        // 9000 − 400 points value = 8600, tax 1806
        assert_eq!(record.sale.total_cents, 10_406);
        assert_eq!(record.sale.points_redeemed, 40);
        assert_eq!(record.sale.points_earned, 10);
        assert_eq!(record.sale.customer_id.as_deref(), Some("c-9"));
        assert_eq!(record.credit_charged().cents(), 10_406);
    }

    #[test]
    fn test_with_notes_trims_and_drops_blank() {
        let settings = settings();
        let mut checkout = checkout();
        checkout.pay_remaining(&settings).unwrap();
        let record = SaleRecord::build(&ctx(), &checkout, &settings, "s-5", "r", Utc::now()).unwrap();

        let noted = record.clone().with_notes(Some("  regalo ".to_string())).unwrap();
        assert_eq!(noted.sale.notes.as_deref(), Some("regalo"));
        let blank = record.clone().with_notes(Some("   ".to_string())).unwrap();
        assert!(blank.sale.notes.is_none());
        assert!(record.with_notes(Some("x".repeat(501))).is_err());
    }
}
