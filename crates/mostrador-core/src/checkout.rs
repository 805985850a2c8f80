//! # Checkout
//!
//! The pricing calculator and the checkout session it runs over.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal        = Σ quantity × unit_price                          │
//! │  2. manual          = subtotal × manual_rate                           │
//! │  3. loyalty         = subtotal × tier_rate                             │
//! │  4. points_value    = points_redeemed × point_value                    │
//! │  5. total_discount  = manual + loyalty + points_value                  │
//! │  6. tax             = (subtotal − total_discount) × tax_rate           │
//! │  7. total_base      = subtotal − total_discount + tax                  │
//! │  8. fold tenders    → base_paid, surcharge_paid, total_collected       │
//! │  9. remaining_base  = total_base − base_paid                           │
//! │ 10. potential card surcharge on remaining_base for the pending tender  │
//! │ 11. total           = total_base + surcharge_paid                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every summary is recomputed from scratch. Nothing is accumulated between
//! calls, so any edit (quantity change, removed tender) is reflected exactly.
//!
//! ## Discount Policy
//! With [`DiscountPolicy::Capped`] the manual and tier rates together never
//! exceed 100% (the tier share gives way first) and the points value never
//! exceeds what is left of the subtotal, so `total_base` is never negative.
//! [`DiscountPolicy::Uncapped`] stacks the three discounts as entered.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::loyalty::{validate_points_redemption, LoyaltyConfig};
use crate::money::Money;
use crate::tender::{card_surcharge, PendingTender, TenderEntry, TenderLedger};
use crate::types::{Customer, Percentage, TenderMethod};
use crate::validation::{validate_points, validate_rate_bps};

// =============================================================================
// Settings
// =============================================================================

/// How stacked discounts are bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountPolicy {
    /// Combined rate clamped to 100%, points capped at the remaining subtotal.
    Capped,
    /// Discounts stack as entered; the total can go below zero.
    Uncapped,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy::Capped
    }
}

/// Store pricing configuration used by every calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingSettings {
    pub tax_rate: Percentage,
    /// Surcharge per installment on card tenders.
    pub card_surcharge_rate: Percentage,
    pub loyalty: LoyaltyConfig,
    pub discount_policy: DiscountPolicy,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_rate: Percentage::zero(),
            card_surcharge_rate: Percentage::zero(),
            loyalty: LoyaltyConfig::default(),
            discount_policy: DiscountPolicy::default(),
        }
    }
}

impl PricingSettings {
    pub fn validate(&self) -> CoreResult<()> {
        validate_rate_bps("tax_rate", self.tax_rate.bps())?;
        validate_rate_bps("card_surcharge_rate", self.card_surcharge_rate.bps())?;
        for tier in &self.loyalty.tiers {
            validate_rate_bps("tier discount", tier.discount_bps)?;
        }
        Ok(())
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Everything the calculator reads, borrowed from wherever it lives.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutInputs<'a> {
    pub cart: &'a Cart,
    pub manual_rate: Percentage,
    pub loyalty_rate: Percentage,
    pub points_redeemed: i64,
    /// Balance of the attached customer; `None` when no customer.
    pub points_available: Option<i64>,
    pub tenders: &'a TenderLedger,
    pub pending: PendingTender,
}

/// Result of one calculator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub subtotal: Money,
    pub manual_discount: Money,
    pub loyalty_discount: Money,
    pub loyalty_points_value: Money,
    pub total_discount: Money,
    /// Manual + tier rate actually applied.
    pub discount_rate: Percentage,
    pub tax_rate: Percentage,
    pub tax: Money,
    /// Amount owed before card surcharges.
    pub total_base: Money,
    pub base_paid: Money,
    pub surcharge_paid: Money,
    /// Base plus surcharges across confirmed tenders.
    pub total_collected: Money,
    /// total_base + surcharge_paid.
    pub total: Money,
    pub remaining_base: Money,
    /// Surcharge the pending tender would add if it paid the remainder.
    pub potential_card_surcharge: Money,
    /// Overpayment after the cart shrank below what was already tendered.
    pub change_due: Money,
    pub item_count: usize,
    pub can_complete: bool,
    /// Points redemption problem, shown live; blocks completion.
    pub loyalty_warning: Option<String>,
}

/// Runs the pricing calculator.
///
/// Pure and total: bad points input shows up as `loyalty_warning`, never as
/// an error, so the summary can always be rendered.
pub fn calculate(inputs: &CheckoutInputs<'_>, settings: &PricingSettings) -> CheckoutSummary {
    let subtotal = inputs.cart.subtotal();
    let capped = settings.discount_policy == DiscountPolicy::Capped;

    // Rates
    let manual_rate = if capped {
        inputs.manual_rate.clamped()
    } else {
        inputs.manual_rate
    };
    let loyalty_rate = if capped {
        inputs
            .loyalty_rate
            .clamped()
            .min(Percentage::FULL.saturating_sub(manual_rate))
    } else {
        inputs.loyalty_rate
    };

    // Discounts
    let manual_discount = subtotal.percentage(manual_rate);
    let mut loyalty_discount = subtotal.percentage(loyalty_rate);
    let mut loyalty_points_value = if inputs.cart.is_empty() {
        Money::zero()
    } else {
        settings.loyalty.points_value(inputs.points_redeemed)
    };
    if capped {
        // Independent rounding of the two rate discounts can overshoot by a cent
        loyalty_discount = loyalty_discount.min((subtotal - manual_discount).non_negative());
        let left = (subtotal - manual_discount - loyalty_discount).non_negative();
        loyalty_points_value = loyalty_points_value.min(left);
    }
    let total_discount = manual_discount + loyalty_discount + loyalty_points_value;

    // Tax and total
    let tax = (subtotal - total_discount).percentage(settings.tax_rate);
    let total_base = subtotal - total_discount + tax;

    // Tenders left behind by an emptied cart count for nothing
    let (base_paid, surcharge_paid, total_collected) = if inputs.cart.is_empty() {
        (Money::zero(), Money::zero(), Money::zero())
    } else {
        (
            inputs.tenders.base_paid(),
            inputs.tenders.surcharge_paid(),
            inputs.tenders.total_collected(),
        )
    };
    let remaining_base = total_base - base_paid;

    let potential_card_surcharge = if remaining_base.is_positive() {
        card_surcharge(
            inputs.pending.method,
            remaining_base,
            inputs.pending.installments,
            settings.card_surcharge_rate,
        )
    } else {
        Money::zero()
    };

    let loyalty_warning = points_problem(inputs.points_redeemed, inputs.points_available)
        .err()
        .map(|e| e.to_string());

    let can_complete =
        !inputs.cart.is_empty() && !remaining_base.is_positive() && loyalty_warning.is_none();

    CheckoutSummary {
        subtotal,
        manual_discount,
        loyalty_discount,
        loyalty_points_value,
        total_discount,
        discount_rate: manual_rate.saturating_add(loyalty_rate),
        tax_rate: settings.tax_rate,
        tax,
        total_base,
        base_paid,
        surcharge_paid,
        total_collected,
        total: total_base + surcharge_paid,
        remaining_base,
        potential_card_surcharge,
        change_due: (-remaining_base).non_negative(),
        item_count: inputs.cart.item_count(),
        can_complete,
        loyalty_warning,
    }
}

fn points_problem(requested: i64, available: Option<i64>) -> CoreResult<()> {
    match available {
        _ if requested == 0 => Ok(()),
        Some(available) => validate_points_redemption(requested, available),
        None => Err(CoreError::CustomerRequired {
            reason: "points can only be redeemed for a customer".to_string(),
        }),
    }
}

// =============================================================================
// Checkout Session
// =============================================================================

/// The checkout being rung up at the register.
///
/// ## State Transitions
/// ```text
/// add lines ─► set discount / attach customer / set points
///     │
///     ▼
/// set pending tender ─► add_tender / pay_remaining ─► remove_tender
///     │
///     ▼
/// ensure_complete ─► SaleRecord::build ─► persist ─► reset
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub cart: Cart,
    customer: Option<Customer>,
    manual_discount: Percentage,
    points_redeemed: i64,
    tenders: TenderLedger,
    pending: PendingTender,
}

impl Checkout {
    pub fn new() -> Self {
        Checkout::default()
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn manual_discount(&self) -> Percentage {
        self.manual_discount
    }

    pub fn points_redeemed(&self) -> i64 {
        self.points_redeemed
    }

    pub fn tenders(&self) -> &TenderLedger {
        &self.tenders
    }

    pub fn pending(&self) -> PendingTender {
        self.pending
    }

    /// Sets the manual discount rate, `0..=100%`.
    pub fn set_manual_discount(&mut self, rate: Percentage) -> CoreResult<()> {
        validate_rate_bps("manual discount", rate.bps())?;
        self.manual_discount = rate;
        Ok(())
    }

    /// Attaches a customer, replacing any previous one.
    pub fn attach_customer(&mut self, customer: Customer) {
        self.customer = Some(customer);
    }

    /// Removes the customer and any points redeemed against them.
    pub fn detach_customer(&mut self) -> Option<Customer> {
        self.points_redeemed = 0;
        self.customer.take()
    }

    /// Sets the points to redeem and returns the live validation result.
    ///
    /// Negative input is refused outright. An amount above the customer's
    /// balance is kept (the cashier may still be typing) but reported, and
    /// blocks completion until fixed.
    pub fn set_points_redeemed(&mut self, points: i64) -> CoreResult<()> {
        validate_points(points)?;
        self.points_redeemed = points;
        self.validate_points()
    }

    /// Checks the redeemed points against the attached customer's balance.
    pub fn validate_points(&self) -> CoreResult<()> {
        points_problem(
            self.points_redeemed,
            self.customer.as_ref().map(|c| c.loyalty_points),
        )
    }

    /// Selects the method and installments for the next tender.
    pub fn set_pending_tender(&mut self, method: TenderMethod, installments: u32) -> CoreResult<()> {
        self.pending = PendingTender::new(method, installments)?;
        Ok(())
    }

    /// Confirms a tender for `amount` with the pending method.
    pub fn add_tender(&mut self, amount: Money, settings: &PricingSettings) -> CoreResult<TenderEntry> {
        self.check_credit_customer()?;
        let remaining = self.summary(settings).remaining_base;
        let entry = self
            .tenders
            .add(&self.pending, amount, remaining, settings.card_surcharge_rate)?
            .clone();
        self.pending = PendingTender::default();
        Ok(entry)
    }

    /// Confirms a tender for the whole remaining balance.
    pub fn pay_remaining(&mut self, settings: &PricingSettings) -> CoreResult<TenderEntry> {
        self.check_credit_customer()?;
        let remaining = self.summary(settings).remaining_base;
        let entry = self
            .tenders
            .add_remaining(&self.pending, remaining, settings.card_surcharge_rate)?
            .clone();
        self.pending = PendingTender::default();
        Ok(entry)
    }

    pub fn remove_tender(&mut self, id: u32) -> CoreResult<TenderEntry> {
        self.tenders.remove(id)
    }

    /// Drops confirmed tenders once the cart has no lines left.
    pub fn clear_tenders_if_cart_empty(&mut self) {
        if self.cart.is_empty() && !self.tenders.is_empty() {
            self.tenders.clear();
            self.pending = PendingTender::default();
        }
    }

    fn check_credit_customer(&self) -> CoreResult<()> {
        if self.pending.method == TenderMethod::Credit && self.customer.is_none() {
            return Err(CoreError::CustomerRequired {
                reason: "account credit needs a customer".to_string(),
            });
        }
        Ok(())
    }

    /// Tier discount rate for the attached customer.
    pub fn loyalty_rate(&self, settings: &PricingSettings) -> Percentage {
        self.customer
            .as_ref()
            .map(|c| settings.loyalty.discount_rate_for(c))
            .unwrap_or_default()
    }

    pub fn inputs(&self, settings: &PricingSettings) -> CheckoutInputs<'_> {
        CheckoutInputs {
            cart: &self.cart,
            manual_rate: self.manual_discount,
            loyalty_rate: self.loyalty_rate(settings),
            points_redeemed: self.points_redeemed,
            points_available: self.customer.as_ref().map(|c| c.loyalty_points),
            tenders: &self.tenders,
            pending: self.pending,
        }
    }

    pub fn summary(&self, settings: &PricingSettings) -> CheckoutSummary {
        calculate(&self.inputs(settings), settings)
    }

    /// The completion gate. Runs before anything is persisted.
    pub fn ensure_complete(&self, settings: &PricingSettings) -> CoreResult<CheckoutSummary> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let summary = self.summary(settings);
        if summary.remaining_base.is_positive() {
            return Err(CoreError::OutstandingBalance {
                remaining: summary.remaining_base,
            });
        }

        self.validate_points()?;

        if self.tenders.uses_credit() && self.customer.is_none() {
            return Err(CoreError::CustomerRequired {
                reason: "account credit needs a customer".to_string(),
            });
        }

        Ok(summary)
    }

    /// Back to an empty checkout.
    pub fn reset(&mut self) {
        *self = Checkout::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use chrono::Utc;

    fn settings(tax_bps: u32, surcharge_bps: u32) -> PricingSettings {
        PricingSettings {
            tax_rate: Percentage::from_bps(tax_bps),
            card_surcharge_rate: Percentage::from_bps(surcharge_bps),
            ..PricingSettings::default()
        }
    }

    fn line(id: &str, price_cents: i64, qty: i64) -> CartLine {
        CartLine::new(id, format!("SKU-{}", id), format!("Item {}", id), Money::from_cents(price_cents), qty)
    }

    fn customer(points: i64) -> Customer {
        Customer {
            id: "c-1".to_string(),
            tenant_id: crate::DEFAULT_TENANT_ID.to_string(),
            name: "Ana Gómez".to_string(),
            document_id: None,
            email: None,
            phone: None,
            loyalty_points: points,
            lifetime_spend_cents: 0,
            credit_limit_cents: None,
            credit_balance_cents: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }

    /// Cart [2 × 50.00], manual 10%.
    fn reference_checkout() -> Checkout {
        let mut checkout = Checkout::new();
        checkout.cart.add_line(line("1", 5000, 2)).unwrap();
        checkout
            .set_manual_discount(Percentage::from_bps(1000))
            .unwrap();
        checkout
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let mut checkout = Checkout::new();
        checkout.attach_customer(customer(500));
        checkout.set_points_redeemed(100).unwrap();
        checkout
            .set_manual_discount(Percentage::from_bps(1500))
            .unwrap();
        let s = checkout.summary(&settings(2100, 500));

        for amount in [
            s.subtotal,
            s.manual_discount,
            s.loyalty_discount,
            s.loyalty_points_value,
            s.total_discount,
            s.tax,
            s.total_base,
            s.total,
            s.remaining_base,
            s.potential_card_surcharge,
        ] {
            assert!(amount.is_zero());
        }
        assert!(!s.can_complete);
    }

    #[test]
    fn test_reference_discount_and_tax() {
        let s = reference_checkout().summary(&settings(2100, 0));

        assert_eq!(s.subtotal.cents(), 10_000);
        assert_eq!(s.total_discount.cents(), 1_000);
        assert_eq!(s.tax.cents(), 1_890);
        assert_eq!(s.total_base.cents(), 10_890);
        assert_eq!(s.remaining_base.cents(), 10_890);
        assert!(!s.can_complete);
    }

    #[test]
    fn test_single_cash_tender_covers_total() {
        let settings = settings(2100, 500);
        let mut checkout = reference_checkout();
        checkout
            .add_tender(Money::from_cents(10_890), &settings)
            .unwrap();
        let s = checkout.summary(&settings);

        assert!(s.remaining_base.is_zero());
        assert!(s.can_complete);
        assert!(s.surcharge_paid.is_zero());
        assert_eq!(s.total.cents(), 10_890);
        assert!(checkout.ensure_complete(&settings).is_ok());
    }

    #[test]
    fn test_split_cash_and_card_installments() {
        let settings = settings(2100, 500);
        let mut checkout = reference_checkout();

        checkout
            .add_tender(Money::from_cents(5_000), &settings)
            .unwrap();
        checkout.set_pending_tender(TenderMethod::Card, 3).unwrap();

        // 5890 × 15% = 883.5, rounded half up
        let preview = checkout.summary(&settings);
        assert_eq!(preview.potential_card_surcharge.cents(), 884);

        let card = checkout.pay_remaining(&settings).unwrap();
        assert_eq!(card.base_amount_cents, 5_890);
        assert_eq!(card.surcharge_cents, 884);

        let s = checkout.summary(&settings);
        assert!(s.remaining_base.is_zero());
        assert_eq!(s.surcharge_paid.cents(), 884);
        assert_eq!(s.total_collected.cents(), 11_774);
        assert_eq!(s.total.cents(), 11_774);
        assert!(s.potential_card_surcharge.is_zero());
        assert!(s.can_complete);
    }

    #[test]
    fn test_pending_resets_after_tender() {
        let settings = settings(0, 500);
        let mut checkout = reference_checkout();
        checkout.set_pending_tender(TenderMethod::Card, 6).unwrap();
        checkout
            .add_tender(Money::from_cents(1_000), &settings)
            .unwrap();
        assert_eq!(checkout.pending(), PendingTender::default());
    }

    #[test]
    fn test_add_then_remove_restores_totals() {
        let settings = settings(2100, 800);
        let mut checkout = reference_checkout();
        checkout
            .add_tender(Money::from_cents(2_000), &settings)
            .unwrap();
        let before = checkout.summary(&settings);

        checkout.set_pending_tender(TenderMethod::Card, 12).unwrap();
        let entry = checkout
            .add_tender(Money::from_cents(3_333), &settings)
            .unwrap();
        assert_ne!(checkout.summary(&settings), before);

        checkout.remove_tender(entry.id).unwrap();
        checkout.set_pending_tender(TenderMethod::Cash, 1).unwrap();
        assert_eq!(checkout.summary(&settings), before);
    }

    #[test]
    fn test_rejected_tender_changes_nothing() {
        let settings = settings(2100, 0);
        let mut checkout = reference_checkout();
        let before = checkout.summary(&settings);

        let over = checkout.add_tender(Money::from_cents(10_891), &settings);
        assert!(matches!(over, Err(CoreError::TenderRejected { .. })));
        let zero = checkout.add_tender(Money::zero(), &settings);
        assert!(matches!(zero, Err(CoreError::TenderRejected { .. })));

        assert_eq!(checkout.summary(&settings), before);
        assert!(checkout.tenders().is_empty());
    }

    #[test]
    fn test_pay_remaining_when_nothing_left() {
        let settings = settings(0, 0);
        let mut checkout = reference_checkout();
        checkout.pay_remaining(&settings).unwrap();
        assert!(matches!(
            checkout.pay_remaining(&settings),
            Err(CoreError::TenderRejected { .. })
        ));
    }

    #[test]
    fn test_outstanding_balance_blocks_completion() {
        let settings = settings(2100, 0);
        let mut checkout = reference_checkout();
        checkout
            .add_tender(Money::from_cents(10_000), &settings)
            .unwrap();

        assert_eq!(
            checkout.ensure_complete(&settings),
            Err(CoreError::OutstandingBalance {
                remaining: Money::from_cents(890)
            })
        );
        assert_eq!(
            Checkout::new().ensure_complete(&settings),
            Err(CoreError::EmptyCart)
        );
    }

    #[test]
    fn test_capped_policy_never_goes_negative() {
        let cart = {
            let mut c = Cart::new();
            c.add_line(line("1", 3, 1)).unwrap();
            c.add_line(line("2", 1999, 3)).unwrap();
            c
        };
        let ledger = TenderLedger::new();
        let settings = settings(2100, 0);

        for manual in [0, 2500, 5000, 9000, 10_000] {
            for loyalty in [0, 500, 5000, 10_000] {
                for points in [0, 10, 1_000, 1_000_000] {
                    let inputs = CheckoutInputs {
                        cart: &cart,
                        manual_rate: Percentage::from_bps(manual),
                        loyalty_rate: Percentage::from_bps(loyalty),
                        points_redeemed: points,
                        points_available: Some(i64::MAX),
                        tenders: &ledger,
                        pending: PendingTender::default(),
                    };
                    let s = calculate(&inputs, &settings);
                    assert!(!s.total_base.is_negative(), "manual {manual} loyalty {loyalty} points {points}");
                    assert!(s.discount_rate <= Percentage::FULL);
                }
            }
        }
    }

    #[test]
    fn test_capped_tier_share_gives_way() {
        let mut cart = Cart::new();
        cart.add_line(line("1", 10_000, 1)).unwrap();
        let ledger = TenderLedger::new();
        let inputs = CheckoutInputs {
            cart: &cart,
            manual_rate: Percentage::from_bps(8000),
            loyalty_rate: Percentage::from_bps(5000),
            points_redeemed: 0,
            points_available: None,
            tenders: &ledger,
            pending: PendingTender::default(),
        };
        let s = calculate(&inputs, &PricingSettings::default());

        assert_eq!(s.manual_discount.cents(), 8_000);
        assert_eq!(s.loyalty_discount.cents(), 2_000);
        assert!(s.total_base.is_zero());
    }

    #[test]
    fn test_uncapped_policy_can_go_negative() {
        let mut cart = Cart::new();
        cart.add_line(line("1", 10_000, 1)).unwrap();
        let ledger = TenderLedger::new();
        let uncapped = PricingSettings {
            discount_policy: DiscountPolicy::Uncapped,
            ..settings(2100, 0)
        };

        let within = CheckoutInputs {
            cart: &cart,
            manual_rate: Percentage::from_bps(6000),
            loyalty_rate: Percentage::from_bps(4000),
            points_redeemed: 0,
            points_available: None,
            tenders: &ledger,
            pending: PendingTender::default(),
        };
        assert!(!calculate(&within, &uncapped).total_base.is_negative());

        let over = CheckoutInputs {
            manual_rate: Percentage::from_bps(8000),
            loyalty_rate: Percentage::from_bps(5000),
            ..within
        };
        let s = calculate(&over, &uncapped);
        assert!(s.total_base.is_negative());
        assert_eq!(s.total_base.cents(), -3_000 - 630);
    }

    #[test]
    fn test_loyalty_tier_and_points() {
        let settings = settings(2100, 0);
        let mut checkout = reference_checkout();
        let mut gold = customer(200);
        gold.lifetime_spend_cents = 25_000_000;
        checkout.attach_customer(gold);
        checkout.set_points_redeemed(150).unwrap();

        let s = checkout.summary(&settings);
        // 10% manual + 5% tier + 150 points × $0.10
        assert_eq!(s.manual_discount.cents(), 1_000);
        assert_eq!(s.loyalty_discount.cents(), 500);
        assert_eq!(s.loyalty_points_value.cents(), 1_500);
        assert_eq!(s.total_discount.cents(), 3_000);
        assert_eq!(s.tax.cents(), 1_470);
        assert_eq!(s.total_base.cents(), 8_470);
        assert_eq!(s.discount_rate.bps(), 1_500);
        assert!(s.loyalty_warning.is_none());
    }

    #[test]
    fn test_points_over_balance_warns_and_blocks() {
        let settings = settings(0, 0);
        let mut checkout = reference_checkout();
        checkout.attach_customer(customer(100));

        let result = checkout.set_points_redeemed(250);
        assert_eq!(
            result,
            Err(CoreError::PointsExceedBalance {
                requested: 250,
                available: 100
            })
        );
        assert_eq!(checkout.points_redeemed(), 250);

        checkout.pay_remaining(&settings).unwrap();
        let s = checkout.summary(&settings);
        assert!(s.loyalty_warning.is_some());
        assert!(!s.can_complete);
        assert!(matches!(
            checkout.ensure_complete(&settings),
            Err(CoreError::PointsExceedBalance { .. })
        ));

        assert!(checkout.set_points_redeemed(-5).is_err());
        assert_eq!(checkout.points_redeemed(), 250);
    }

    #[test]
    fn test_detach_customer_clears_points() {
        let mut checkout = reference_checkout();
        checkout.attach_customer(customer(100));
        checkout.set_points_redeemed(50).unwrap();

        assert!(checkout.detach_customer().is_some());
        assert_eq!(checkout.points_redeemed(), 0);
        assert_eq!(
            checkout.set_points_redeemed(10),
            Err(CoreError::CustomerRequired {
                reason: "points can only be redeemed for a customer".to_string()
            })
        );
    }

    #[test]
    fn test_credit_tender_needs_customer() {
        let settings = settings(0, 0);
        let mut checkout = reference_checkout();
        checkout.set_pending_tender(TenderMethod::Credit, 1).unwrap();
        assert!(matches!(
            checkout.pay_remaining(&settings),
            Err(CoreError::CustomerRequired { .. })
        ));

        checkout.attach_customer(customer(0));
        checkout.pay_remaining(&settings).unwrap();
        assert!(checkout.ensure_complete(&settings).is_ok());
    }

    #[test]
    fn test_change_due_after_cart_shrinks() {
        let settings = settings(0, 0);
        let mut checkout = reference_checkout();
        checkout.pay_remaining(&settings).unwrap();
        checkout.cart.update_quantity("1", 1).unwrap();

        let s = checkout.summary(&settings);
        assert_eq!(s.remaining_base.cents(), -4_500);
        assert_eq!(s.change_due.cents(), 4_500);
        assert!(s.can_complete);
    }

    #[test]
    fn test_emptied_cart_reports_nothing_collected() {
        let settings = settings(2100, 500);
        let mut checkout = reference_checkout();
        checkout.set_pending_tender(TenderMethod::Card, 3).unwrap();
        checkout.pay_remaining(&settings).unwrap();
        checkout.cart.update_quantity("1", 0).unwrap();

        let s = checkout.summary(&settings);
        for amount in [
            s.total,
            s.total_base,
            s.base_paid,
            s.surcharge_paid,
            s.total_collected,
            s.remaining_base,
            s.change_due,
        ] {
            assert!(amount.is_zero());
        }
        assert!(!s.can_complete);
        assert_eq!(checkout.tenders().entries().len(), 1);

        checkout.clear_tenders_if_cart_empty();
        assert!(checkout.tenders().is_empty());

        // Re-adding a line starts from an unpaid balance
        checkout.cart.add_line(line("1", 5000, 1)).unwrap();
        let s = checkout.summary(&settings);
        assert_eq!(s.remaining_base.cents(), 5_445);
        assert!(s.total_collected.is_zero());
    }

    #[test]
    fn test_potential_surcharge_only_for_card_installments() {
        let settings = settings(2100, 500);
        let mut checkout = Checkout::new();
        checkout.cart.add_line(line("1", 5000, 2)).unwrap();

        for (method, installments) in [
            (TenderMethod::Cash, 3),
            (TenderMethod::Transfer, 3),
            (TenderMethod::Credit, 3),
            (TenderMethod::Card, 1),
        ] {
            checkout.set_pending_tender(method, installments).unwrap();
            let s = checkout.summary(&settings);
            assert_eq!(s.remaining_base.cents(), 12_100);
            assert!(
                s.potential_card_surcharge.is_zero(),
                "{method:?} x{installments}"
            );
        }

        checkout.set_pending_tender(TenderMethod::Card, 3).unwrap();
        let s = checkout.summary(&settings);
        assert_eq!(s.potential_card_surcharge.cents(), 1_815);
    }

    #[test]
    fn test_manual_discount_over_full_rejected() {
        let mut checkout = Checkout::new();
        assert!(checkout
            .set_manual_discount(Percentage::from_bps(10_001))
            .is_err());
        assert!(checkout.manual_discount().is_zero());
    }

    #[test]
    fn test_reset() {
        let settings = settings(2100, 0);
        let mut checkout = reference_checkout();
        checkout.attach_customer(customer(10));
        checkout.pay_remaining(&settings).unwrap();
        checkout.reset();

        assert!(checkout.cart.is_empty());
        assert!(checkout.customer().is_none());
        assert!(checkout.tenders().is_empty());
        assert!(checkout.manual_discount().is_zero());
    }

    #[test]
    fn test_settings_json_defaults() {
        let parsed: PricingSettings = serde_json::from_str(r#"{"taxRate":2100}"#).unwrap();
        assert_eq!(parsed.tax_rate.bps(), 2100);
        assert_eq!(parsed.discount_policy, DiscountPolicy::Capped);
        assert!(parsed.validate().is_ok());
    }
}
