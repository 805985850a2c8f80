//! # Tenders
//!
//! Payment-method contributions toward a sale, and the card surcharge rule.
//!
//! ## Split Tender Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_base: $108.90                                                    │
//! │                                                                         │
//! │  Cash  $50.00           base 50.00   surcharge 0.00   total 50.00      │
//! │  Card  3x $58.90 @5%    base 58.90   surcharge 8.84   total 67.74      │
//! │  ────────────────────────────────────────────────────────────────       │
//! │  base paid 108.90  →  remaining 0.00  →  checkout may complete         │
//! │  collected 117.74  (base + surcharges)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The surcharge is charged on top of the base amount and never counts
//! toward the remaining balance.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Percentage, TenderMethod};
use crate::validation::{validate_installments, validate_payment_amount};

/// Card surcharge for one tender.
///
/// Only a card paid in more than one installment is surcharged:
/// `base × rate × installments / 100`. A single card payment, cash,
/// transfer and account credit are never surcharged.
///
/// ```rust
/// use mostrador_core::tender::card_surcharge;
/// use mostrador_core::{Money, Percentage, TenderMethod};
///
/// let rate = Percentage::from_bps(800);
/// let base = Money::from_cents(100_000);
/// assert_eq!(card_surcharge(TenderMethod::Card, base, 3, rate).cents(), 24_000);
/// assert!(card_surcharge(TenderMethod::Card, base, 1, rate).is_zero());
/// assert!(card_surcharge(TenderMethod::Cash, base, 3, rate).is_zero());
/// ```
pub fn card_surcharge(
    method: TenderMethod,
    base: Money,
    installments: u32,
    rate: Percentage,
) -> Money {
    if method == TenderMethod::Card && installments > 1 {
        base.percentage_times(rate, installments)
    } else {
        Money::zero()
    }
}

// =============================================================================
// Tender Entry
// =============================================================================

/// A confirmed payment toward the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderEntry {
    /// Ledger-local id, used to remove the entry.
    pub id: u32,
    pub method: TenderMethod,
    pub base_amount_cents: i64,
    pub installments: u32,
    pub surcharge_cents: i64,
    /// base + surcharge.
    pub total_amount_cents: i64,
}

impl TenderEntry {
    #[inline]
    pub fn base_amount(&self) -> Money {
        Money::from_cents(self.base_amount_cents)
    }

    #[inline]
    pub fn surcharge(&self) -> Money {
        Money::from_cents(self.surcharge_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Pending Tender
// =============================================================================

/// The payment method the cashier has selected but not yet confirmed.
///
/// Drives the "potential surcharge" preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PendingTender {
    pub method: TenderMethod,
    pub installments: u32,
}

impl PendingTender {
    /// Validates the installment count; non-card methods are always 1.
    pub fn new(method: TenderMethod, installments: u32) -> CoreResult<Self> {
        validate_installments(installments)?;
        let installments = if method.allows_installments() {
            installments
        } else {
            1
        };
        Ok(PendingTender {
            method,
            installments,
        })
    }
}

impl Default for PendingTender {
    fn default() -> Self {
        PendingTender {
            method: TenderMethod::Cash,
            installments: 1,
        }
    }
}

// =============================================================================
// Tender Ledger
// =============================================================================

/// Ordered list of confirmed tenders.
///
/// Holds no running totals; every aggregate is folded from the entries on
/// demand, so removing an entry can never leave stale sums behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderLedger {
    entries: Vec<TenderEntry>,
    next_id: u32,
}

impl TenderLedger {
    pub fn new() -> Self {
        TenderLedger::default()
    }

    /// Confirms a tender of `amount` against the `remaining` base balance.
    ///
    /// ## Rejections (ledger unchanged)
    /// - `amount <= 0`
    /// - `amount > remaining`
    pub fn add(
        &mut self,
        pending: &PendingTender,
        amount: Money,
        remaining: Money,
        surcharge_rate: Percentage,
    ) -> CoreResult<&TenderEntry> {
        validate_payment_amount(amount.cents()).map_err(|e| CoreError::TenderRejected {
            reason: e.to_string(),
        })?;
        if amount > remaining {
            return Err(CoreError::TenderRejected {
                reason: format!(
                    "amount {} exceeds remaining {}",
                    amount,
                    remaining.non_negative()
                ),
            });
        }

        let surcharge = card_surcharge(
            pending.method,
            amount,
            pending.installments,
            surcharge_rate,
        );

        self.next_id += 1;
        self.entries.push(TenderEntry {
            id: self.next_id,
            method: pending.method,
            base_amount_cents: amount.cents(),
            installments: pending.installments,
            surcharge_cents: surcharge.cents(),
            total_amount_cents: (amount + surcharge).cents(),
        });

        // Just pushed, never empty here
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Confirms a tender for exactly the remaining base balance.
    pub fn add_remaining(
        &mut self,
        pending: &PendingTender,
        remaining: Money,
        surcharge_rate: Percentage,
    ) -> CoreResult<&TenderEntry> {
        if !remaining.is_positive() {
            return Err(CoreError::TenderRejected {
                reason: "nothing left to pay".to_string(),
            });
        }
        self.add(pending, remaining, remaining, surcharge_rate)
    }

    /// Removes an entry by id.
    pub fn remove(&mut self, id: u32) -> CoreResult<TenderEntry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(CoreError::TenderNotFound(id))?;
        Ok(self.entries.remove(position))
    }

    pub fn entries(&self) -> &[TenderEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Σ base amounts.
    pub fn base_paid(&self) -> Money {
        self.entries.iter().map(TenderEntry::base_amount).sum()
    }

    /// Σ surcharges.
    pub fn surcharge_paid(&self) -> Money {
        self.entries.iter().map(TenderEntry::surcharge).sum()
    }

    /// Σ base + surcharge.
    pub fn total_collected(&self) -> Money {
        self.entries.iter().map(TenderEntry::total_amount).sum()
    }

    /// The entry with the largest charged amount; the earliest wins a tie.
    pub fn largest(&self) -> Option<&TenderEntry> {
        self.entries.iter().fold(None, |best, e| match best {
            Some(b) if b.total_amount_cents >= e.total_amount_cents => Some(b),
            _ => Some(e),
        })
    }

    /// Highest installment count, 1 when there are no entries.
    pub fn max_installments(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.installments)
            .max()
            .unwrap_or(1)
    }

    /// True if any entry is charged to the customer account.
    pub fn uses_credit(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.method == TenderMethod::Credit)
    }

    /// Σ base amounts charged to the customer account.
    pub fn credit_amount(&self) -> Money {
        self.entries
            .iter()
            .filter(|e| e.method == TenderMethod::Credit)
            .map(TenderEntry::base_amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(installments: u32) -> PendingTender {
        PendingTender::new(TenderMethod::Card, installments).unwrap()
    }

    #[test]
    fn test_surcharge_only_on_multi_installment_card() {
        let rate = Percentage::from_bps(800);
        let base = Money::from_cents(123_456);

        for method in [TenderMethod::Cash, TenderMethod::Transfer, TenderMethod::Credit] {
            for installments in [1, 3, 12] {
                assert!(card_surcharge(method, base, installments, rate).is_zero());
            }
        }
        assert!(card_surcharge(TenderMethod::Card, base, 1, rate).is_zero());
        assert!(card_surcharge(TenderMethod::Card, base, 2, rate).is_positive());
    }

    #[test]
    fn test_surcharge_formula() {
        // 1000.00 × (8 × 3 / 100) = 240.00
        let mut ledger = TenderLedger::new();
        let entry = ledger
            .add(
                &card(3),
                Money::from_cents(100_000),
                Money::from_cents(100_000),
                Percentage::from_bps(800),
            )
            .unwrap();

        assert_eq!(entry.surcharge_cents, 24_000);
        assert_eq!(entry.total_amount_cents, 124_000);
    }

    #[test]
    fn test_pending_non_card_normalised_to_one_installment() {
        let pending = PendingTender::new(TenderMethod::Transfer, 6).unwrap();
        assert_eq!(pending.installments, 1);
        assert!(PendingTender::new(TenderMethod::Card, 0).is_err());
        assert!(PendingTender::new(TenderMethod::Card, 25).is_err());
    }

    #[test]
    fn test_rejections_leave_ledger_unchanged() {
        let mut ledger = TenderLedger::new();
        let cash = PendingTender::default();
        let remaining = Money::from_cents(5000);
        ledger
            .add(&cash, Money::from_cents(2000), remaining, Percentage::zero())
            .unwrap();
        let before = ledger.clone();

        let zero = ledger.add(&cash, Money::zero(), remaining, Percentage::zero());
        assert!(matches!(zero, Err(CoreError::TenderRejected { .. })));

        let negative = ledger.add(&cash, Money::from_cents(-1), remaining, Percentage::zero());
        assert!(matches!(negative, Err(CoreError::TenderRejected { .. })));

        let over = ledger.add(&cash, Money::from_cents(5001), remaining, Percentage::zero());
        assert!(matches!(over, Err(CoreError::TenderRejected { .. })));

        assert_eq!(ledger, before);
    }

    #[test]
    fn test_remove_by_id() {
        let mut ledger = TenderLedger::new();
        let cash = PendingTender::default();
        let remaining = Money::from_cents(10_000);
        let first = ledger
            .add(&cash, Money::from_cents(1000), remaining, Percentage::zero())
            .unwrap()
            .id;
        ledger
            .add(&cash, Money::from_cents(2000), remaining, Percentage::zero())
            .unwrap();

        let removed = ledger.remove(first).unwrap();
        assert_eq!(removed.base_amount_cents, 1000);
        assert_eq!(ledger.base_paid().cents(), 2000);
        assert_eq!(ledger.remove(first), Err(CoreError::TenderNotFound(first)));
    }

    #[test]
    fn test_aggregates() {
        let mut ledger = TenderLedger::new();
        let rate = Percentage::from_bps(500);
        let remaining = Money::from_cents(10_890);
        ledger
            .add(&PendingTender::default(), Money::from_cents(5000), remaining, rate)
            .unwrap();
        ledger
            .add(&card(3), Money::from_cents(5890), remaining, rate)
            .unwrap();

        assert_eq!(ledger.base_paid().cents(), 10_890);
        assert_eq!(ledger.surcharge_paid().cents(), 884);
        assert_eq!(ledger.total_collected().cents(), 11_774);
        assert_eq!(ledger.max_installments(), 3);
        assert_eq!(ledger.largest().map(|e| e.method), Some(TenderMethod::Card));
    }

    #[test]
    fn test_largest_tie_keeps_first() {
        let mut ledger = TenderLedger::new();
        let remaining = Money::from_cents(10_000);
        ledger
            .add(
                &PendingTender::new(TenderMethod::Transfer, 1).unwrap(),
                Money::from_cents(3000),
                remaining,
                Percentage::zero(),
            )
            .unwrap();
        ledger
            .add(&PendingTender::default(), Money::from_cents(3000), remaining, Percentage::zero())
            .unwrap();

        assert_eq!(
            ledger.largest().map(|e| e.method),
            Some(TenderMethod::Transfer)
        );
        assert_eq!(TenderLedger::new().max_installments(), 1);
    }
}
