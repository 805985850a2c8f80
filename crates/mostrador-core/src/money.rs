//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Chained percentages in floating point:                                 │
//! │    100 - 10% + 21% tax - 15% surcharge ... drifts by fractions         │
//! │    "fully paid" then needs an epsilon like remaining <= 0.01           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    every step rounds once, half away from zero, to a whole cent        │
//! │    "fully paid" is remaining == 0, compared exactly                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Arithmetic operations
//! let doubled: Money = price * 2;     // $21.98
//! let total = price + Money::from_cents(500); // $15.99
//! assert_eq!(total.cents(), 1599);
//! assert_eq!(doubled.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percentage;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CartLine.unit_price ──► CartLine.subtotal ──► Cart.subtotal            │
/// │                                                                         │
/// │  subtotal ─► discounts ─► tax ─► total_base ─► tenders ─► remaining    │
/// │                                                                         │
/// │  EVERY monetary value in the checkout flows through this type           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // $10.99
    /// assert_eq!(price.cents(), 1099);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -$5.50
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Applies a percentage and rounds half away from zero to whole cents.
    ///
    /// ## Implementation
    /// Integer math on i128: `(amount * bps ± 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    /// use mostrador_core::types::Percentage;
    ///
    /// let taxable = Money::from_cents(9000);      // $90.00
    /// let vat = Percentage::from_bps(2100);       // 21%
    /// assert_eq!(taxable.percentage(vat).cents(), 1890);
    ///
    /// let price = Money::from_cents(1000);
    /// assert_eq!(price.percentage(Percentage::from_bps(825)).cents(), 83);
    /// ```
    pub fn percentage(&self, rate: Percentage) -> Money {
        self.percentage_times(rate, 1)
    }

    /// Applies `rate × factor` percent, rounding once at the end.
    ///
    /// Used for the installment surcharge where the rate is charged per
    /// installment: 8% over 3 installments is 24% of the base.
    ///
    /// ```rust
    /// use mostrador_core::money::Money;
    /// use mostrador_core::types::Percentage;
    ///
    /// let base = Money::from_cents(100_000);
    /// let surcharge = base.percentage_times(Percentage::from_bps(800), 3);
    /// assert_eq!(surcharge.cents(), 24_000);
    /// ```
    ///
    /// Saturates at the `i64` bounds instead of wrapping.
    pub fn percentage_times(&self, rate: Percentage, factor: u32) -> Money {
        let numerator = self.0 as i128 * rate.bps() as i128 * factor as i128;
        let cents = round_half_away(numerator, BPS_SCALE);
        Money::from_cents(cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides evenly into `parts` slices, truncating.
    ///
    /// Returns zero when `parts` is zero.
    #[inline]
    pub const fn split(&self, parts: u32) -> Self {
        if parts == 0 {
            Money(0)
        } else {
            Money(self.0 / parts as i64)
        }
    }
}

/// Integer division rounding half away from zero.
fn round_half_away(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.34`.
///
/// ## Note
/// Debug and log output only. The register's `ConfigState` formats for
/// the store's currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_times_saturates() {
        let huge = Money::from_cents(i64::MAX / 2);
        let surcharge = huge.percentage_times(Percentage::from_bps(10_000), 24);
        assert_eq!(surcharge.cents(), i64::MAX);

        let negative = Money::from_cents(i64::MIN / 2);
        assert_eq!(negative.percentage_times(Percentage::FULL, 24).cents(), i64::MIN);
    }

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(5000), Money::from_cents(5890)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 10890);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 5890 × 15% = 883.5 → 884
        let base = Money::from_cents(5890);
        assert_eq!(base.percentage(Percentage::from_bps(1500)).cents(), 884);
        // 1000 × 8.25% = 82.5 → 83
        let price = Money::from_cents(1000);
        assert_eq!(price.percentage(Percentage::from_bps(825)).cents(), 83);
    }

    #[test]
    fn test_percentage_negative_rounds_away_from_zero() {
        let negative = Money::from_cents(-1000);
        assert_eq!(negative.percentage(Percentage::from_bps(825)).cents(), -83);
    }

    #[test]
    fn test_percentage_times_matches_single_rounding() {
        // 5% × 3 installments rounds once, same as 15%
        let base = Money::from_cents(5890);
        assert_eq!(
            base.percentage_times(Percentage::from_bps(500), 3),
            base.percentage(Percentage::from_bps(1500))
        );
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.non_negative(), Money::zero());
    }

    #[test]
    fn test_split() {
        let total = Money::from_cents(12_400);
        assert_eq!(total.split(3).cents(), 4133);
        assert_eq!(total.split(0).cents(), 0);
    }

    /// Splitting $10.00 three ways loses a cent; callers that split must
    /// account for it explicitly.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let third = ten.split(3);
        let reconstructed: Money = third * 3;
        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
