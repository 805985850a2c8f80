//! # Loyalty
//!
//! Customer tiers, point value and the points redemption rule.
//!
//! ## Loyalty Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Customer attached                                                      │
//! │      │                                                                  │
//! │      ├── lifetime spend ──► tier_for() ──► tier discount rate          │
//! │      │                                                                  │
//! │      └── points balance ──► validate_points_redemption()               │
//! │                                 │                                       │
//! │                                 ├── live: warning on the summary        │
//! │                                 └── submit: checked again inside the    │
//! │                                     sale transaction, live balance      │
//! │                                                                         │
//! │  Sale completed ──► points_earned(total_base) added to the balance     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Customer, Percentage};

/// A loyalty tier reached once a customer's lifetime spend passes a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTier {
    pub name: String,
    pub min_lifetime_spend_cents: i64,
    /// Discount rate granted by the tier, in basis points.
    pub discount_bps: u32,
}

impl LoyaltyTier {
    pub fn discount_rate(&self) -> Percentage {
        Percentage::from_bps(self.discount_bps)
    }
}

/// Store-wide loyalty program settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyConfig {
    /// Currency value of one redeemed point, in cents.
    pub point_value_cents: i64,
    /// Spend needed to earn one point, in cents. Zero disables earning.
    pub earn_step_cents: i64,
    pub tiers: Vec<LoyaltyTier>,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        LoyaltyConfig {
            point_value_cents: 10,
            earn_step_cents: 1_000,
            tiers: vec![
                LoyaltyTier {
                    name: "Bronce".to_string(),
                    min_lifetime_spend_cents: 0,
                    discount_bps: 0,
                },
                LoyaltyTier {
                    name: "Plata".to_string(),
                    min_lifetime_spend_cents: 5_000_000,
                    discount_bps: 300,
                },
                LoyaltyTier {
                    name: "Oro".to_string(),
                    min_lifetime_spend_cents: 20_000_000,
                    discount_bps: 500,
                },
            ],
        }
    }
}

impl LoyaltyConfig {
    /// The highest tier whose threshold the customer has reached.
    pub fn tier_for(&self, customer: &Customer) -> Option<&LoyaltyTier> {
        self.tiers
            .iter()
            .filter(|t| customer.lifetime_spend_cents >= t.min_lifetime_spend_cents)
            .max_by_key(|t| t.min_lifetime_spend_cents)
    }

    /// Discount rate for the customer's tier, zero without a tier.
    pub fn discount_rate_for(&self, customer: &Customer) -> Percentage {
        self.tier_for(customer)
            .map(LoyaltyTier::discount_rate)
            .unwrap_or_default()
    }

    /// Points earned on a paid amount: one per full `earn_step`.
    ///
    /// ```rust
    /// use mostrador_core::loyalty::LoyaltyConfig;
    /// use mostrador_core::Money;
    ///
    /// let config = LoyaltyConfig { earn_step_cents: 1_000, ..LoyaltyConfig::default() };
    /// assert_eq!(config.points_earned(Money::from_cents(10_890)), 10);
    /// assert_eq!(config.points_earned(Money::from_cents(-500)), 0);
    /// ```
    pub fn points_earned(&self, amount: Money) -> i64 {
        if self.earn_step_cents <= 0 || !amount.is_positive() {
            return 0;
        }
        amount.cents() / self.earn_step_cents
    }

    /// Currency value of `points` redeemed points.
    pub fn points_value(&self, points: i64) -> Money {
        Money::from_cents(points.max(0).saturating_mul(self.point_value_cents.max(0)))
    }
}

/// The one rule for redeeming points against a balance.
///
/// Used for the live warning while the cashier edits the checkout and again
/// inside the sale transaction against the balance read there.
pub fn validate_points_redemption(requested: i64, available: i64) -> CoreResult<()> {
    if requested < 0 {
        return Err(ValidationError::OutOfRange {
            field: "points".to_string(),
            min: 0,
            max: available.max(0),
        }
        .into());
    }
    if requested > available {
        return Err(CoreError::PointsExceedBalance {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn customer(lifetime_spend_cents: i64, points: i64) -> Customer {
        Customer {
            id: "c-1".to_string(),
            tenant_id: crate::DEFAULT_TENANT_ID.to_string(),
            name: "Ana Gómez".to_string(),
            document_id: None,
            email: None,
            phone: None,
            loyalty_points: points,
            lifetime_spend_cents,
            credit_limit_cents: None,
            credit_balance_cents: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }

    #[test]
    fn test_tier_for_picks_highest_reached() {
        let config = LoyaltyConfig::default();

        assert_eq!(config.tier_for(&customer(0, 0)).map(|t| t.name.as_str()), Some("Bronce"));
        assert_eq!(
            config.tier_for(&customer(5_000_000, 0)).map(|t| t.name.as_str()),
            Some("Plata")
        );
        assert_eq!(config.discount_rate_for(&customer(30_000_000, 0)).bps(), 500);
    }

    #[test]
    fn test_tier_order_in_config_does_not_matter() {
        let mut config = LoyaltyConfig::default();
        config.tiers.reverse();
        assert_eq!(config.discount_rate_for(&customer(6_000_000, 0)).bps(), 300);
    }

    #[test]
    fn test_no_tiers_means_no_discount() {
        let config = LoyaltyConfig {
            tiers: Vec::new(),
            ..LoyaltyConfig::default()
        };
        assert!(config.discount_rate_for(&customer(99_999_999, 0)).is_zero());
    }

    #[test]
    fn test_points_value_and_earning() {
        let config = LoyaltyConfig::default();
        assert_eq!(config.points_value(150).cents(), 1_500);
        assert!(config.points_value(-3).is_zero());

        let disabled = LoyaltyConfig {
            earn_step_cents: 0,
            ..LoyaltyConfig::default()
        };
        assert_eq!(disabled.points_earned(Money::from_cents(1_000_000)), 0);
    }

    #[test]
    fn test_validate_points_redemption() {
        assert!(validate_points_redemption(0, 0).is_ok());
        assert!(validate_points_redemption(120, 120).is_ok());
        assert_eq!(
            validate_points_redemption(500, 120),
            Err(CoreError::PointsExceedBalance {
                requested: 500,
                available: 120
            })
        );
        assert!(matches!(
            validate_points_redemption(-1, 120),
            Err(CoreError::Validation(_))
        ));
    }
}
