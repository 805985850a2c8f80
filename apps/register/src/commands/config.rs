//! # Config Commands
//!
//! Store configuration and pricing settings.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, StoreConfig};
use mostrador_core::checkout::PricingSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub store: StoreConfig,
    pub pricing: PricingSettings,
}

/// Store identity and current pricing, for the UI and receipts.
pub fn get_config(config: &ConfigState) -> ConfigResponse {
    debug!("get_config command");
    ConfigResponse {
        store: config.store().clone(),
        pricing: config.pricing(),
    }
}

/// Validates, persists and applies new pricing settings.
///
/// The checkout in progress is recalculated with them on its next command.
pub async fn update_pricing(
    db: &DbState,
    config: &ConfigState,
    settings: PricingSettings,
) -> Result<ConfigResponse, ApiError> {
    debug!("update_pricing command");
    db.inner().settings().upsert(config.tenant_id(), &settings).await?;
    info!(
        tax_rate = %settings.tax_rate,
        card_surcharge_rate = %settings.card_surcharge_rate,
        tiers = settings.loyalty.tiers.len(),
        "Pricing updated"
    );
    config.set_pricing(settings);
    Ok(get_config(config))
}
