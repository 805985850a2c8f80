//! # Configuration State
//!
//! Store identity and pricing settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Pricing settings saved in the database (`update_pricing`)
//! 2. Environment variables (`MOSTRADOR_*`)
//! 3. Defaults (this file)
//!
//! Store identity is fixed for the life of the process. Pricing settings can
//! change through `update_pricing`, so they sit behind an `RwLock`.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use mostrador_core::checkout::PricingSettings;
use mostrador_core::{CheckoutContext, Percentage, DEFAULT_TENANT_ID};

/// Who and where this register is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub tenant_id: String,

    /// Store name (printed on receipts)
    pub store_name: String,

    /// Store address lines (for receipts)
    pub store_address: Vec<String>,

    /// Register id; its last two characters go into receipt numbers
    pub device_id: String,

    /// Cashier recorded on sales
    pub user_id: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    pub currency_symbol: String,

    pub currency_decimals: u8,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            store_name: "Mostrador Dev Store".to_string(),
            store_address: vec![
                "Av. Corrientes 1234".to_string(),
                "C1043 CABA".to_string(),
            ],
            device_id: "register-01".to_string(),
            user_id: "cashier".to_string(),
            currency_code: "ARS".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
        }
    }
}

#[derive(Debug)]
pub struct ConfigState {
    store: StoreConfig,
    db_path: Option<PathBuf>,
    pricing: RwLock<PricingSettings>,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState::new(StoreConfig::default(), PricingSettings::default(), None)
    }
}

impl ConfigState {
    pub fn new(store: StoreConfig, pricing: PricingSettings, db_path: Option<PathBuf>) -> Self {
        ConfigState {
            store,
            db_path,
            pricing: RwLock::new(pricing),
        }
    }

    /// Defaults overridden by the process environment.
    ///
    /// ## Environment Variables
    /// - `MOSTRADOR_TENANT_ID`, `MOSTRADOR_STORE_NAME`, `MOSTRADOR_DEVICE_ID`,
    ///   `MOSTRADOR_USER_ID`
    /// - `MOSTRADOR_TAX_RATE`: percent, e.g. `"21"` or `"10.5"`
    /// - `MOSTRADOR_CARD_SURCHARGE_RATE`: percent per installment, e.g. `"5"`
    /// - `MOSTRADOR_DB_PATH`: database file
    pub fn from_env() -> Self {
        ConfigState::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut store = StoreConfig::default();
        let mut pricing = PricingSettings::default();

        if let Some(tenant_id) = lookup("MOSTRADOR_TENANT_ID") {
            store.tenant_id = tenant_id;
        }
        if let Some(store_name) = lookup("MOSTRADOR_STORE_NAME") {
            store.store_name = store_name;
        }
        if let Some(device_id) = lookup("MOSTRADOR_DEVICE_ID") {
            store.device_id = device_id;
        }
        if let Some(user_id) = lookup("MOSTRADOR_USER_ID") {
            store.user_id = user_id;
        }
        if let Some(rate) = lookup("MOSTRADOR_TAX_RATE").and_then(|s| parse_rate(&s)) {
            pricing.tax_rate = rate;
        }
        if let Some(rate) = lookup("MOSTRADOR_CARD_SURCHARGE_RATE").and_then(|s| parse_rate(&s)) {
            pricing.card_surcharge_rate = rate;
        }
        let db_path = lookup("MOSTRADOR_DB_PATH").map(PathBuf::from);

        ConfigState::new(store, pricing, db_path)
    }

    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    pub fn tenant_id(&self) -> &str {
        &self.store.tenant_id
    }

    /// Explicit database path, if one was configured.
    pub fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    pub fn context(&self) -> CheckoutContext {
        CheckoutContext::new(
            self.store.tenant_id.clone(),
            self.store.user_id.clone(),
            self.store.device_id.clone(),
        )
    }

    /// Current pricing settings (copied out, the lock is not held).
    pub fn pricing(&self) -> PricingSettings {
        self.pricing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_pricing(&self, settings: PricingSettings) {
        *self.pricing.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Formats cents as `$ 1.234,56`.
    pub fn format_currency(&self, cents: i64) -> String {
        let decimals = u32::from(self.store.currency_decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = (cents / divisor).unsigned_abs().to_string();
        let frac = (cents % divisor).abs();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        let sign = if cents < 0 { "-" } else { "" };
        if decimals == 0 {
            format!("{}{} {}", sign, self.store.currency_symbol, grouped)
        } else {
            format!(
                "{}{} {},{:0width$}",
                sign,
                self.store.currency_symbol,
                grouped,
                frac,
                width = decimals as usize
            )
        }
    }
}

/// Parses a percent such as `"21"` or `"10,5"`.
fn parse_rate(raw: &str) -> Option<Percentage> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .map(Percentage::from_percentage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(1234), "$ 12,34");
        assert_eq!(config.format_currency(100), "$ 1,00");
        assert_eq!(config.format_currency(1), "$ 0,01");
        assert_eq!(config.format_currency(0), "$ 0,00");
        assert_eq!(config.format_currency(11_774), "$ 117,74");
        assert_eq!(config.format_currency(123_456_789), "$ 1.234.567,89");
        assert_eq!(config.format_currency(-150_000), "-$ 1.500,00");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("MOSTRADOR_TENANT_ID", "tenant-9"),
            ("MOSTRADOR_DEVICE_ID", "caja-03"),
            ("MOSTRADOR_TAX_RATE", "10,5"),
            ("MOSTRADOR_CARD_SURCHARGE_RATE", "5"),
            ("MOSTRADOR_DB_PATH", "/tmp/mostrador.db"),
        ]
        .into_iter()
        .collect();

        let config = ConfigState::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.tenant_id(), "tenant-9");
        assert_eq!(config.context().device_id, "caja-03");
        assert_eq!(config.pricing().tax_rate, Percentage::from_bps(1050));
        assert_eq!(config.pricing().card_surcharge_rate, Percentage::from_bps(500));
        assert_eq!(config.db_path(), Some(&PathBuf::from("/tmp/mostrador.db")));
        assert_eq!(config.store().store_name, "Mostrador Dev Store");
    }

    #[test]
    fn test_unparseable_rate_keeps_default() {
        let config = ConfigState::from_lookup(|k| {
            (k == "MOSTRADOR_TAX_RATE").then(|| "veintiuno".to_string())
        });
        assert_eq!(config.pricing().tax_rate, Percentage::zero());
    }
}
