//! # Settings Repository
//!
//! Per-tenant [`PricingSettings`] stored as one JSON document. Saving queues
//! a `SETTINGS` outbox entry so other registers of the tenant can pick the
//! change up.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::sync::{queue_in, ENTITY_SETTINGS};
use crate::error::{DbError, DbResult};
use mostrador_core::checkout::PricingSettings;

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Stored settings for the tenant, `None` if never saved.
    pub async fn get(&self, tenant_id: &str) -> DbResult<Option<PricingSettings>> {
        let json: Option<String> =
            sqlx::query_scalar("SELECT settings_json FROM pricing_settings WHERE tenant_id = ?1")
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;

        json.map(|j| serde_json::from_str(&j).map_err(DbError::from))
            .transpose()
    }

    /// Validates and stores the settings, replacing any previous version.
    pub async fn upsert(&self, tenant_id: &str, settings: &PricingSettings) -> DbResult<()> {
        settings.validate()?;
        debug!(tenant_id = %tenant_id, "Saving pricing settings");

        let json = serde_json::to_string(settings)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pricing_settings (tenant_id, settings_json, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (tenant_id) DO UPDATE SET
                settings_json = excluded.settings_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(&json)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        queue_in(&mut tx, tenant_id, ENTITY_SETTINGS, tenant_id, &json).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            tenant_id = %tenant_id,
            tax_rate = %settings.tax_rate,
            card_surcharge_rate = %settings.card_surcharge_rate,
            "Pricing settings saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::db;
    use mostrador_core::checkout::DiscountPolicy;
    use mostrador_core::{CoreError, Percentage, DEFAULT_TENANT_ID};

    #[tokio::test]
    async fn test_missing_then_upsert() {
        let db = db().await;
        let repo = db.settings();
        assert!(repo.get(DEFAULT_TENANT_ID).await.unwrap().is_none());

        let mut settings = PricingSettings {
            tax_rate: Percentage::from_bps(2100),
            card_surcharge_rate: Percentage::from_bps(500),
            ..PricingSettings::default()
        };
        repo.upsert(DEFAULT_TENANT_ID, &settings).await.unwrap();
        assert_eq!(repo.get(DEFAULT_TENANT_ID).await.unwrap(), Some(settings.clone()));

        settings.discount_policy = DiscountPolicy::Uncapped;
        repo.upsert(DEFAULT_TENANT_ID, &settings).await.unwrap();
        let stored = repo.get(DEFAULT_TENANT_ID).await.unwrap().unwrap();
        assert_eq!(stored.discount_policy, DiscountPolicy::Uncapped);

        assert_eq!(db.sync_outbox().count_pending().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected() {
        let db = db().await;
        let settings = PricingSettings {
            tax_rate: Percentage::from_bps(20_000),
            ..PricingSettings::default()
        };

        let err = db.settings().upsert(DEFAULT_TENANT_ID, &settings).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::Validation(_))));
        assert!(db.settings().get(DEFAULT_TENANT_ID).await.unwrap().is_none());
    }
}
