//! # Sync Outbox Repository
//!
//! Queue of local changes waiting to be uploaded to the backend.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale / void_sale                                                │
//! │  ┌─────────────────────── SINGLE TRANSACTION ────────────────────────┐  │
//! │  │  write sale rows, stock, customer                                 │  │
//! │  │  INSERT INTO sync_outbox ('SALE' | 'SALE_VOID', id, <JSON>)       │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │       │ COMMIT: both or neither                                        │
//! │       ▼                                                                 │
//! │  uploader (outside this workspace)                                      │
//! │    get_pending ─► send ─► mark_synced | mark_failed (attempts + 1)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mostrador_core::SyncOutboxEntry;

/// Outbox entity types.
pub const ENTITY_SALE: &str = "SALE";
pub const ENTITY_SALE_VOID: &str = "SALE_VOID";
pub const ENTITY_SETTINGS: &str = "SETTINGS";

#[derive(Debug, Clone)]
pub struct SyncOutboxRepository {
    pool: SqlitePool,
}

impl SyncOutboxRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SyncOutboxRepository { pool }
    }

    /// Queues an entity for upload outside of any other write.
    pub async fn queue_for_sync(
        &self,
        tenant_id: &str,
        entity_type: &str,
        entity_id: &str,
        payload: &str,
    ) -> DbResult<SyncOutboxEntry> {
        let mut conn = self.pool.acquire().await?;
        queue_in(&mut conn, tenant_id, entity_type, entity_id, payload).await
    }

    /// Entries not yet uploaded, oldest first.
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<SyncOutboxEntry>> {
        let entries = sqlx::query_as::<_, SyncOutboxEntry>(
            r#"
            SELECT id, tenant_id, entity_type, entity_id, payload,
                   attempts, last_error, created_at, attempted_at, synced_at
            FROM sync_outbox
            WHERE synced_at IS NULL
            ORDER BY created_at ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn mark_synced(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE sync_outbox SET synced_at = ?2, attempted_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outbox entry", id));
        }
        Ok(())
    }

    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sync_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outbox entry", id));
        }
        Ok(())
    }

    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sync_outbox WHERE synced_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes entries uploaded more than `days_old` days ago.
    pub async fn cleanup_old_entries(&self, days_old: u32) -> DbResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(days_old));

        let result = sqlx::query(
            "DELETE FROM sync_outbox WHERE synced_at IS NOT NULL AND synced_at < ?1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Inserts an outbox row on an existing connection or transaction.
pub(crate) async fn queue_in(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    entity_type: &str,
    entity_id: &str,
    payload: &str,
) -> DbResult<SyncOutboxEntry> {
    debug!(entity_type = %entity_type, entity_id = %entity_id, "Queuing for sync");

    let entry = SyncOutboxEntry {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        payload: payload.to_string(),
        attempts: 0,
        last_error: None,
        created_at: Utc::now(),
        attempted_at: None,
        synced_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO sync_outbox (
            id, tenant_id, entity_type, entity_id, payload,
            attempts, last_error, created_at, attempted_at, synced_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.tenant_id)
    .bind(&entry.entity_type)
    .bind(&entry.entity_id)
    .bind(&entry.payload)
    .bind(entry.attempts)
    .bind(&entry.last_error)
    .bind(entry.created_at)
    .bind(entry.attempted_at)
    .bind(entry.synced_at)
    .execute(&mut *conn)
    .await?;

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::db;
    use mostrador_core::DEFAULT_TENANT_ID;

    #[tokio::test]
    async fn test_queue_and_mark() {
        let db = db().await;
        let outbox = db.sync_outbox();

        let first = outbox
            .queue_for_sync(DEFAULT_TENANT_ID, ENTITY_SETTINGS, "t-1", "{}")
            .await
            .unwrap();
        outbox
            .queue_for_sync(DEFAULT_TENANT_ID, ENTITY_SETTINGS, "t-2", "{}")
            .await
            .unwrap();
        assert_eq!(outbox.count_pending().await.unwrap(), 2);

        outbox.mark_failed(&first.id, "backend unreachable").await.unwrap();
        let pending = outbox.get_pending(10).await.unwrap();
        assert_eq!(pending[0].attempts, 1);
        assert_eq!(pending[0].last_error.as_deref(), Some("backend unreachable"));

        outbox.mark_synced(&first.id).await.unwrap();
        assert_eq!(outbox.count_pending().await.unwrap(), 1);

        // Synced just now, not old enough to clean up
        assert_eq!(outbox.cleanup_old_entries(7).await.unwrap(), 0);
        assert!(outbox.mark_synced("missing").await.is_err());
    }
}
