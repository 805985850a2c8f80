//! # Sync Commands
//!
//! Status of the outbox of sales and settings waiting for upload. Uploading
//! itself happens outside the register.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::DbState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusDto {
    pub pending_count: i64,
    pub oldest_pending_at: Option<DateTime<Utc>>,
    /// Attempts on the oldest entry so far.
    pub oldest_attempts: i64,
    pub last_error: Option<String>,
    pub database_healthy: bool,
}

pub async fn get_sync_status(db: &DbState) -> Result<SyncStatusDto, ApiError> {
    debug!("get_sync_status command");
    let outbox = db.inner().sync_outbox();

    let pending_count = outbox.count_pending().await?;
    let oldest = outbox.get_pending(1).await?.into_iter().next();

    Ok(SyncStatusDto {
        pending_count,
        oldest_pending_at: oldest.as_ref().map(|e| e.created_at),
        oldest_attempts: oldest.as_ref().map(|e| e.attempts).unwrap_or(0),
        last_error: oldest.and_then(|e| e.last_error),
        database_healthy: db.inner().health_check().await,
    })
}
