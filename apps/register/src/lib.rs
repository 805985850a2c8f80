//! # Mostrador Register
//!
//! The register process: local SQLite, the checkout in progress, and a
//! JSON-lines command channel to the frontend.
//!
//! ## Module Organization
//! ```text
//! mostrador_register/
//! ├── lib.rs          ◄─── Startup (logging, config, database, serve)
//! ├── ipc.rs          ◄─── Request/response envelope, dispatch, serve loop
//! ├── state/
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── checkout.rs ◄─── Checkout in progress + reserved sale id
//! │   └── config.rs   ◄─── Store identity and pricing settings
//! ├── commands/       ◄─── One module per screen area
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod ipc;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mostrador_db::{Database, DbConfig, DbError};
use state::{AppState, ConfigState};

/// Failures that stop the register from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not determine the app data directory")]
    NoDataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Runs the register until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Logging ─────────── tracing-subscriber to stderr, RUST_LOG filter  │
/// │  2. Config ──────────── defaults + MOSTRADOR_* env vars                 │
/// │  3. Database path ───── MOSTRADOR_DB_PATH or the platform data dir      │
/// │  4. Database ────────── SQLite (WAL), pending migrations applied        │
/// │  5. Pricing ─────────── settings saved in the database win over env     │
/// │  6. Serve ───────────── stdin requests → stdout responses               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), StartupError> {
    init_tracing();
    info!("Starting Mostrador register");

    let config = ConfigState::from_env();
    let db_path = database_path(&config)?;
    info!(db_path = %db_path.display(), "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    let state = open(db, config).await?;
    info!(
        tenant_id = %state.config.tenant_id(),
        device_id = %state.config.store().device_id,
        "State initialized"
    );

    ipc::serve(&state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    state.db.inner().close().await;
    Ok(())
}

/// Builds the register state over an open database, applying the
/// tenant's saved pricing settings if there are any.
pub async fn open(db: Database, config: ConfigState) -> Result<AppState, StartupError> {
    if let Some(saved) = db.settings().get(config.tenant_id()).await? {
        info!(tax_rate = %saved.tax_rate, "Using saved pricing settings");
        config.set_pricing(saved);
    }
    Ok(AppState::new(db, config))
}

/// Logs to stderr; stdout carries responses only.
///
/// - `RUST_LOG=debug`: every command
/// - `RUST_LOG=mostrador=trace`: trace for mostrador crates only
/// - default: `info,mostrador=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mostrador=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Database file location.
///
/// - `MOSTRADOR_DB_PATH` if set
/// - **Linux**: `~/.local/share/mostrador/mostrador.db`
/// - **macOS**: `~/Library/Application Support/ar.mostrador.mostrador/mostrador.db`
/// - **Windows**: `%APPDATA%\mostrador\mostrador\data\mostrador.db`
fn database_path(config: &ConfigState) -> Result<PathBuf, StartupError> {
    if let Some(path) = config.db_path() {
        return Ok(path.clone());
    }

    let dirs = ProjectDirs::from("ar", "mostrador", "mostrador").ok_or(StartupError::NoDataDir)?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("mostrador.db"))
}
