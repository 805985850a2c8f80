//! # State Module
//!
//! Register state, split by concern so each command takes only what it
//! touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │                        AppState (ipc::dispatch)                         │
//! │          ┌──────────────────┼──────────────────┐                        │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌────────────────┐  ┌──────────────────┐            │
//! │  │   DbState    │  │ CheckoutState  │  │   ConfigState    │            │
//! │  │              │  │                │  │                  │            │
//! │  │  Database    │  │  Mutex<        │  │  store identity  │            │
//! │  │  (SQLite     │  │   Checkout +   │  │  RwLock<Pricing  │            │
//! │  │   pool)      │  │   sale id>     │  │    Settings>     │            │
//! │  └──────────────┘  └────────────────┘  └──────────────────┘            │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: the pool is shared and thread-safe                         │
//! │  • CheckoutState: one lock, never held across an await                 │
//! │  • ConfigState: store fields fixed; pricing behind an RwLock           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod checkout;
mod config;
mod db;

pub use checkout::CheckoutState;
pub use config::{ConfigState, StoreConfig};
pub use db::DbState;

use mostrador_db::Database;

/// Everything the dispatcher hands out to commands.
#[derive(Debug)]
pub struct AppState {
    pub db: DbState,
    pub checkout: CheckoutState,
    pub config: ConfigState,
}

impl AppState {
    pub fn new(db: Database, config: ConfigState) -> Self {
        AppState {
            db: DbState::new(db),
            checkout: CheckoutState::new(),
            config,
        }
    }
}
