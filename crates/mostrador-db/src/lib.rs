//! # mostrador-db: Database Layer for Mostrador POS
//!
//! Local SQLite storage for the register, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Register command (complete_sale)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  mostrador-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ Product        │   │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ Customer       │   │ 001_initial  │   │   │
//! │  │   │               │    │ Sale  Settings │   │ 002_pricing  │   │   │
//! │  │   │               │    │ SyncOutbox     │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file in the platform data dir (or MOSTRADOR_DB_PATH)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mostrador_db::{Database, DbConfig};
//!
//! # async fn demo() -> Result<(), mostrador_db::DbError> {
//! let db = Database::new(DbConfig::new("register.db")).await?;
//! let products = db.products().search(mostrador_core::DEFAULT_TENANT_ID, "yerba", 20).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::SettingsRepository;
pub use repository::sync::SyncOutboxRepository;

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use chrono::Utc;
    use mostrador_core::{Customer, Product, DEFAULT_TENANT_ID};
    use uuid::Uuid;

    use crate::{Database, DbConfig};

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn product(sku: &str, name: &str, price_cents: i64, stock: Option<i64>) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            sku: sku.to_string(),
            barcode: None,
            name: name.to_string(),
            description: None,
            price_cents,
            cost_cents: None,
            track_inventory: stock.is_some(),
            allow_negative_stock: false,
            current_stock: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
            sync_version: 0,
        }
    }

    pub fn customer(name: &str, points: i64) -> Customer {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: name.to_string(),
            document_id: None,
            email: None,
            phone: None,
            loyalty_points: points,
            lifetime_spend_cents: 0,
            credit_limit_cents: None,
            credit_balance_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
            sync_version: 0,
        }
    }
}
