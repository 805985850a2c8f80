//! # Database State
//!
//! The `Database` from `mostrador-db` wraps a `SqlitePool`, so commands run
//! queries concurrently without extra locking.

use mostrador_db::Database;

#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// ```rust,ignore
    /// let products = db_state.inner().products().search(tenant, "yerba", 20).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
