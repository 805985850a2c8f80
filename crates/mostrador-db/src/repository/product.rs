//! # Product Repository
//!
//! Catalog lookups for the register and stock maintenance.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types: "mate"                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%mate%' over sku, name, barcode (active products only)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  exact sku / barcode hit first (scanner), then by name                 │
//! │                                                                         │
//! │  MATE-500   | Yerba Mate 500g   ← exact SKU                            │
//! │  MATE-1K    | Yerba Mate 1kg                                           │
//! │  BOMB-01    | Bombilla mate                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{like_pattern, PRODUCT_COLUMNS};
use crate::error::{DbError, DbResult};
use mostrador_core::validation::{validate_name, validate_sku};
use mostrador_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by SKU, name or barcode.
    ///
    /// An empty query lists active products by name.
    pub async fn search(&self, tenant_id: &str, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(tenant_id, limit).await;
        }

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE tenant_id = ?1
              AND is_active = 1
              AND (sku LIKE ?2 ESCAPE '\' OR name LIKE ?2 ESCAPE '\' OR barcode LIKE ?2 ESCAPE '\')
            ORDER BY CASE WHEN sku = ?3 COLLATE NOCASE OR barcode = ?3 THEN 0 ELSE 1 END, name
            LIMIT ?4
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .bind(like_pattern(query))
            .bind(query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Active products sorted by name.
    pub async fn list_active(&self, tenant_id: &str, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE tenant_id = ?1 AND is_active = 1 ORDER BY name LIMIT ?2"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn get_by_sku(&self, tenant_id: &str, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE tenant_id = ?1 AND sku = ?2");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a product. Duplicate SKU for the tenant → `UniqueViolation`;
    /// a malformed SKU or empty name → `Rejected(Validation)`.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");
        validate_sku(&product.sku).map_err(|e| DbError::Rejected(e.into()))?;
        validate_name("name", &product.name).map_err(|e| DbError::Rejected(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, sku, barcode, name, description,
                price_cents, cost_cents,
                track_inventory, allow_negative_stock, current_stock,
                is_active, created_at, updated_at, sync_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.track_inventory)
        .bind(product.allow_negative_stock)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.sync_version)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: product.sku.clone(),
            },
            other => other,
        })?;

        Ok(product.clone())
    }

    /// Updates catalog fields. Stock is only changed through `update_stock`.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                barcode = ?3,
                name = ?4,
                description = ?5,
                price_cents = ?6,
                cost_cents = ?7,
                track_inventory = ?8,
                allow_negative_stock = ?9,
                is_active = ?10,
                updated_at = ?11,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.track_inventory)
        .bind(product.allow_negative_stock)
        .bind(product.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Changes stock by `delta` (negative for sales, positive for restocking).
    ///
    /// Always a relative update, so concurrent writers add up instead of
    /// overwriting each other.
    pub async fn update_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Updating stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = COALESCE(current_stock, 0) + ?2,
                updated_at = ?3,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hides a product from search; past sales keep referencing it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0,
                updated_at = ?2,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Active products for the tenant.
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1 AND is_active = 1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use crate::test_support::{db, product};
    use crate::DbError;
    use mostrador_core::DEFAULT_TENANT_ID;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let yerba = product("MATE-500", "Yerba Mate 500g", 2_450, Some(10));
        db.products().insert(&yerba).await.unwrap();

        let by_id = db.products().get_by_id(&yerba.id).await.unwrap().unwrap();
        assert_eq!(by_id.sku, "MATE-500");
        assert_eq!(by_id.price_cents, 2_450);
        assert!(by_id.track_inventory);

        let by_sku = db
            .products()
            .get_by_sku(DEFAULT_TENANT_ID, "MATE-500")
            .await
            .unwrap();
        assert_eq!(by_sku.map(|p| p.id), Some(yerba.id));
    }

    #[tokio::test]
    async fn test_malformed_sku_rejected() {
        let db = db().await;
        let err = db
            .products()
            .insert(&product("MATE 500", "Yerba Mate 500g", 2_450, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(mostrador_core::CoreError::Validation(_))));
        assert!(db.products().list_active(DEFAULT_TENANT_ID, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = db().await;
        db.products()
            .insert(&product("MATE-500", "Yerba Mate 500g", 2_450, None))
            .await
            .unwrap();

        let err = db
            .products()
            .insert(&product("MATE-500", "Otra yerba", 2_000, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "MATE-500"));
    }

    #[tokio::test]
    async fn test_search_ranks_exact_sku_first() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&product("BOMB-01", "Bombilla mate", 1_500, None)).await.unwrap();
        repo.insert(&product("MATE", "Mate de calabaza", 4_000, None)).await.unwrap();
        repo.insert(&product("AZU-1K", "Azúcar 1kg", 1_100, None)).await.unwrap();

        let results = repo.search(DEFAULT_TENANT_ID, "mate", 10).await.unwrap();
        let skus: Vec<_> = results.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["MATE", "BOMB-01"]);

        let all = repo.search(DEFAULT_TENANT_ID, "  ", 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&product("PROMO-1", "Promo 50% off", 500, None)).await.unwrap();
        repo.insert(&product("PROMO-2", "Promo 500g", 500, None)).await.unwrap();

        let results = repo.search(DEFAULT_TENANT_ID, "50%", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].sku, "PROMO-1");
    }

    #[tokio::test]
    async fn test_update_stock_and_soft_delete() {
        let db = db().await;
        let repo = db.products();
        let p = product("MATE-500", "Yerba Mate 500g", 2_450, Some(10));
        repo.insert(&p).await.unwrap();

        repo.update_stock(&p.id, -3).await.unwrap();
        repo.update_stock(&p.id, -2).await.unwrap();
        let stored = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, Some(5));
        assert_eq!(stored.sync_version, 2);

        repo.soft_delete(&p.id).await.unwrap();
        assert_eq!(repo.count(DEFAULT_TENANT_ID).await.unwrap(), 0);
        assert!(repo.search(DEFAULT_TENANT_ID, "mate", 10).await.unwrap().is_empty());

        assert!(matches!(
            repo.update_stock("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_product() {
        let db = db().await;
        let repo = db.products();
        let mut p = product("MATE-500", "Yerba Mate 500g", 2_450, None);
        repo.insert(&p).await.unwrap();

        p.price_cents = 2_700;
        p.name = "Yerba Mate 500g Suave".to_string();
        repo.update(&p).await.unwrap();

        let stored = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(stored.price_cents, 2_700);
        assert_eq!(stored.name, "Yerba Mate 500g Suave");
    }
}
