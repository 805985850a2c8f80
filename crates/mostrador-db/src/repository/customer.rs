//! # Customer Repository
//!
//! Customer lookup for the checkout and profile maintenance. Points,
//! lifetime spend and account balance only change inside the sale
//! transaction (see [`SaleRepository`](super::sale::SaleRepository)).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{like_pattern, CUSTOMER_COLUMNS};
use crate::error::{DbError, DbResult};
use mostrador_core::validation::validate_name;
use mostrador_core::Customer;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Active customers matching name, document, email or phone.
    pub async fn search(&self, tenant_id: &str, query: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching customers");

        let sql = format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE tenant_id = ?1
              AND is_active = 1
              AND (?2 = '%%'
                   OR name LIKE ?2 ESCAPE '\'
                   OR document_id LIKE ?2 ESCAPE '\'
                   OR email LIKE ?2 ESCAPE '\'
                   OR phone LIKE ?2 ESCAPE '\')
            ORDER BY CASE WHEN document_id = ?3 THEN 0 ELSE 1 END, name
            LIMIT ?4
            "#
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(tenant_id)
            .bind(like_pattern(query))
            .bind(query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Inserts a customer. Duplicate document for the tenant → `UniqueViolation`.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Inserting customer");
        validate_name("name", &customer.name).map_err(|e| DbError::Rejected(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, tenant_id, name, document_id, email, phone,
                loyalty_points, lifetime_spend_cents,
                credit_limit_cents, credit_balance_cents,
                is_active, created_at, updated_at, sync_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.tenant_id)
        .bind(&customer.name)
        .bind(&customer.document_id)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.loyalty_points)
        .bind(customer.lifetime_spend_cents)
        .bind(customer.credit_limit_cents)
        .bind(customer.credit_balance_cents)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .bind(customer.sync_version)
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    /// Updates profile fields and the credit limit.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                document_id = ?3,
                email = ?4,
                phone = ?5,
                credit_limit_cents = ?6,
                is_active = ?7,
                updated_at = ?8,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.document_id)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.credit_limit_cents)
        .bind(customer.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{customer, db};
    use mostrador_core::DEFAULT_TENANT_ID;

    #[tokio::test]
    async fn test_insert_get_update() {
        let db = db().await;
        let repo = db.customers();
        let mut ana = customer("Ana Gómez", 120);
        ana.document_id = Some("27123456".to_string());
        repo.insert(&ana).await.unwrap();

        let stored = repo.get_by_id(&ana.id).await.unwrap().unwrap();
        assert_eq!(stored.loyalty_points, 120);
        assert_eq!(stored.credit_limit_cents, None);

        ana.credit_limit_cents = Some(100_000);
        ana.phone = Some("+54 11 5555-0000".to_string());
        repo.update(&ana).await.unwrap();

        let stored = repo.get_by_id(&ana.id).await.unwrap().unwrap();
        assert_eq!(stored.credit_limit_cents, Some(100_000));
        // Points are not touched by profile updates
        assert_eq!(stored.loyalty_points, 120);
    }

    #[tokio::test]
    async fn test_search() {
        let db = db().await;
        let repo = db.customers();
        let mut ana = customer("Ana Gómez", 0);
        ana.document_id = Some("27123456".to_string());
        repo.insert(&ana).await.unwrap();
        repo.insert(&customer("Juan Pérez", 0)).await.unwrap();

        let by_doc = repo.search(DEFAULT_TENANT_ID, "27123456", 10).await.unwrap();
        assert_eq!(by_doc.len(), 1);
        assert_eq!(by_doc[0].name, "Ana Gómez");

        let by_name = repo.search(DEFAULT_TENANT_ID, "juan", 10).await.unwrap();
        assert_eq!(by_name.len(), 1);

        let all = repo.search(DEFAULT_TENANT_ID, "", 10).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_document_rejected() {
        let db = db().await;
        let repo = db.customers();
        let mut a = customer("Ana", 0);
        a.document_id = Some("20111".to_string());
        let mut b = customer("Otra Ana", 0);
        b.document_id = Some("20111".to_string());

        repo.insert(&a).await.unwrap();
        assert!(repo.insert(&b).await.unwrap_err().is_duplicate());
    }
}
