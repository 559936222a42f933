//! # Customer Repository
//!
//! Database operations for customers and their running credit balances.
//!
//! ## Balance Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current_balance_kurus is a denormalized counter. It moves in           │
//! │  exactly two places, both atomic, both transactional:                   │
//! │                                                                         │
//! │   +  credit portion of a checkout   (SaleRepository::commit, same      │
//! │      transaction as the sale row, limit enforced in the UPDATE)        │
//! │   −  record_payment below           (same transaction as the income    │
//! │      cash movement it creates)                                         │
//! │                                                                         │
//! │  There is no fetch-modify-send path anywhere.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasa_core::{CoreError, Customer, Money};

/// Columns selected for [`Customer`] rows.
const CUSTOMER_COLUMNS: &str = "id, branch_id, name, phone, current_balance_kurus, \
     credit_limit_kurus, is_active, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Searches customers of a branch by name or phone.
    ///
    /// Empty query lists active customers by name.
    pub async fn search(&self, branch_id: &str, query: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let query = query.trim();

        debug!(branch_id = %branch_id, query = %query, "Searching customers");

        if query.is_empty() {
            let sql = format!(
                "SELECT {CUSTOMER_COLUMNS}
                 FROM customers
                 WHERE branch_id = ?1 AND is_active = 1
                 ORDER BY name
                 LIMIT ?2"
            );
            let customers = sqlx::query_as::<_, Customer>(&sql)
                .bind(branch_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
            return Ok(customers);
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS}
             FROM customers
             WHERE branch_id = ?1 AND is_active = 1
               AND (name LIKE ?2 OR phone LIKE ?2)
             ORDER BY name
             LIMIT ?3"
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(branch_id)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(name = %customer.name, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (
                id, branch_id, name, phone,
                current_balance_kurus, credit_limit_kurus,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&customer.id)
        .bind(&customer.branch_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.current_balance_kurus)
        .bind(customer.credit_limit_kurus)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    /// Updates a customer's editable fields (name, phone, limit, active).
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET
                name = ?2, phone = ?3, credit_limit_kurus = ?4,
                is_active = ?5, updated_at = ?6
             WHERE id = ?1",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.credit_limit_kurus)
        .bind(customer.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Records a balance payment from the customer.
    ///
    /// One transaction: atomic balance decrement + the `income` cash
    /// movement that puts the money in the drawer. The payment may
    /// exceed the balance (prepayment), which leaves the balance
    /// negative; the shop then owes the customer.
    ///
    /// ## Returns
    /// The customer's balance after the payment, in kuruş.
    pub async fn record_payment(
        &self,
        customer_id: &str,
        amount: Money,
        date: NaiveDate,
        created_by: &str,
    ) -> DbResult<i64> {
        if !amount.is_positive() {
            return Err(DbError::Rule(CoreError::InvalidPaymentAmount {
                reason: "payment amount must be positive".to_string(),
            }));
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE customers SET
                current_balance_kurus = current_balance_kurus - ?2,
                updated_at = ?3
             WHERE id = ?1",
        )
        .bind(customer_id)
        .bind(amount.kurus())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }

        let branch_id: String =
            sqlx::query_scalar("SELECT branch_id FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            "INSERT INTO cash_movements (
                id, branch_id, movement_date, movement_type, method,
                amount_kurus, sale_id, description, created_by, created_at
            ) VALUES (?1, ?2, ?3, 'income', NULL, ?4, NULL, ?5, ?6, ?7)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&branch_id)
        .bind(date)
        .bind(amount.kurus())
        .bind(format!("Customer balance payment ({})", customer_id))
        .bind(created_by)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let balance: i64 =
            sqlx::query_scalar("SELECT current_balance_kurus FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        info!(customer_id = %customer_id, amount = %amount, balance = %balance, "Customer payment recorded");

        Ok(balance)
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasa_core::DEFAULT_BRANCH_ID;

    fn customer(name: &str, limit_kurus: i64) -> Customer {
        let now = Utc::now();
        Customer {
            id: generate_customer_id(),
            branch_id: DEFAULT_BRANCH_ID.to_string(),
            name: name.to_string(),
            phone: Some("05551112233".to_string()),
            current_balance_kurus: 0,
            credit_limit_kurus: limit_kurus,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_search() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&customer("Ahmet Yılmaz", 100_000)).await.unwrap();
        repo.insert(&customer("Mehmet Demir", 50_000)).await.unwrap();

        let hits = repo.search(DEFAULT_BRANCH_ID, "mehmet", 20).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = repo.search(DEFAULT_BRANCH_ID, "0555", 20).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_record_payment_lowers_balance_and_logs_income() {
        let db = test_db().await;
        let repo = db.customers();

        // Seed an outstanding balance; normally the checkout commit is
        // the only writer of this column.
        let mut c = customer("Ahmet Yılmaz", 100_000);
        c.current_balance_kurus = 20_000;
        repo.insert(&c).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let balance = repo
            .record_payment(&c.id, Money::from_kurus(15_000), date, "user-1")
            .await
            .unwrap();

        assert_eq!(balance, 5_000);

        let movement_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cash_movements WHERE movement_type = 'income'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(movement_count, 1);
    }

    #[tokio::test]
    async fn test_record_payment_rejects_nonpositive() {
        let db = test_db().await;
        let repo = db.customers();

        let c = customer("Ahmet", 0);
        repo.insert(&c).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let err = repo
            .record_payment(&c.id, Money::zero(), date, "user-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(_)));
    }

    #[tokio::test]
    async fn test_record_payment_unknown_customer() {
        let db = test_db().await;
        let repo = db.customers();

        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let err = repo
            .record_payment("missing", Money::from_kurus(100), date, "user-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
