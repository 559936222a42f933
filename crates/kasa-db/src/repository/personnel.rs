//! # Personnel Repository
//!
//! Employees and their payroll ledger.
//!
//! Ledger writes follow the same discipline as customer balances: the
//! transaction row and the running-balance bump land in one database
//! transaction, and the balance always equals Σdebit − Σcredit of the
//! rows (the ledger tests assert this).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasa_core::payroll::{balance_delta, debit_credit};
use kasa_core::{Money, Personnel, PersonnelTransaction, TransactionKind};

/// Columns selected for [`Personnel`] rows.
const PERSONNEL_COLUMNS: &str = "id, branch_id, name, title, salary_kurus, \
     current_balance_kurus, is_active, created_at, updated_at";

/// Columns selected for [`PersonnelTransaction`] rows.
const TRANSACTION_COLUMNS: &str =
    "id, personnel_id, branch_id, kind, debit_kurus, credit_kurus, description, created_at";

/// Repository for personnel database operations.
#[derive(Debug, Clone)]
pub struct PersonnelRepository {
    pool: SqlitePool,
}

impl PersonnelRepository {
    /// Creates a new PersonnelRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PersonnelRepository { pool }
    }

    /// Lists a branch's active personnel by name.
    pub async fn list(&self, branch_id: &str) -> DbResult<Vec<Personnel>> {
        let sql = format!(
            "SELECT {PERSONNEL_COLUMNS} FROM personnel
             WHERE branch_id = ?1 AND is_active = 1
             ORDER BY name"
        );

        let personnel = sqlx::query_as::<_, Personnel>(&sql)
            .bind(branch_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(personnel)
    }

    /// Gets an employee by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Personnel>> {
        let sql = format!("SELECT {PERSONNEL_COLUMNS} FROM personnel WHERE id = ?1");

        let personnel = sqlx::query_as::<_, Personnel>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(personnel)
    }

    /// Inserts a new employee.
    pub async fn insert(&self, personnel: &Personnel) -> DbResult<Personnel> {
        debug!(name = %personnel.name, "Inserting personnel");

        sqlx::query(
            "INSERT INTO personnel (
                id, branch_id, name, title, salary_kurus,
                current_balance_kurus, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&personnel.id)
        .bind(&personnel.branch_id)
        .bind(&personnel.name)
        .bind(&personnel.title)
        .bind(personnel.salary_kurus)
        .bind(personnel.current_balance_kurus)
        .bind(personnel.is_active)
        .bind(personnel.created_at)
        .bind(personnel.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(personnel.clone())
    }

    /// Records a ledger transaction and bumps the running balance in
    /// one database transaction.
    ///
    /// The debit/credit pair and the signed balance delta both come
    /// from [`kasa_core::payroll`], so the stored balance and the sum
    /// over the rows cannot disagree.
    pub async fn record_transaction(
        &self,
        personnel_id: &str,
        kind: TransactionKind,
        amount: Money,
        description: Option<String>,
    ) -> DbResult<PersonnelTransaction> {
        let (debit, credit) = debit_credit(kind, amount).map_err(DbError::Rule)?;
        let delta = balance_delta(kind, amount).map_err(DbError::Rule)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let branch_id: Option<String> =
            sqlx::query_scalar("SELECT branch_id FROM personnel WHERE id = ?1 AND is_active = 1")
                .bind(personnel_id)
                .fetch_optional(&mut *tx)
                .await?;

        let branch_id = branch_id.ok_or_else(|| DbError::not_found("Personnel", personnel_id))?;

        let transaction = PersonnelTransaction {
            id: Uuid::new_v4().to_string(),
            personnel_id: personnel_id.to_string(),
            branch_id,
            kind,
            debit_kurus: debit.kurus(),
            credit_kurus: credit.kurus(),
            description,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO personnel_transactions (
                id, personnel_id, branch_id, kind,
                debit_kurus, credit_kurus, description, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&transaction.id)
        .bind(&transaction.personnel_id)
        .bind(&transaction.branch_id)
        .bind(transaction.kind)
        .bind(transaction.debit_kurus)
        .bind(transaction.credit_kurus)
        .bind(&transaction.description)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE personnel SET
                current_balance_kurus = current_balance_kurus + ?2,
                updated_at = ?3
             WHERE id = ?1",
        )
        .bind(personnel_id)
        .bind(delta.kurus())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            personnel_id = %personnel_id,
            kind = ?kind,
            amount = %amount,
            "Personnel transaction recorded"
        );

        Ok(transaction)
    }

    /// Lists an employee's ledger rows, oldest first.
    pub async fn ledger(&self, personnel_id: &str) -> DbResult<Vec<PersonnelTransaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM personnel_transactions
             WHERE personnel_id = ?1
             ORDER BY created_at"
        );

        let entries = sqlx::query_as::<_, PersonnelTransaction>(&sql)
            .bind(personnel_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}

/// Helper to generate a new personnel ID.
pub fn generate_personnel_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasa_core::{LedgerSummary, DEFAULT_BRANCH_ID};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_employee(db: &Database) -> Personnel {
        let now = Utc::now();
        let employee = Personnel {
            id: generate_personnel_id(),
            branch_id: DEFAULT_BRANCH_ID.to_string(),
            name: "Fatma Kaya".to_string(),
            title: Some("Kasiyer".to_string()),
            salary_kurus: 2_500_000,
            current_balance_kurus: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.personnel().insert(&employee).await.unwrap();
        employee
    }

    #[tokio::test]
    async fn test_record_transaction_updates_balance() {
        let db = test_db().await;
        let repo = db.personnel();
        let employee = seed_employee(&db).await;

        // Advance of ₺2000: employee owes the shop
        repo.record_transaction(
            &employee.id,
            TransactionKind::Advance,
            Money::from_kurus(200_000),
            None,
        )
        .await
        .unwrap();

        let fetched = repo.get_by_id(&employee.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_balance_kurus, 200_000);

        // Accrual of ₺1500 covers part of it
        repo.record_transaction(
            &employee.id,
            TransactionKind::Accrual,
            Money::from_kurus(150_000),
            Some("mart hakedişi".to_string()),
        )
        .await
        .unwrap();

        let fetched = repo.get_by_id(&employee.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_balance_kurus, 50_000);
    }

    /// The stored running balance and the sum over the ledger rows must
    /// always agree.
    #[tokio::test]
    async fn test_stored_balance_matches_ledger_sum() {
        let db = test_db().await;
        let repo = db.personnel();
        let employee = seed_employee(&db).await;

        let entries = [
            (TransactionKind::Advance, 200_000),
            (TransactionKind::Accrual, 150_000),
            (TransactionKind::Deduction, 10_000),
            (TransactionKind::Payment, 140_000),
        ];
        for (kind, amount) in entries {
            repo.record_transaction(&employee.id, kind, Money::from_kurus(amount), None)
                .await
                .unwrap();
        }

        let ledger = repo.ledger(&employee.id).await.unwrap();
        assert_eq!(ledger.len(), 4);

        let summary = LedgerSummary::from_entries(&ledger);
        let stored = repo.get_by_id(&employee.id).await.unwrap().unwrap();
        assert_eq!(summary.balance_kurus, stored.current_balance_kurus);
    }

    #[tokio::test]
    async fn test_unknown_employee_rejected() {
        let db = test_db().await;
        let repo = db.personnel();

        let err = repo
            .record_transaction(
                "missing",
                TransactionKind::Advance,
                Money::from_kurus(100),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_nonpositive_amount_rejected() {
        let db = test_db().await;
        let repo = db.personnel();
        let employee = seed_employee(&db).await;

        let err = repo
            .record_transaction(&employee.id, TransactionKind::Payment, Money::zero(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(_)));
    }

    #[tokio::test]
    async fn test_list_excludes_inactive() {
        let db = test_db().await;
        let repo = db.personnel();
        let employee = seed_employee(&db).await;

        assert_eq!(repo.list(DEFAULT_BRANCH_ID).await.unwrap().len(), 1);

        sqlx::query("UPDATE personnel SET is_active = 0 WHERE id = ?1")
            .bind(&employee.id)
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(repo.list(DEFAULT_BRANCH_ID).await.unwrap().len(), 0);
    }
}
