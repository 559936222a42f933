//! # Cash Repository
//!
//! The append-only drawer ledger and the day open/close boundary.
//!
//! ## Day Boundary Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two tills pressing "open day" at the same moment:                      │
//! │                                                                         │
//! │   till A: INSERT opening row ──────────────► ok                         │
//! │   till B: INSERT opening row ──────────────► UNIQUE violation           │
//! │                      (ux_cash_day_boundary) ► DayAlreadyRecorded        │
//! │                                                                         │
//! │  The guard is the index, not a preceding SELECT: there is no           │
//! │  window in which both inserts can succeed.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasa_core::{CashMovement, CoreError, DaySummary, Money, MovementType};

/// Columns selected for [`CashMovement`] rows.
const MOVEMENT_COLUMNS: &str = "id, branch_id, movement_date, movement_type, method, \
     amount_kurus, sale_id, description, created_by, created_at";

// =============================================================================
// Close Report
// =============================================================================

/// The reconciliation result returned by [`CashRepository::close_day`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCloseReport {
    pub date: NaiveDate,
    pub expected_kurus: i64,
    pub counted_kurus: i64,
    /// counted − expected; negative means the drawer is short.
    pub difference_kurus: i64,
}

/// Repository for cash movement operations.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    /// Creates a new CashRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// Opens the cash day with the drawer float.
    ///
    /// ## Errors
    /// [`CoreError::DayAlreadyRecorded`] if the day is already open;
    /// enforced by the unique index, so concurrent opens cannot both
    /// succeed.
    pub async fn open_day(
        &self,
        branch_id: &str,
        date: NaiveDate,
        float: Money,
        created_by: &str,
    ) -> DbResult<CashMovement> {
        if float.is_negative() {
            return Err(DbError::Rule(CoreError::InvalidPaymentAmount {
                reason: "opening float cannot be negative".to_string(),
            }));
        }

        let movement = self
            .insert_movement(
                branch_id,
                date,
                MovementType::Opening,
                float.kurus(),
                None,
                Some("Day opened".to_string()),
                created_by,
            )
            .await
            .map_err(|e| map_boundary_violation(e, "opening", date))?;

        info!(branch_id = %branch_id, date = %date, float = %float, "Cash day opened");
        Ok(movement)
    }

    /// Closes the cash day with the counted drawer amount and returns
    /// the reconciliation report.
    ///
    /// ## Errors
    /// - [`CoreError::DayNotOpened`] when there is no opening row
    /// - [`CoreError::DayAlreadyRecorded`] on a second close (unique
    ///   index, same guarantee as open)
    pub async fn close_day(
        &self,
        branch_id: &str,
        date: NaiveDate,
        counted: Money,
        created_by: &str,
    ) -> DbResult<DayCloseReport> {
        let summary = self.day_summary(branch_id, date).await?;
        if !summary.is_opened() {
            return Err(DbError::Rule(CoreError::DayNotOpened {
                date: date.to_string(),
            }));
        }

        self.insert_movement(
            branch_id,
            date,
            MovementType::Closing,
            counted.kurus(),
            None,
            Some("Day closed".to_string()),
            created_by,
        )
        .await
        .map_err(|e| map_boundary_violation(e, "closing", date))?;

        let expected = summary.expected_closing();
        let difference = counted - expected;

        info!(
            branch_id = %branch_id,
            date = %date,
            expected = %expected,
            counted = %counted,
            difference = %difference,
            "Cash day closed"
        );

        Ok(DayCloseReport {
            date,
            expected_kurus: expected.kurus(),
            counted_kurus: counted.kurus(),
            difference_kurus: difference.kurus(),
        })
    }

    /// Appends a manual income or expense movement.
    ///
    /// ## Errors
    /// Rejects non-positive amounts and non-manual movement types;
    /// openings/closings go through their guarded paths, `sale` rows
    /// only ever come from the checkout commit.
    pub async fn record_manual(
        &self,
        branch_id: &str,
        date: NaiveDate,
        movement_type: MovementType,
        amount: Money,
        description: Option<String>,
        created_by: &str,
    ) -> DbResult<CashMovement> {
        if !matches!(movement_type, MovementType::Income | MovementType::Expense) {
            return Err(DbError::Rule(CoreError::InvalidPaymentAmount {
                reason: "only income and expense movements can be recorded manually".to_string(),
            }));
        }
        if !amount.is_positive() {
            return Err(DbError::Rule(CoreError::InvalidPaymentAmount {
                reason: "movement amount must be positive".to_string(),
            }));
        }

        self.insert_movement(
            branch_id,
            date,
            movement_type,
            amount.kurus(),
            None,
            description,
            created_by,
        )
        .await
    }

    /// Lists a branch-day's movements in insertion order.
    pub async fn movements_for_day(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> DbResult<Vec<CashMovement>> {
        debug!(branch_id = %branch_id, date = %date, "Fetching movements");

        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM cash_movements
             WHERE branch_id = ?1 AND movement_date = ?2
             ORDER BY created_at"
        );

        let movements = sqlx::query_as::<_, CashMovement>(&sql)
            .bind(branch_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Derives the branch-day summary from the movement rows.
    pub async fn day_summary(&self, branch_id: &str, date: NaiveDate) -> DbResult<DaySummary> {
        let movements = self.movements_for_day(branch_id, date).await?;
        Ok(DaySummary::from_movements(date, &movements))
    }

    async fn insert_movement(
        &self,
        branch_id: &str,
        date: NaiveDate,
        movement_type: MovementType,
        amount_kurus: i64,
        sale_id: Option<String>,
        description: Option<String>,
        created_by: &str,
    ) -> DbResult<CashMovement> {
        let movement = CashMovement {
            id: Uuid::new_v4().to_string(),
            branch_id: branch_id.to_string(),
            movement_date: date,
            movement_type,
            method: None,
            amount_kurus,
            sale_id,
            description,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO cash_movements (
                id, branch_id, movement_date, movement_type, method,
                amount_kurus, sale_id, description, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&movement.id)
        .bind(&movement.branch_id)
        .bind(movement.movement_date)
        .bind(movement.movement_type)
        .bind(movement.amount_kurus)
        .bind(&movement.sale_id)
        .bind(&movement.description)
        .bind(&movement.created_by)
        .bind(movement.created_at)
        .execute(&self.pool)
        .await?;

        Ok(movement)
    }
}

/// Maps the day-boundary unique violation into its domain error.
fn map_boundary_violation(err: DbError, movement: &str, date: NaiveDate) -> DbError {
    if err.is_unique_violation() {
        DbError::Rule(CoreError::DayAlreadyRecorded {
            movement: movement.to_string(),
            date: date.to_string(),
        })
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasa_core::DEFAULT_BRANCH_ID;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    /// The reconciliation scenario end to end against real rows:
    /// opening 500 + cash sale 120 − expense 30 → expected 590;
    /// counted 585 → difference −5.00.
    #[tokio::test]
    async fn test_open_record_close_reconciles() {
        let db = test_db().await;
        let repo = db.cash();

        repo.open_day(DEFAULT_BRANCH_ID, day(), Money::from_kurus(50_000), "u1")
            .await
            .unwrap();

        // A cash sale row as the checkout commit would write it
        sqlx::query(
            "INSERT INTO cash_movements (
                id, branch_id, movement_date, movement_type, method,
                amount_kurus, sale_id, description, created_by, created_at
            ) VALUES (?1, ?2, ?3, 'sale', 'cash', 12000, NULL, NULL, 'u1', ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(DEFAULT_BRANCH_ID)
        .bind(day())
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        repo.record_manual(
            DEFAULT_BRANCH_ID,
            day(),
            MovementType::Expense,
            Money::from_kurus(3_000),
            Some("çöp poşeti".to_string()),
            "u1",
        )
        .await
        .unwrap();

        let report = repo
            .close_day(DEFAULT_BRANCH_ID, day(), Money::from_kurus(58_500), "u1")
            .await
            .unwrap();

        assert_eq!(report.expected_kurus, 59_000);
        assert_eq!(report.counted_kurus, 58_500);
        assert_eq!(report.difference_kurus, -500);
    }

    #[tokio::test]
    async fn test_double_open_rejected() {
        let db = test_db().await;
        let repo = db.cash();

        repo.open_day(DEFAULT_BRANCH_ID, day(), Money::from_kurus(10_000), "u1")
            .await
            .unwrap();

        let err = repo
            .open_day(DEFAULT_BRANCH_ID, day(), Money::from_kurus(10_000), "u1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::DayAlreadyRecorded { .. })
        ));
    }

    #[tokio::test]
    async fn test_close_requires_open() {
        let db = test_db().await;
        let repo = db.cash();

        let err = repo
            .close_day(DEFAULT_BRANCH_ID, day(), Money::from_kurus(100), "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::DayNotOpened { .. })));
    }

    #[tokio::test]
    async fn test_double_close_rejected() {
        let db = test_db().await;
        let repo = db.cash();

        repo.open_day(DEFAULT_BRANCH_ID, day(), Money::zero(), "u1")
            .await
            .unwrap();
        repo.close_day(DEFAULT_BRANCH_ID, day(), Money::zero(), "u1")
            .await
            .unwrap();

        let err = repo
            .close_day(DEFAULT_BRANCH_ID, day(), Money::zero(), "u1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::DayAlreadyRecorded { .. })
        ));
    }

    #[tokio::test]
    async fn test_days_are_independent_per_branch() {
        let db = test_db().await;
        let repo = db.cash();

        repo.open_day("branch-a", day(), Money::from_kurus(100), "u1")
            .await
            .unwrap();
        // Same date, different branch: allowed
        repo.open_day("branch-b", day(), Money::from_kurus(200), "u1")
            .await
            .unwrap();
        // Same branch, next day: allowed
        repo.open_day("branch-a", day().succ_opt().unwrap(), Money::zero(), "u1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_manual_movement_validation() {
        let db = test_db().await;
        let repo = db.cash();

        let err = repo
            .record_manual(
                DEFAULT_BRANCH_ID,
                day(),
                MovementType::Opening,
                Money::from_kurus(100),
                None,
                "u1",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(_)));

        let err = repo
            .record_manual(
                DEFAULT_BRANCH_ID,
                day(),
                MovementType::Income,
                Money::zero(),
                None,
                "u1",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(_)));
    }
}
