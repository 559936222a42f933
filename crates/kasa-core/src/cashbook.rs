//! # Cashbook Module
//!
//! Derives the daily cash-drawer summary from the append-only movement
//! ledger and computes the open/close reconciliation.
//!
//! ## Reconciliation Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Daily Drawer Reconciliation                          │
//! │                                                                         │
//! │  Movements of the day (any order):                                     │
//! │    opening 500.00 │ sale(cash) 120.00 │ expense 30.00 │ closing 585.00 │
//! │                                                                         │
//! │  Reduced by type:                                                      │
//! │    expected = opening + cash sales + income − expense                  │
//! │             = 500.00  + 120.00     + 0      − 30.00    = 590.00        │
//! │                                                                         │
//! │    difference = counted closing − expected                              │
//! │               = 585.00 − 590.00 = −5.00   (drawer is 5 lira short)     │
//! │                                                                         │
//! │  Card sales are summed separately for turnover reporting; they         │
//! │  never enter the drawer expectation (no physical cash moved).          │
//! │                                                                         │
//! │  The fold is ORDER-INDEPENDENT: the summary is identical no matter     │
//! │  how the movement rows are returned.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CashMovement, MovementType, PaymentMethod};

// =============================================================================
// Day Summary
// =============================================================================

/// The derived summary of one branch-day of drawer activity.
///
/// Never stored; always recomputed from the movement rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Day float, if the day was opened.
    pub opening_kurus: Option<i64>,
    /// Counted cash, if the day was closed.
    pub closing_kurus: Option<i64>,
    /// Cash portion of sales.
    pub cash_sales_kurus: i64,
    /// Card portion of sales (reporting only).
    pub card_sales_kurus: i64,
    /// Manual income movements.
    pub income_kurus: i64,
    /// Manual expense movements.
    pub expense_kurus: i64,
}

impl DaySummary {
    /// Reduces a day's movement rows into the summary buckets.
    ///
    /// Order-independent: a pure fold over the rows.
    pub fn from_movements(date: NaiveDate, movements: &[CashMovement]) -> Self {
        let mut summary = DaySummary {
            date,
            opening_kurus: None,
            closing_kurus: None,
            cash_sales_kurus: 0,
            card_sales_kurus: 0,
            income_kurus: 0,
            expense_kurus: 0,
        };

        for movement in movements {
            match movement.movement_type {
                MovementType::Opening => summary.opening_kurus = Some(movement.amount_kurus),
                MovementType::Closing => summary.closing_kurus = Some(movement.amount_kurus),
                MovementType::Sale => match movement.method {
                    Some(PaymentMethod::Card) => summary.card_sales_kurus += movement.amount_kurus,
                    // Legacy rows without a method are cash: only cash
                    // portions were recorded before card tracking.
                    Some(PaymentMethod::Cash) | None => {
                        summary.cash_sales_kurus += movement.amount_kurus
                    }
                },
                MovementType::Income => summary.income_kurus += movement.amount_kurus,
                MovementType::Expense => summary.expense_kurus += movement.amount_kurus,
            }
        }

        summary
    }

    /// Whether the day has an opening row.
    pub fn is_opened(&self) -> bool {
        self.opening_kurus.is_some()
    }

    /// Whether the day has a closing row.
    pub fn is_closed(&self) -> bool {
        self.closing_kurus.is_some()
    }

    /// Expected physical cash at close:
    /// `opening + cash sales + income − expense`.
    ///
    /// An unopened day contributes no float (treated as zero).
    pub fn expected_closing(&self) -> Money {
        Money::from_kurus(
            self.opening_kurus.unwrap_or(0) + self.cash_sales_kurus + self.income_kurus
                - self.expense_kurus,
        )
    }

    /// Counted minus expected. `None` until the day is closed.
    ///
    /// Negative means the drawer is short; positive means over.
    pub fn difference(&self) -> Option<Money> {
        self.closing_kurus
            .map(|counted| Money::from_kurus(counted) - self.expected_closing())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn movement(
        movement_type: MovementType,
        method: Option<PaymentMethod>,
        amount_kurus: i64,
    ) -> CashMovement {
        CashMovement {
            id: uuid::Uuid::new_v4().to_string(),
            branch_id: "b1".to_string(),
            movement_date: day(),
            movement_type,
            method,
            amount_kurus,
            sale_id: None,
            description: None,
            created_by: "u1".to_string(),
            created_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    /// Opening 500, one cash sale of 120, one expense of 30 →
    /// expected 590; counted 585 → difference −5.00.
    #[test]
    fn test_reconciliation_scenario() {
        let movements = vec![
            movement(MovementType::Opening, None, 50_000),
            movement(MovementType::Sale, Some(PaymentMethod::Cash), 12_000),
            movement(MovementType::Expense, None, 3_000),
            movement(MovementType::Closing, None, 58_500),
        ];

        let summary = DaySummary::from_movements(day(), &movements);

        assert_eq!(summary.expected_closing().kurus(), 59_000);
        assert_eq!(summary.difference().unwrap().kurus(), -500);
    }

    #[test]
    fn test_reduction_is_order_independent() {
        let mut movements = vec![
            movement(MovementType::Opening, None, 50_000),
            movement(MovementType::Sale, Some(PaymentMethod::Cash), 12_000),
            movement(MovementType::Sale, Some(PaymentMethod::Card), 8_000),
            movement(MovementType::Income, None, 2_500),
            movement(MovementType::Expense, None, 3_000),
        ];

        let forward = DaySummary::from_movements(day(), &movements);
        movements.reverse();
        let backward = DaySummary::from_movements(day(), &movements);

        assert_eq!(forward.expected_closing(), backward.expected_closing());
        assert_eq!(forward.cash_sales_kurus, backward.cash_sales_kurus);
        assert_eq!(forward.card_sales_kurus, backward.card_sales_kurus);
    }

    #[test]
    fn test_card_sales_do_not_enter_drawer_expectation() {
        let movements = vec![
            movement(MovementType::Opening, None, 10_000),
            movement(MovementType::Sale, Some(PaymentMethod::Card), 25_000),
        ];

        let summary = DaySummary::from_movements(day(), &movements);

        assert_eq!(summary.card_sales_kurus, 25_000);
        assert_eq!(summary.expected_closing().kurus(), 10_000);
    }

    #[test]
    fn test_unclosed_day_has_no_difference() {
        let movements = vec![movement(MovementType::Opening, None, 10_000)];
        let summary = DaySummary::from_movements(day(), &movements);

        assert!(summary.is_opened());
        assert!(!summary.is_closed());
        assert!(summary.difference().is_none());
    }

    #[test]
    fn test_empty_day() {
        let summary = DaySummary::from_movements(day(), &[]);
        assert!(!summary.is_opened());
        assert_eq!(summary.expected_closing().kurus(), 0);
    }
}
