//! # Payroll Ledger
//!
//! Debit/credit arithmetic for personnel transactions.
//!
//! ## Ledger Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Personnel Ledger Semantics                           │
//! │                                                                         │
//! │  DEBIT side (money paid out to the employee):                          │
//! │    avans   (advance)  - handed out before the salary accrues           │
//! │    ödeme   (payment)  - salary actually paid                           │
//! │                                                                         │
//! │  CREDIT side (earned by / withheld from the employee):                 │
//! │    hakediş (accrual)  - salary earned for a period                     │
//! │    kesinti (deduction)- withheld from the salary                       │
//! │                                                                         │
//! │  balance = Σdebit − Σcredit                                            │
//! │          = what the employee currently owes the shop                   │
//! │            (advances received that accruals have not yet covered)      │
//! │                                                                         │
//! │  The running balance on the personnel row is maintained in the SAME    │
//! │  transaction as the ledger insert, and must always equal the sum       │
//! │  derived here from the rows.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PersonnelTransaction, TransactionKind};

// =============================================================================
// Debit/Credit Mapping
// =============================================================================

/// Maps a transaction kind and amount to its (debit, credit) pair.
///
/// Exactly one side is non-zero.
///
/// ## Errors
/// [`CoreError::InvalidPaymentAmount`] if the amount is not positive.
pub fn debit_credit(kind: TransactionKind, amount: Money) -> CoreResult<(Money, Money)> {
    if !amount.is_positive() {
        return Err(CoreError::InvalidPaymentAmount {
            reason: "ledger amount must be positive".to_string(),
        });
    }

    Ok(match kind {
        TransactionKind::Advance | TransactionKind::Payment => (amount, Money::zero()),
        TransactionKind::Accrual | TransactionKind::Deduction => (Money::zero(), amount),
    })
}

/// The signed effect of a transaction on the running balance.
///
/// Debits raise the employee's debt, credits lower it.
pub fn balance_delta(kind: TransactionKind, amount: Money) -> CoreResult<Money> {
    let (debit, credit) = debit_credit(kind, amount)?;
    Ok(debit - credit)
}

// =============================================================================
// Ledger Summary
// =============================================================================

/// Derived totals over a personnel ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_debit_kurus: i64,
    pub total_credit_kurus: i64,
    pub balance_kurus: i64,
}

impl LedgerSummary {
    /// Sums a set of ledger rows. Order-independent.
    pub fn from_entries(entries: &[PersonnelTransaction]) -> Self {
        let total_debit: i64 = entries.iter().map(|e| e.debit_kurus).sum();
        let total_credit: i64 = entries.iter().map(|e| e.credit_kurus).sum();

        LedgerSummary {
            total_debit_kurus: total_debit,
            total_credit_kurus: total_credit,
            balance_kurus: total_debit - total_credit,
        }
    }

    /// The running balance as Money.
    pub fn balance(&self) -> Money {
        Money::from_kurus(self.balance_kurus)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(kind: TransactionKind, amount_kurus: i64) -> PersonnelTransaction {
        let (debit, credit) = debit_credit(kind, Money::from_kurus(amount_kurus)).unwrap();
        PersonnelTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            personnel_id: "p1".to_string(),
            branch_id: "b1".to_string(),
            kind,
            debit_kurus: debit.kurus(),
            credit_kurus: credit.kurus(),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_debit_credit_mapping() {
        let amount = Money::from_kurus(10_000);

        let (d, c) = debit_credit(TransactionKind::Advance, amount).unwrap();
        assert_eq!((d.kurus(), c.kurus()), (10_000, 0));

        let (d, c) = debit_credit(TransactionKind::Payment, amount).unwrap();
        assert_eq!((d.kurus(), c.kurus()), (10_000, 0));

        let (d, c) = debit_credit(TransactionKind::Accrual, amount).unwrap();
        assert_eq!((d.kurus(), c.kurus()), (0, 10_000));

        let (d, c) = debit_credit(TransactionKind::Deduction, amount).unwrap();
        assert_eq!((d.kurus(), c.kurus()), (0, 10_000));
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(debit_credit(TransactionKind::Advance, Money::zero()).is_err());
        assert!(debit_credit(TransactionKind::Accrual, Money::from_kurus(-5)).is_err());
    }

    #[test]
    fn test_balance_delta_signs() {
        let amount = Money::from_kurus(5_000);
        assert_eq!(
            balance_delta(TransactionKind::Advance, amount).unwrap().kurus(),
            5_000
        );
        assert_eq!(
            balance_delta(TransactionKind::Accrual, amount).unwrap().kurus(),
            -5_000
        );
    }

    /// An advance of ₺200 against a month's accrual of ₺150 leaves the
    /// employee owing ₺50.
    #[test]
    fn test_ledger_summary() {
        let entries = vec![
            entry(TransactionKind::Advance, 20_000),
            entry(TransactionKind::Accrual, 15_000),
        ];

        let summary = LedgerSummary::from_entries(&entries);
        assert_eq!(summary.total_debit_kurus, 20_000);
        assert_eq!(summary.total_credit_kurus, 15_000);
        assert_eq!(summary.balance_kurus, 5_000);
    }

    #[test]
    fn test_ledger_summary_order_independent() {
        let mut entries = vec![
            entry(TransactionKind::Advance, 20_000),
            entry(TransactionKind::Accrual, 15_000),
            entry(TransactionKind::Deduction, 1_000),
            entry(TransactionKind::Payment, 14_000),
        ];

        let forward = LedgerSummary::from_entries(&entries);
        entries.reverse();
        let backward = LedgerSummary::from_entries(&entries);

        assert_eq!(forward, backward);
        assert_eq!(forward.balance_kurus, 20_000 + 14_000 - 15_000 - 1_000);
    }
}
