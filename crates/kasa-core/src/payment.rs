//! # Payment Splitting
//!
//! Allocates a sale's net total across the cash / card / credit buckets.
//!
//! ## Allocation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Payment Allocation                                 │
//! │                                                                         │
//! │  CASH     cash   = net                                                  │
//! │  CARD     card   = net                                                  │
//! │  CREDIT   credit = net          (customer REQUIRED)                     │
//! │                                                                         │
//! │  PARTIAL  cash   = operator-entered                                     │
//! │           with customer:    credit = net − cash − card                  │
//! │           without customer: card   = net − cash, credit pinned to 0     │
//! │                             (any entered card amount is overridden)     │
//! │                                                                         │
//! │  Hard contract, checked on every construction:                          │
//! │    cash + card + credit == net  (±1 kuruş)                              │
//! │    credit > 0  ⇒  customer attached                                     │
//! │    no bucket is negative                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module is pure allocation arithmetic. Persistence of the split
//! happens in the checkout commit, which trusts a validated split.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentType, SaleStatus};
use crate::SPLIT_TOLERANCE_KURUS;

// =============================================================================
// Payment Split
// =============================================================================

/// A validated allocation of a net total across settlement buckets.
///
/// Construct through [`PaymentSplit::allocate`]; the constructor is the
/// only place the balance contract is enforced, so a `PaymentSplit`
/// value in hand is known-good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSplit {
    pub cash_kurus: i64,
    pub card_kurus: i64,
    pub credit_kurus: i64,
}

/// Operator input for [`PaymentSplit::allocate`].
///
/// Only partial mode reads the entered amounts; the single-bucket modes
/// derive everything from the net.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitInput {
    /// Cash the operator keyed in (partial mode).
    pub cash_kurus: i64,
    /// Card amount the operator keyed in (partial mode, optional).
    pub card_kurus: i64,
}

impl PaymentSplit {
    /// Allocates `net` according to the payment type and operator input.
    ///
    /// ## Errors
    /// - [`CoreError::CreditRequiresCustomer`] for credit without a
    ///   customer (also in partial mode when a credit remainder arises;
    ///   the forced-card rule prevents that case, so this only fires
    ///   for explicit CREDIT mode)
    /// - [`CoreError::InvalidPaymentAmount`] for negative entries or a
    ///   derived bucket going negative (entered amounts exceed net)
    pub fn allocate(
        payment_type: PaymentType,
        net: Money,
        input: SplitInput,
        customer_attached: bool,
    ) -> CoreResult<Self> {
        if net.is_negative() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "net amount cannot be negative".to_string(),
            });
        }

        let split = match payment_type {
            PaymentType::Cash => PaymentSplit {
                cash_kurus: net.kurus(),
                card_kurus: 0,
                credit_kurus: 0,
            },
            PaymentType::Card => PaymentSplit {
                cash_kurus: 0,
                card_kurus: net.kurus(),
                credit_kurus: 0,
            },
            PaymentType::Credit => {
                if !customer_attached {
                    return Err(CoreError::CreditRequiresCustomer);
                }
                PaymentSplit {
                    cash_kurus: 0,
                    card_kurus: 0,
                    credit_kurus: net.kurus(),
                }
            }
            PaymentType::Partial => {
                if input.cash_kurus < 0 || input.card_kurus < 0 {
                    return Err(CoreError::InvalidPaymentAmount {
                        reason: "entered amounts cannot be negative".to_string(),
                    });
                }

                let cash = input.cash_kurus;
                if customer_attached {
                    let card = input.card_kurus;
                    let credit = net.kurus() - cash - card;
                    if credit < 0 {
                        return Err(CoreError::InvalidPaymentAmount {
                            reason: "entered amounts exceed the net total".to_string(),
                        });
                    }
                    PaymentSplit {
                        cash_kurus: cash,
                        card_kurus: card,
                        credit_kurus: credit,
                    }
                } else {
                    // No balance to defer to: the whole remainder is
                    // forced into card, credit pinned to zero.
                    let card = net.kurus() - cash;
                    if card < 0 {
                        return Err(CoreError::InvalidPaymentAmount {
                            reason: "entered cash exceeds the net total".to_string(),
                        });
                    }
                    PaymentSplit {
                        cash_kurus: cash,
                        card_kurus: card,
                        credit_kurus: 0,
                    }
                }
            }
        };

        split.validate(net, customer_attached)?;
        Ok(split)
    }

    /// Checks the balance contract against a net total.
    ///
    /// Tolerance is 1 kuruş (the 0.01 epsilon, exact in integer math,
    /// kept for operator-entered amounts that round the last kuruş).
    pub fn validate(&self, net: Money, customer_attached: bool) -> CoreResult<()> {
        if self.cash_kurus < 0 || self.card_kurus < 0 || self.credit_kurus < 0 {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "split bucket cannot be negative".to_string(),
            });
        }

        if self.credit_kurus > 0 && !customer_attached {
            return Err(CoreError::CreditRequiresCustomer);
        }

        let sum = self.total().kurus();
        if (sum - net.kurus()).abs() > SPLIT_TOLERANCE_KURUS {
            return Err(CoreError::SplitMismatch {
                split_kurus: sum,
                net_kurus: net.kurus(),
            });
        }

        Ok(())
    }

    /// Sum of all buckets.
    pub fn total(&self) -> Money {
        Money::from_kurus(self.cash_kurus + self.card_kurus + self.credit_kurus)
    }

    /// Amount settled immediately at the till (cash + card).
    pub fn paid_now(&self) -> Money {
        Money::from_kurus(self.cash_kurus + self.card_kurus)
    }

    /// Amount deferred to the customer balance.
    pub fn credit(&self) -> Money {
        Money::from_kurus(self.credit_kurus)
    }

    /// Whether any cash changes hands.
    pub fn has_cash(&self) -> bool {
        self.cash_kurus > 0
    }

    /// Whether any card settlement happens.
    pub fn has_card(&self) -> bool {
        self.card_kurus > 0
    }

    /// The sale status implied by this split.
    pub fn status(&self) -> SaleStatus {
        if self.credit_kurus > 0 {
            SaleStatus::Pending
        } else {
            SaleStatus::Paid
        }
    }

    /// Change owed for the cash tendered by the customer.
    ///
    /// `tendered` is what the customer handed over; change is due only
    /// on the cash bucket. Card/credit buckets never produce change.
    pub fn change_for(&self, tendered: Money) -> Money {
        (tendered - Money::from_kurus(self.cash_kurus)).clamp_zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn net(kurus: i64) -> Money {
        Money::from_kurus(kurus)
    }

    #[test]
    fn test_cash_allocation() {
        let split =
            PaymentSplit::allocate(PaymentType::Cash, net(12_000), SplitInput::default(), false)
                .unwrap();
        assert_eq!(split.cash_kurus, 12_000);
        assert_eq!(split.card_kurus, 0);
        assert_eq!(split.credit_kurus, 0);
        assert_eq!(split.status(), SaleStatus::Paid);
    }

    #[test]
    fn test_card_allocation() {
        let split =
            PaymentSplit::allocate(PaymentType::Card, net(12_000), SplitInput::default(), false)
                .unwrap();
        assert_eq!(split.card_kurus, 12_000);
        assert_eq!(split.status(), SaleStatus::Paid);
    }

    #[test]
    fn test_credit_requires_customer() {
        let err =
            PaymentSplit::allocate(PaymentType::Credit, net(12_000), SplitInput::default(), false)
                .unwrap_err();
        assert!(matches!(err, CoreError::CreditRequiresCustomer));

        let split =
            PaymentSplit::allocate(PaymentType::Credit, net(12_000), SplitInput::default(), true)
                .unwrap();
        assert_eq!(split.credit_kurus, 12_000);
        assert_eq!(split.status(), SaleStatus::Pending);
    }

    /// The fixture from the reconciliation scenario: net ₺120.00, cash
    /// ₺50.00 entered. Without a customer the ₺70.00 remainder is forced
    /// into card; with one it becomes credit (card left at 0 here).
    #[test]
    fn test_partial_forced_remainder_no_customer() {
        let input = SplitInput {
            cash_kurus: 5_000,
            card_kurus: 0,
        };
        let split = PaymentSplit::allocate(PaymentType::Partial, net(12_000), input, false).unwrap();
        assert_eq!(split.cash_kurus, 5_000);
        assert_eq!(split.card_kurus, 7_000);
        assert_eq!(split.credit_kurus, 0);
        assert_eq!(split.status(), SaleStatus::Paid);
    }

    #[test]
    fn test_partial_remainder_to_credit_with_customer() {
        let input = SplitInput {
            cash_kurus: 5_000,
            card_kurus: 0,
        };
        let split = PaymentSplit::allocate(PaymentType::Partial, net(12_000), input, true).unwrap();
        assert_eq!(split.cash_kurus, 5_000);
        assert_eq!(split.card_kurus, 0);
        assert_eq!(split.credit_kurus, 7_000);
        assert_eq!(split.status(), SaleStatus::Pending);
    }

    #[test]
    fn test_partial_cash_card_credit_with_customer() {
        let input = SplitInput {
            cash_kurus: 5_000,
            card_kurus: 4_000,
        };
        let split = PaymentSplit::allocate(PaymentType::Partial, net(12_000), input, true).unwrap();
        assert_eq!(split.credit_kurus, 3_000);
        assert_eq!(split.total().kurus(), 12_000);
    }

    #[test]
    fn test_partial_entered_card_overridden_without_customer() {
        // The operator keyed a card amount, but with no customer the
        // forced-remainder rule decides the card bucket.
        let input = SplitInput {
            cash_kurus: 5_000,
            card_kurus: 1_000,
        };
        let split = PaymentSplit::allocate(PaymentType::Partial, net(12_000), input, false).unwrap();
        assert_eq!(split.card_kurus, 7_000);
        assert_eq!(split.credit_kurus, 0);
    }

    #[test]
    fn test_partial_overpayment_rejected() {
        let input = SplitInput {
            cash_kurus: 13_000,
            card_kurus: 0,
        };
        let err =
            PaymentSplit::allocate(PaymentType::Partial, net(12_000), input, false).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPaymentAmount { .. }));
    }

    #[test]
    fn test_validate_split_mismatch() {
        let split = PaymentSplit {
            cash_kurus: 5_000,
            card_kurus: 5_000,
            credit_kurus: 0,
        };
        let err = split.validate(net(12_000), false).unwrap_err();
        assert!(matches!(err, CoreError::SplitMismatch { .. }));
    }

    #[test]
    fn test_validate_one_kurus_tolerance() {
        let split = PaymentSplit {
            cash_kurus: 11_999,
            card_kurus: 0,
            credit_kurus: 0,
        };
        assert!(split.validate(net(12_000), false).is_ok());

        let split = PaymentSplit {
            cash_kurus: 11_998,
            card_kurus: 0,
            credit_kurus: 0,
        };
        assert!(split.validate(net(12_000), false).is_err());
    }

    #[test]
    fn test_change_for_cash_tender() {
        let split =
            PaymentSplit::allocate(PaymentType::Cash, net(12_000), SplitInput::default(), false)
                .unwrap();
        assert_eq!(split.change_for(Money::from_kurus(15_000)).kurus(), 3_000);
        assert_eq!(split.change_for(Money::from_kurus(12_000)).kurus(), 0);
        // Under-tender never produces negative change
        assert_eq!(split.change_for(Money::from_kurus(10_000)).kurus(), 0);
    }
}
