//! # Domain Types
//!
//! Core domain types used throughout Kasa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  CashMovement   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode        │   │  number         │   │  movement_type  │       │
//! │  │  price_kurus    │   │  net_kurus      │   │  amount_kurus   │       │
//! │  │  stock_quantity │   │  split buckets  │   │  movement_date  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │   Personnel     │   │     VatRate     │       │
//! │  │  running credit │   │  payroll ledger │   │  bps (u32)      │       │
//! │  │  balance        │   │  balance        │   │  2000 = 20%     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (barcode, sale number, etc.)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2000 bps = 20% (the standard Turkish KDV rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatRate(u32);

impl VatRate {
    /// Creates a VAT rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        VatRate(bps)
    }

    /// Creates a VAT rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        VatRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero VAT rate.
    #[inline]
    pub const fn zero() -> Self {
        VatRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate::zero()
    }
}

// =============================================================================
// Roles
// =============================================================================

/// User role, carried in the JWT and enforced server-side on
/// privileged routes.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Till operations only.
    Cashier,
    /// Cashier rights plus cash close and day reports.
    Manager,
    /// Everything, including personnel and user management.
    Admin,
}

impl Role {
    /// Checks whether this role satisfies `required`.
    ///
    /// Roles are ordered: Cashier < Manager < Admin.
    #[inline]
    pub fn allows(&self, required: Role) -> bool {
        self >= &required
    }
}

/// A back-office user (cashier, manager or admin).
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub branch_id: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized out of the db layer.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Sale price in kuruş.
    pub price_kurus: i64,

    /// Cost in kuruş (for margin calculations).
    pub cost_kurus: Option<i64>,

    /// VAT rate in basis points (2000 = 20%).
    pub vat_rate_bps: u32,

    /// Whether the sale price already contains VAT.
    pub vat_included: bool,

    /// Current stock level.
    pub stock_quantity: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_kurus(self.price_kurus)
    }

    /// Returns the VAT rate.
    #[inline]
    pub fn vat_rate(&self) -> VatRate {
        VatRate::from_bps(self.vat_rate_bps)
    }

    /// Checks whether `quantity` can be served from current stock.
    ///
    /// Selling is never blocked by stock (the decrement clamps at zero),
    /// but the till surfaces this so the cashier can see a shortfall.
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a running credit (veresiye) balance.
///
/// `current_balance_kurus` is a denormalized counter: it only ever moves
/// inside the same transaction as the sale or payment that caused the
/// move, so it cannot drift from its causes.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub phone: Option<String>,
    /// What the customer currently owes, in kuruş.
    pub current_balance_kurus: i64,
    /// Credit sales may not push the balance past this.
    pub credit_limit_kurus: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_kurus(self.current_balance_kurus)
    }

    /// Returns the remaining credit headroom.
    pub fn available_credit(&self) -> Money {
        (Money::from_kurus(self.credit_limit_kurus) - self.balance()).clamp_zero()
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a committed sale.
///
/// Sales are terminal on commit: `paid` when nothing is deferred,
/// `pending` when a credit portion remains on the customer's balance.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Fully settled at the till.
    Paid,
    /// A credit portion is outstanding.
    Pending,
}

// =============================================================================
// Payment Type
// =============================================================================

/// How the operator chose to settle the sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Physical cash for the full amount.
    Cash,
    /// Card terminal for the full amount.
    Card,
    /// Full amount deferred to the customer's balance.
    Credit,
    /// Operator-entered cash, remainder derived into card/credit.
    Partial,
}

/// Settlement channel of a single `sale` cash movement row.
///
/// Only cash rows count toward the physical drawer expectation; card
/// rows are kept for turnover reporting.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction.
///
/// Immutable after commit except `due_date` and `notes`.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub branch_id: String,
    /// Business number, `SAT-YYYYMMDD-NNNN`, unique per branch.
    pub number: String,
    pub customer_id: Option<String>,
    pub status: SaleStatus,
    pub payment_type: PaymentType,
    pub subtotal_kurus: i64,
    pub discount_kurus: i64,
    pub vat_kurus: i64,
    pub net_kurus: i64,
    /// Settlement split. Invariant: cash + card + credit == net ± 1 kuruş.
    pub cash_kurus: i64,
    pub card_kurus: i64,
    pub credit_kurus: i64,
    /// Amount handed over at the till (cash tendered + card).
    pub paid_kurus: i64,
    /// Change returned for cash overpayment.
    pub change_kurus: i64,
    pub cashier_id: String,
    /// Expected settlement date for the credit portion.
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the net amount as Money.
    #[inline]
    pub fn net(&self) -> Money {
        Money::from_kurus(self.net_kurus)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in kuruş at time of sale (frozen).
    pub unit_price_kurus: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Absolute discount applied to this line.
    pub discount_kurus: i64,
    /// VAT rate at time of sale (frozen).
    pub vat_rate_bps: u32,
    /// Whether the frozen price contained VAT.
    pub vat_included: bool,
    /// VAT for this line.
    pub vat_kurus: i64,
    /// Line total before discount and VAT (unit_price × quantity).
    pub line_total_kurus: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_kurus(self.unit_price_kurus)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_kurus(self.line_total_kurus)
    }
}

// =============================================================================
// Cash Movements
// =============================================================================

/// Kind of a cash-drawer movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Day float placed in the drawer at open.
    Opening,
    /// Counted cash at close.
    Closing,
    /// Settlement portion of a committed sale.
    Sale,
    /// Manual cash in (e.g. customer balance payment).
    Income,
    /// Manual cash out (e.g. supplier paid from the drawer).
    Expense,
}

/// An append-only cash-drawer ledger row.
///
/// The daily summary is always derived by reducing these rows; it is
/// never stored.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: String,
    pub branch_id: String,
    /// Business day the movement belongs to.
    pub movement_date: NaiveDate,
    pub movement_type: MovementType,
    /// Settlement channel; only set for `sale` rows.
    pub method: Option<PaymentMethod>,
    pub amount_kurus: i64,
    /// Link back to the sale that caused this row, if any.
    pub sale_id: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl CashMovement {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_kurus(self.amount_kurus)
    }
}

// =============================================================================
// Personnel
// =============================================================================

/// An employee with a payroll ledger.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personnel {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub title: Option<String>,
    /// Agreed monthly salary, in kuruş.
    pub salary_kurus: i64,
    /// Running debt of the employee to the shop: Σdebit − Σcredit.
    pub current_balance_kurus: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind of a personnel ledger transaction.
///
/// Debit side (money out to the employee): advance, payment.
/// Credit side (earned or withheld): accrual, deduction.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Hakediş - salary earned for a period.
    Accrual,
    /// Avans - advance handed out before the accrual.
    Advance,
    /// Ödeme - salary actually paid out.
    Payment,
    /// Kesinti - amount withheld from the salary.
    Deduction,
}

/// A personnel ledger row. Exactly one of debit/credit is non-zero.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonnelTransaction {
    pub id: String,
    pub personnel_id: String,
    pub branch_id: String,
    pub kind: TransactionKind,
    pub debit_kurus: i64,
    pub credit_kurus: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_rate_from_bps() {
        let rate = VatRate::from_bps(2000);
        assert_eq!(rate.bps(), 2000);
        assert!((rate.percentage() - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_vat_rate_from_percentage() {
        let rate = VatRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin.allows(Role::Manager));
        assert!(Role::Manager.allows(Role::Cashier));
        assert!(!Role::Cashier.allows(Role::Manager));
        assert!(Role::Manager.allows(Role::Manager));
    }

    #[test]
    fn test_available_credit() {
        let customer = Customer {
            id: "c1".to_string(),
            branch_id: "b1".to_string(),
            name: "Ayşe".to_string(),
            phone: None,
            current_balance_kurus: 30_000,
            credit_limit_kurus: 100_000,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(customer.available_credit().kurus(), 70_000);
    }
}
