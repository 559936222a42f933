//! # kasa-core: Pure Business Logic for Kasa POS
//!
//! This crate is the **heart** of Kasa POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasa POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/server)                       │   │
//! │  │    /cart ──► /checkout ──► /cash ──► /customers ──► /personnel │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasa-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ payment  │ │cashbook│ │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │  Split   │ │DaySumm.│ │   │
//! │  │   │  Sale   │ │ VatCalc │ │CartItem │ │ Partial  │ │payroll │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasa-db (Database Layer)                     │   │
//! │  │        SQLite queries, migrations, transactional checkout       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, CashMovement, etc.)
//! - [`money`] - Money type with integer kuruş arithmetic (no floats!)
//! - [`cart`] - Cart accumulation and total derivation
//! - [`payment`] - Payment splitting across cash/card/credit
//! - [`cashbook`] - Daily drawer summary and reconciliation
//! - [`payroll`] - Personnel debit/credit ledger arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in kuruş (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cashbook;
pub mod error;
pub mod money;
pub mod payment;
pub mod payroll;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kasa_core::Money` instead of
// `use kasa_core::money::Money`

pub use cart::{Cart, CartItem, CartTotals};
pub use cashbook::DaySummary;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{PaymentSplit, SplitInput};
pub use payroll::LedgerSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default branch ID for v0.1 (single-branch runtime with multi-branch schema)
///
/// ## Why a constant?
/// v0.1 serves one shop, but every branch-scoped table carries a
/// branch_id for future multi-location deployments. This constant is
/// used throughout the codebase until dynamic branch resolution lands.
pub const DEFAULT_BRANCH_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum distinct lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps receipts printable.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in the cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., scanning 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Tolerance for payment split vs net comparisons, in kuruş.
///
/// The contract is "within 0.01"; with integer kuruş that is
/// exactly one unit, kept for operator-entered amounts that round the
/// last kuruş.
pub const SPLIT_TOLERANCE_KURUS: i64 = 1;
