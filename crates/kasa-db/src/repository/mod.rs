//! # Repository Module
//!
//! Repository implementations for database operations.
//!
//! ## Repository Pattern
//! Each repository owns the SQL for one aggregate:
//!
//! - [`product`] - Products and atomic stock adjustments
//! - [`customer`] - Customers and balance payments
//! - [`sale`] - Sales and the one-transaction checkout commit
//! - [`cash`] - Drawer movements and the day open/close boundary
//! - [`personnel`] - Employees and the payroll ledger
//! - [`user`] - Back-office accounts
//!
//! Repositories hold a cloned `SqlitePool` (cheap, reference-counted)
//! and are created per-call through the [`crate::Database`] accessors.

pub mod cash;
pub mod customer;
pub mod personnel;
pub mod product;
pub mod sale;
pub mod user;
