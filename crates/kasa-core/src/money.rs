//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    ₺10.00 / 3 = ₺3.33 (×3 = ₺9.99)  → Lost 1 kuruş!                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Kuruş                                            │
//! │    1000 kuruş / 3 = 333 kuruş (×3 = 999 kuruş)                         │
//! │    We KNOW we lost 1 kuruş, and handle it explicitly                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasa_core::money::Money;
//!
//! // Create from kuruş (preferred)
//! let price = Money::from_kurus(1099); // ₺10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // ₺21.98
//! let total = price + Money::from_kurus(500);    // ₺15.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::VatRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in kuruş (the smallest TRY unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for shortages, corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every amount in the system flows through this type: product prices,
/// cart totals, payment splits, drawer movements, personnel debits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kuruş (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    ///
    /// let price = Money::from_kurus(1099); // Represents ₺10.99
    /// assert_eq!(price.kurus(), 1099);
    /// ```
    ///
    /// ## Why Kuruş?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use kuruş. Only a display
    /// layer would ever convert to lira.
    #[inline]
    pub const fn from_kurus(kurus: i64) -> Self {
        Money(kurus)
    }

    /// Creates a Money value from lira and kuruş parts.
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    ///
    /// let price = Money::from_lira_kurus(10, 99); // ₺10.99
    /// assert_eq!(price.kurus(), 1099);
    ///
    /// let shortage = Money::from_lira_kurus(-5, 50); // -₺5.50
    /// assert_eq!(shortage.kurus(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the lira part should be negative.
    /// `from_lira_kurus(-5, 50)` = -₺5.50, not -₺4.50
    #[inline]
    pub const fn from_lira_kurus(lira: i64, kurus: i64) -> Self {
        if lira < 0 {
            Money(lira * 100 - kurus)
        } else {
            Money(lira * 100 + kurus)
        }
    }

    /// Returns the value in kuruş (smallest currency unit).
    #[inline]
    pub const fn kurus(&self) -> i64 {
        self.0
    }

    /// Returns the lira portion.
    #[inline]
    pub const fn lira(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the kuruş portion (always 0-99, absolute value).
    #[inline]
    pub const fn kurus_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps a negative value to zero.
    ///
    /// Used for remainder math where an overpayment must not produce a
    /// negative bucket.
    #[inline]
    pub const fn clamp_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Calculates the VAT that must be ADDED on top of this amount
    /// (exclusive pricing: the amount does not yet contain VAT).
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(amount × bps + 5000) / 10000`.
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    /// use kasa_core::types::VatRate;
    ///
    /// let base = Money::from_kurus(10000);  // ₺100.00
    /// let rate = VatRate::from_bps(2000);   // 20%
    ///
    /// assert_eq!(base.vat_on(rate).kurus(), 2000); // ₺20.00
    /// ```
    pub fn vat_on(&self, rate: VatRate) -> Money {
        let vat = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_kurus(vat as i64)
    }

    /// Calculates the VAT CONTAINED in this amount (inclusive pricing:
    /// the amount is gross, VAT already inside).
    ///
    /// ## Formula
    /// `vat = gross × bps / (10000 + bps)`, rounded half-up.
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    /// use kasa_core::types::VatRate;
    ///
    /// let gross = Money::from_kurus(12000); // ₺120.00 incl. 20% VAT
    /// let rate = VatRate::from_bps(2000);
    ///
    /// assert_eq!(gross.vat_in(rate).kurus(), 2000); // ₺20.00
    /// ```
    pub fn vat_in(&self, rate: VatRate) -> Money {
        let divisor = 10000 + rate.bps() as i128;
        let vat = (self.0 as i128 * rate.bps() as i128 + divisor / 2) / divisor;
        Money::from_kurus(vat as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    ///
    /// let unit_price = Money::from_kurus(299); // ₺2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.kurus(), 897); // ₺8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Any UI would format with proper
/// localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₺{}.{:02}", sign, self.lira().abs(), self.kurus_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kurus() {
        let money = Money::from_kurus(1099);
        assert_eq!(money.kurus(), 1099);
        assert_eq!(money.lira(), 10);
        assert_eq!(money.kurus_part(), 99);
    }

    #[test]
    fn test_from_lira_kurus() {
        let money = Money::from_lira_kurus(10, 99);
        assert_eq!(money.kurus(), 1099);

        let negative = Money::from_lira_kurus(-5, 50);
        assert_eq!(negative.kurus(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_kurus(1099)), "₺10.99");
        assert_eq!(format!("{}", Money::from_kurus(500)), "₺5.00");
        assert_eq!(format!("{}", Money::from_kurus(-550)), "-₺5.50");
        assert_eq!(format!("{}", Money::from_kurus(0)), "₺0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_kurus(1000);
        let b = Money::from_kurus(500);

        assert_eq!((a + b).kurus(), 1500);
        assert_eq!((a - b).kurus(), 500);
        let result: Money = a * 3;
        assert_eq!(result.kurus(), 3000);
    }

    #[test]
    fn test_vat_on_basic() {
        // ₺100.00 at 20% = ₺20.00
        let amount = Money::from_kurus(10000);
        let rate = VatRate::from_bps(2000);
        assert_eq!(amount.vat_on(rate).kurus(), 2000);
    }

    #[test]
    fn test_vat_on_with_rounding() {
        // ₺0.55 at 1% = 0.0055 → rounds to ₺0.01
        let amount = Money::from_kurus(55);
        let rate = VatRate::from_bps(100);
        assert_eq!(amount.vat_on(rate).kurus(), 1);
    }

    #[test]
    fn test_vat_in_basic() {
        // ₺120.00 gross containing 20% VAT → ₺20.00 VAT
        let gross = Money::from_kurus(12000);
        let rate = VatRate::from_bps(2000);
        assert_eq!(gross.vat_in(rate).kurus(), 2000);
    }

    #[test]
    fn test_vat_in_inverse_of_vat_on() {
        // base + vat_on(base) should contain vat_in == vat_on(base)
        let base = Money::from_kurus(8450);
        let rate = VatRate::from_bps(1000); // 10%
        let added = base.vat_on(rate);
        let gross = base + added;
        assert_eq!(gross.vat_in(rate), added);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_kurus(100);
        assert!(positive.is_positive());

        let negative = Money::from_kurus(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.clamp_zero(), Money::zero());
        assert_eq!(positive.clamp_zero(), positive);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_kurus(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.kurus(), 897);
    }

    /// Critical test: Verify that ₺10.00 / 3 × 3 behaves as expected
    /// This documents the intentional precision loss
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_lira = Money::from_kurus(1000);
        let one_third = Money::from_kurus(1000 / 3); // 333 kuruş
        let reconstructed: Money = one_third * 3; // 999 kuruş

        assert_eq!(reconstructed.kurus(), 999);
        assert_ne!(reconstructed.kurus(), ten_lira.kurus());

        let lost = ten_lira - reconstructed;
        assert_eq!(lost.kurus(), 1);
    }
}
