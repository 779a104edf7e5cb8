//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    1800 * 0.18 = 323.99999999999994  ❌ WRONG!                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise (1 rupee = 100 paise)                      │
//! │    180000 paise × 1800 bps / 10000 = 32400 paise = ₹324.00             │
//! │    Rounding is explicit (half-up) and happens in exactly one place     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use maguva_core::money::Money;
//!
//! let price = Money::from_paise(129_900); // ₹1299.00
//! let doubled = price * 2;                // ₹2598.00
//! assert_eq!(doubled.paise(), 259_800);
//! assert_eq!(price.to_string(), "₹1299.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `total - advance` stay representable
/// - **Single field tuple struct**: zero-cost, serializes as a bare integer
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.base_price ──► mrp ──► POS line price ──► OrderItem.line_total │
/// │                                                                         │
/// │  Σ lines ──► subtotal ──► − discount ──► + GST ──► Order.total          │
/// │                                                                         │
/// │  TailorOrder.total ──► advance ──► balance                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use maguva_core::money::Money;
    ///
    /// let price = Money::from_paise(99_950); // ₹999.50
    /// assert_eq!(price.paise(), 99_950);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    ///
    /// ## Example
    /// ```rust
    /// use maguva_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(99_950).rupees(), 999);
    /// assert_eq!(Money::from_paise(-550).rupees(), -5);
    /// ```
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
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

    /// Calculates tax at the given rate, rounding half-up to the paisa.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use maguva_core::money::Money;
    /// use maguva_core::types::TaxRate;
    ///
    /// let taxable = Money::from_paise(180_000); // ₹1800.00
    /// let gst = taxable.calculate_tax(TaxRate::GST);
    /// assert_eq!(gst.paise(), 32_400);          // ₹324.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percentage(rate.bps())
    }

    /// Returns `bps` basis points of this amount, rounded half-up.
    ///
    /// ## Example
    /// ```rust
    /// use maguva_core::money::Money;
    ///
    /// // 12.5% of ₹99.99 = ₹12.49875 → ₹12.50
    /// assert_eq!(Money::from_paise(9_999).percentage(1_250).paise(), 1_250);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        // i128 keeps large catalogue totals from overflowing
        let raw = self.0 as i128 * bps as i128;
        let rounded = if raw >= 0 {
            (raw + 5_000) / 10_000
        } else {
            (raw - 5_000) / 10_000
        };
        Money::from_paise(rounded as i64)
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use maguva_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(49_900);
    /// assert_eq!(unit_price.checked_mul_quantity(3), Some(Money::from_paise(149_700)));
    /// assert_eq!(Money::from_paise(i64::MAX / 2).checked_mul_quantity(3), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Subtracts `other`, `None` on overflow.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Average of `self` over `count`, rounded half-up. Zero when `count` is 0.
    pub fn average_over(&self, count: i64) -> Money {
        if count <= 0 {
            return Money::zero();
        }
        let doubled = 2 * self.0 as i128;
        let count = count as i128;
        Money::from_paise(((doubled + count) / (2 * count)) as i64)
    }

    /// Value in rupees as a float, for ratios only (never for storage).
    #[inline]
    pub fn as_rupees_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(99_950);
        assert_eq!(money.paise(), 99_950);
        assert_eq!(money.rupees(), 999);
        assert_eq!(money.paise_part(), 50);
        assert_eq!(Money::from_rupees(1000).paise(), 100_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(212_400).to_string(), "₹2124.00");
        assert_eq!(Money::from_paise(5).to_string(), "₹0.05");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
    }

    #[test]
    fn test_gst_on_discounted_sale() {
        // ₹1800 taxable at 18% = ₹324
        let taxable = Money::from_paise(180_000);
        assert_eq!(taxable.calculate_tax(TaxRate::GST).paise(), 32_400);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 18% of 0.25 rupee = 4.5 paise → 5
        assert_eq!(Money::from_paise(25).percentage(1_800).paise(), 5);
        // 18% of 0.24 rupee = 4.32 paise → 4
        assert_eq!(Money::from_paise(24).percentage(1_800).paise(), 4);
        assert_eq!(Money::from_paise(-25).percentage(1_800).paise(), -5);
    }

    #[test]
    fn test_average_over() {
        assert_eq!(Money::from_paise(1_000).average_over(3).paise(), 333);
        assert_eq!(Money::from_paise(1_001).average_over(2).paise(), 501);
        assert_eq!(Money::from_paise(1_000).average_over(0), Money::zero());
    }

    #[test]
    fn test_sum_and_arithmetic() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_paise).sum();
        assert_eq!(total.paise(), 1_000);

        let mut running = Money::from_paise(500);
        running += Money::from_paise(250);
        running -= Money::from_paise(100);
        assert_eq!(running.paise(), 650);
        assert_eq!((running * 2).paise(), 1_300);
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_paise(i64::MAX);
        assert_eq!(max.checked_add(Money::from_paise(1)), None);
        assert_eq!(Money::from_paise(i64::MIN).checked_sub(Money::from_paise(1)), None);
        assert_eq!(Money::from_paise(i64::MAX / 2).checked_mul_quantity(3), None);
        assert_eq!(
            Money::from_paise(500).checked_add(Money::from_paise(250)),
            Some(Money::from_paise(750))
        );
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_paise(32_400)).unwrap();
        assert_eq!(json, "32400");
    }
}
