//! # Money Module
//!
//! Provides the `Money` and `Rate` types for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  On an invoice that drift compounds through discount and VAT,          │
//! │  and the shop either loses money or overcharges a customer.            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    Amounts are i64 cents; percentages are u32 basis points.            │
//! │    18900 cents at 500 bps VAT = (18900 × 500 + 5000) / 10000 = 945     │
//! │    Every rounding is explicit and happens in exactly one place.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use axle_core::money::{Money, Rate};
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(5_000); // 50.00
//!
//! // Line totals are plain multiplication
//! let line = price.multiply_quantity(2); // 100.00
//!
//! // Percentages go through Rate, never through floats
//! let after_discount = line.sub_percentage(Rate::from_bps(1_000)); // -10%
//! assert_eq!(after_discount.cents(), 9_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discounts can legitimately push a running total negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Material.unit_price ──► InvoiceLine.unit_price (snapshot) ──► line total
///            │
///            └──► amount pipeline: charge + materials − discount + VAT
///                        │
///                        └──► InvoiceHeader.amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use axle_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use axle_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5_000); // 50.00
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.cents(), 10_000); // 100.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` percent of this amount, rounded half-up.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow on large amounts:
    /// `(cents * bps + 5000) / 10000`. The +5000 provides rounding
    /// (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use axle_core::money::{Money, Rate};
    ///
    /// let total = Money::from_cents(18_000);  // 180.00
    /// let vat = total.percent_of(Rate::from_bps(500)); // 5%
    /// assert_eq!(vat.cents(), 900); // 9.00
    /// ```
    pub fn percent_of(&self, rate: Rate) -> Money {
        let part = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(part as i64)
    }

    /// Subtracts `rate` percent of this amount from it.
    ///
    /// Used by the fee pipeline for percentage discounts: the percentage is
    /// always taken of the running total, never of a separate subtotal.
    #[inline]
    pub fn sub_percentage(&self, rate: Rate) -> Money {
        *self - self.percent_of(rate)
    }

    /// Adds `rate` percent of this amount to it.
    ///
    /// Used by the fee pipeline for VAT, which compounds on the discounted
    /// running total.
    #[inline]
    pub fn add_percentage(&self, rate: Rate) -> Money {
        *self + self.percent_of(rate)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000.
/// 500 bps = 5% VAT; 1000 bps = a 10% discount.
/// Two decimal places of percentage precision with pure integer math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rate(u32);

/// 100% expressed in basis points. Upper bound for percentage discounts.
pub const FULL_RATE_BPS: u32 = 10_000;

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
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

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and receipts in tests. Currency symbol and localization
/// belong to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
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

/// Multiplication by integer (for quantity calculations).
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.multiply_quantity(2).cents(), 2000);
    }

    #[test]
    fn test_percent_of_exact() {
        // 180.00 at 5% = 9.00
        let amount = Money::from_cents(18_000);
        assert_eq!(amount.percent_of(Rate::from_bps(500)).cents(), 900);
    }

    #[test]
    fn test_percent_of_with_rounding() {
        // 10.00 at 8.25% = 0.825 → rounds to 0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percent_of(Rate::from_bps(825)).cents(), 83);
    }

    #[test]
    fn test_sub_and_add_percentage() {
        let total = Money::from_cents(20_000); // 200.00
        let discounted = total.sub_percentage(Rate::from_bps(1_000)); // -10%
        assert_eq!(discounted.cents(), 18_000);

        let with_vat = discounted.add_percentage(Rate::from_bps(500)); // +5%
        assert_eq!(with_vat.cents(), 18_900);
    }

    #[test]
    fn test_negative_running_total() {
        // An AMOUNT discount larger than the subtotal goes negative instead
        // of saturating; the caller decides what to do with that.
        let total = Money::from_cents(1_000) - Money::from_cents(2_500);
        assert!(total.is_negative());
        assert_eq!(total.cents(), -1_500);
    }

    #[test]
    fn test_rate_percentage_display_only() {
        let rate = Rate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }
}
