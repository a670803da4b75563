//! # Money Module
//!
//! Provides the `Money` type for displaying and summing rupee amounts.
//!
//! ## Where Floats Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Records and the GST calculator work in f64 rupees (the persisted JSON  │
//! │  format). Anything shown to a person goes through Money first:          │
//! │                                                                         │
//! │    f64 rupees ──► Money::from_rupees ──► integer paise ──► "₹1,180.00"  │
//! │                   (round half away                                      │
//! │                    from zero, once)                                     │
//! │                                                                         │
//! │  Summing many display totals in paise avoids the 0.1 + 0.2 drift.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::money::Money;
//!
//! let total = Money::from_rupees(1234567.891);
//! assert_eq!(total.to_string(), "₹12,34,567.89");
//!
//! let refund = Money::from_paise(-5050);
//! assert_eq!(refund.to_string(), "-₹50.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount in paise (1/100 rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and expenses
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Converts a float rupee amount, rounding half away from zero to paise.
    ///
    /// Non-finite input becomes zero, since there is no meaningful paise
    /// value for it.
    ///
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(10.005).paise(), 1001);
    /// assert_eq!(Money::from_rupees(-2.5).paise(), -250);
    /// assert_eq!(Money::from_rupees(f64::NAN).paise(), 0);
    /// ```
    pub fn from_rupees(rupees: f64) -> Self {
        if !rupees.is_finite() {
            return Money::zero();
        }
        // Scale in two steps so 10.005 (stored as 10.00499..) still rounds up.
        let scaled = (rupees * 1000.0).round() / 10.0;
        Money(scaled.round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn whole_rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount as float rupees (for persisting back into records).
    #[inline]
    pub fn rupees(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

/// Groups an unsigned digit string the Indian way: last three digits, then
/// pairs (`1234567` → `12,34,567`).
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `₹` with lakh/crore grouping and two decimals.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = (self.0 / 100).unsigned_abs().to_string();
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            group_indian(&whole),
            self.paise_part()
        )
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
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
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
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
        let money = Money::from_paise(118050);
        assert_eq!(money.paise(), 118050);
        assert_eq!(money.whole_rupees(), 1180);
        assert_eq!(money.paise_part(), 50);
    }

    #[test]
    fn test_from_rupees_rounding() {
        assert_eq!(Money::from_rupees(1180.0).paise(), 118000);
        assert_eq!(Money::from_rupees(0.1 + 0.2).paise(), 30);
        assert_eq!(Money::from_rupees(59.9994).paise(), 6000);
        assert_eq!(Money::from_rupees(-0.005).paise(), -1);
        assert_eq!(Money::from_rupees(f64::INFINITY), Money::zero());
    }

    #[test]
    fn test_display_indian_grouping() {
        assert_eq!(Money::from_paise(0).to_string(), "₹0.00");
        assert_eq!(Money::from_paise(99999).to_string(), "₹999.99");
        assert_eq!(Money::from_paise(100000).to_string(), "₹1,000.00");
        assert_eq!(Money::from_paise(12345678).to_string(), "₹1,23,456.78");
        assert_eq!(Money::from_paise(1234567890).to_string(), "₹1,23,45,678.90");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
    }

    #[test]
    fn test_group_indian() {
        assert_eq!(group_indian("1"), "1");
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("100000"), "1,00,000");
        assert_eq!(group_indian("10000000"), "1,00,00,000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
        assert_eq!((-a).paise(), -1000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.paise(), 2000);
    }

    #[test]
    fn test_rupees_round_trip() {
        assert_eq!(Money::from_paise(39333).rupees(), 393.33);
    }
}
