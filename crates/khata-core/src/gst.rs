//! # GST Calculator
//!
//! Splits India's Goods and Services Tax for every money computation in the
//! back office: orders, invoices and ledger entries.
//!
//! ## The Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount = 1000, rate = 18%                                              │
//! │                                                                         │
//! │  gst_amount = 1000 × 0.18 = 180                                         │
//! │       │                                                                 │
//! │       ├── INTRA-STATE (supplier and buyer in the same state)            │
//! │       │     CGST (central) = 90    SGST (state) = 90    IGST = 0        │
//! │       │                                                                 │
//! │       └── INTER-STATE                                                   │
//! │             CGST = 0    SGST = 0    IGST (integrated) = 180             │
//! │                                                                         │
//! │  total = 1000 + 180 = 1180 in both cases                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Input Policy
//! [`compute_gst`] does no validation: negative, zero, NaN and infinite
//! inputs flow through the arithmetic unchanged. Callers that want hard
//! failures use [`compute_gst_checked`].

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationResult;
use crate::money::Money;
use crate::validation::{validate_amount, validate_gst_rate};

/// The standard GST slabs, in percent.
pub const GST_SLABS: [f64; 5] = [0.0, 5.0, 12.0, 18.0, 28.0];

// =============================================================================
// Supply Type
// =============================================================================

/// Whether a supply crosses a state border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SupplyType {
    #[default]
    IntraState,
    InterState,
}

impl SupplyType {
    pub fn from_interstate(is_interstate: bool) -> Self {
        if is_interstate {
            SupplyType::InterState
        } else {
            SupplyType::IntraState
        }
    }

    pub fn is_interstate(&self) -> bool {
        matches!(self, SupplyType::InterState)
    }
}

// =============================================================================
// GST Breakdown
// =============================================================================

/// Result of a GST computation. Derived data, never stored on its own.
///
/// ## Invariants
/// - intra-state: `cgst == sgst == gst_amount / 2`, `igst == 0`
/// - inter-state: `igst == gst_amount`, `cgst == sgst == 0`
/// - always: `total == amount + gst_amount`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GstBreakdown {
    pub total: f64,
    pub gst_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
}

impl GstBreakdown {
    /// The pre-tax amount (`total - gst_amount`).
    pub fn taxable_value(&self) -> f64 {
        self.total - self.gst_amount
    }

    /// Rounds every component to whole paise.
    ///
    /// Rounding happens per field, so a rounded intra-state breakdown of an
    /// odd number of paise keeps `cgst == sgst` and may differ from
    /// `gst_amount` by one paisa.
    pub fn rounded(&self) -> GstBreakdown {
        let paise = |v: f64| Money::from_rupees(v).rupees();
        GstBreakdown {
            total: paise(self.total),
            gst_amount: paise(self.gst_amount),
            cgst: paise(self.cgst),
            sgst: paise(self.sgst),
            igst: paise(self.igst),
        }
    }

    /// Grand total as [`Money`], for display.
    pub fn total_money(&self) -> Money {
        Money::from_rupees(self.total)
    }
}

impl Add for GstBreakdown {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        GstBreakdown {
            total: self.total + other.total,
            gst_amount: self.gst_amount + other.gst_amount,
            cgst: self.cgst + other.cgst,
            sgst: self.sgst + other.sgst,
            igst: self.igst + other.igst,
        }
    }
}

impl AddAssign for GstBreakdown {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for GstBreakdown {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(GstBreakdown::default(), Add::add)
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Computes GST on a pre-tax `amount` at `rate_percent` (18 means 18%).
///
/// ## Example
/// ```rust
/// use khata_core::gst::compute_gst;
///
/// let intra = compute_gst(1000.0, 18.0, false);
/// assert_eq!(intra.total, 1180.0);
/// assert_eq!((intra.cgst, intra.sgst, intra.igst), (90.0, 90.0, 0.0));
///
/// let inter = compute_gst(1000.0, 18.0, true);
/// assert_eq!((inter.cgst, inter.sgst, inter.igst), (0.0, 0.0, 180.0));
/// ```
pub fn compute_gst(amount: f64, rate_percent: f64, is_interstate: bool) -> GstBreakdown {
    let rate = rate_percent / 100.0;
    let gst_amount = amount * rate;
    split(amount, gst_amount, SupplyType::from_interstate(is_interstate))
}

/// Same as [`compute_gst`] with a typed supply.
pub fn compute_gst_for(amount: f64, rate_percent: f64, supply: SupplyType) -> GstBreakdown {
    compute_gst(amount, rate_percent, supply.is_interstate())
}

/// Extracts the GST already contained in a tax-inclusive `gross` amount.
///
/// `amount = gross / (1 + rate)`; the breakdown's `total` equals `gross`
/// up to floating point error.
///
/// ```rust
/// use khata_core::gst::compute_gst_inclusive;
///
/// let b = compute_gst_inclusive(1180.0, 18.0, false);
/// assert!((b.gst_amount - 180.0).abs() < 1e-9);
/// assert!((b.taxable_value() - 1000.0).abs() < 1e-9);
/// ```
pub fn compute_gst_inclusive(gross: f64, rate_percent: f64, is_interstate: bool) -> GstBreakdown {
    let rate = rate_percent / 100.0;
    let amount = gross / (1.0 + rate);
    compute_gst(amount, rate_percent, is_interstate)
}

/// Validating variant of [`compute_gst`].
///
/// ## Errors
/// - amount or rate is NaN/infinite
/// - amount or rate is negative
/// - rate is above 100%
pub fn compute_gst_checked(
    amount: f64,
    rate_percent: f64,
    is_interstate: bool,
) -> ValidationResult<GstBreakdown> {
    validate_amount("amount", amount)?;
    validate_gst_rate(rate_percent)?;
    Ok(compute_gst(amount, rate_percent, is_interstate))
}

fn split(amount: f64, gst_amount: f64, supply: SupplyType) -> GstBreakdown {
    let (cgst, sgst, igst) = match supply {
        SupplyType::InterState => (0.0, 0.0, gst_amount),
        SupplyType::IntraState => (gst_amount / 2.0, gst_amount / 2.0, 0.0),
    };
    GstBreakdown {
        total: amount + gst_amount,
        gst_amount,
        cgst,
        sgst,
        igst,
    }
}

// =============================================================================
// GSTIN Helpers
// =============================================================================

/// Two-digit state code at the start of a GSTIN (`27` for Maharashtra).
pub fn gstin_state_code(gstin: &str) -> Option<&str> {
    let code = gstin.trim().get(..2)?;
    code.bytes().all(|b| b.is_ascii_digit()).then_some(code)
}

/// Decides the supply type from supplier and recipient GSTINs.
///
/// Falls back to intra-state when either state code is unreadable, which is
/// the common case for unregistered walk-in buyers.
pub fn is_interstate(supplier_gstin: &str, recipient_gstin: &str) -> bool {
    match (gstin_state_code(supplier_gstin), gstin_state_code(recipient_gstin)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intra_state_example() {
        let b = compute_gst(1000.0, 18.0, false);
        assert_eq!(
            b,
            GstBreakdown {
                total: 1180.0,
                gst_amount: 180.0,
                cgst: 90.0,
                sgst: 90.0,
                igst: 0.0,
            }
        );
    }

    #[test]
    fn test_inter_state_example() {
        let b = compute_gst(1000.0, 18.0, true);
        assert_eq!(
            b,
            GstBreakdown {
                total: 1180.0,
                gst_amount: 180.0,
                cgst: 0.0,
                sgst: 0.0,
                igst: 180.0,
            }
        );
    }

    #[test]
    fn test_pass_through_inputs() {
        let b = compute_gst(-100.0, 18.0, false);
        assert_eq!(b.gst_amount, -18.0);
        assert_eq!(b.total, -118.0);

        let b = compute_gst(f64::NAN, 18.0, true);
        assert!(b.total.is_nan());
        assert!(b.igst.is_nan());

        let b = compute_gst(500.0, 0.0, false);
        assert_eq!(b.total, 500.0);
        assert_eq!(b.cgst + b.sgst + b.igst, 0.0);
    }

    #[test]
    fn test_checked_rejects_bad_input() {
        assert!(compute_gst_checked(1000.0, 18.0, false).is_ok());
        assert!(compute_gst_checked(-1.0, 18.0, false).is_err());
        assert!(compute_gst_checked(1000.0, -5.0, false).is_err());
        assert!(compute_gst_checked(1000.0, 150.0, false).is_err());
        assert!(compute_gst_checked(f64::INFINITY, 18.0, false).is_err());
    }

    #[test]
    fn test_typed_supply_matches_bool() {
        assert_eq!(
            compute_gst_for(250.0, 12.0, SupplyType::InterState),
            compute_gst(250.0, 12.0, true)
        );
    }

    #[test]
    fn test_breakdowns_sum() {
        let total: GstBreakdown = [
            compute_gst(1000.0, 18.0, false),
            compute_gst(1000.0, 18.0, true),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.total, 2360.0);
        assert_eq!(total.cgst, 90.0);
        assert_eq!(total.igst, 180.0);
        assert_eq!(total.taxable_value(), 2000.0);
    }

    #[test]
    fn test_rounded_to_paise() {
        let b = compute_gst(333.33, 18.0, false).rounded();
        assert_eq!(b.gst_amount, 60.0);
        assert_eq!(b.cgst, 30.0);
        assert_eq!(b.total, 393.33);
    }

    #[test]
    fn test_gstin_state_codes() {
        assert_eq!(gstin_state_code("27AAPFU0939F1ZV"), Some("27"));
        assert_eq!(gstin_state_code("X"), None);
        assert!(is_interstate("27AAPFU0939F1ZV", "29AAGCB7383J1Z4"));
        assert!(!is_interstate("27AAPFU0939F1ZV", "27AABCU9603R1ZM"));
        assert!(!is_interstate("27AAPFU0939F1ZV", ""));
    }

    proptest! {
        #[test]
        fn prop_intra_state_split_identity(amount in 0.0f64..1e9, rate in 0.0f64..100.0) {
            let b = compute_gst(amount, rate, false);
            prop_assert_eq!(b.cgst, b.gst_amount / 2.0);
            prop_assert_eq!(b.sgst, b.gst_amount / 2.0);
            prop_assert_eq!(b.cgst + b.sgst, b.gst_amount);
            prop_assert_eq!(b.igst, 0.0);
            prop_assert_eq!(b.total, amount + b.gst_amount);
        }

        #[test]
        fn prop_inter_state_split_identity(amount in 0.0f64..1e9, rate in 0.0f64..100.0) {
            let b = compute_gst(amount, rate, true);
            prop_assert_eq!(b.igst, b.gst_amount);
            prop_assert_eq!(b.cgst, 0.0);
            prop_assert_eq!(b.sgst, 0.0);
            prop_assert_eq!(b.total, amount + b.gst_amount);
        }
    }
}
