//! # Validation Module
//!
//! Input validation for callers that want to check data *before* handing it
//! to the tolerant core functions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form wiring (view layer)                                     │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Amounts, rates, quantities                                        │
//! │  └── GSTIN shape                                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Core functions (compute_gst, next_id)                        │
//! │  └── No validation: inputs pass straight through                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::validation::{validate_amount, validate_gstin};
//!
//! assert!(validate_amount("amount", 1000.0).is_ok());
//! assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_NAME_LENGTH;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a money amount: finite and not negative. Zero is allowed.
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if amount < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a GST rate in percent.
///
/// ## Rules
/// - Finite
/// - Between 0 and 100 inclusive (the standard slabs are 0-28)
pub fn validate_gst_rate(rate_percent: f64) -> ValidationResult<()> {
    if !rate_percent.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "gst rate".to_string(),
        });
    }

    if !(0.0..=100.0).contains(&rate_percent) {
        return Err(ValidationError::OutOfRange {
            field: "gst rate".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }

    Ok(())
}

/// Validates a line or stock quantity: finite and strictly positive.
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "quantity".to_string(),
        });
    }

    if qty <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (customer, item, staff).
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates the shape of a GSTIN.
///
/// ## Layout (15 characters)
/// ```text
/// 27 AAPFU0939F 1 Z V
/// ── ────────── ─ ─ ─
/// │  │          │ │ └ check character
/// │  │          │ └── always 'Z'
/// │  │          └──── entity number (1-9, A-Z)
/// │  └─────────────── PAN (5 letters, 4 digits, 1 letter)
/// └────────────────── state code
/// ```
///
/// The check character itself is not verified.
pub fn validate_gstin(gstin: &str) -> ValidationResult<()> {
    let gstin = gstin.trim();
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "gstin".to_string(),
        reason: reason.to_string(),
    };

    if gstin.is_empty() {
        return Err(ValidationError::Required {
            field: "gstin".to_string(),
        });
    }

    let bytes = gstin.as_bytes();
    if bytes.len() != 15 || !gstin.is_ascii() {
        return Err(invalid("must be 15 characters"));
    }

    if !bytes[..2].iter().all(u8::is_ascii_digit) {
        return Err(invalid("must start with a two-digit state code"));
    }

    let pan = &bytes[2..12];
    let pan_ok = pan[..5].iter().all(u8::is_ascii_uppercase)
        && pan[5..9].iter().all(u8::is_ascii_digit)
        && pan[9].is_ascii_uppercase();
    if !pan_ok {
        return Err(invalid("characters 3-12 must be a PAN"));
    }

    if !(bytes[12].is_ascii_uppercase() || (b'1'..=b'9').contains(&bytes[12])) {
        return Err(invalid("entity number must be 1-9 or A-Z"));
    }

    if bytes[13] != b'Z' {
        return Err(invalid("character 14 must be 'Z'"));
    }

    if !bytes[14].is_ascii_alphanumeric() {
        return Err(invalid("check character must be alphanumeric"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("amount", 0.0).is_ok());
        assert!(validate_amount("amount", 1099.5).is_ok());
        assert!(validate_amount("amount", -1.0).is_err());
        assert!(validate_amount("amount", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_gst_rate() {
        for slab in crate::gst::GST_SLABS {
            assert!(validate_gst_rate(slab).is_ok());
        }
        assert!(validate_gst_rate(100.0).is_ok());
        assert!(validate_gst_rate(100.5).is_err());
        assert!(validate_gst_rate(-0.1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1.0).is_ok());
        assert!(validate_quantity(0.25).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-3.0).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("customer", "Sharma Traders").is_ok());
        assert!(validate_name("customer", "   ").is_err());
        assert!(validate_name("customer", &"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_gstin() {
        assert!(validate_gstin("27AAPFU0939F1ZV").is_ok());
        assert!(validate_gstin("29AAGCB7383J1Z4").is_ok());

        assert!(validate_gstin("").is_err());
        assert!(validate_gstin("27AAPFU0939F1Z").is_err()); // too short
        assert!(validate_gstin("AAAAPFU0939F1ZV").is_err()); // no state code
        assert!(validate_gstin("27AAPF10939F1ZV").is_err()); // bad PAN
        assert!(validate_gstin("27AAPFU0939F1XV").is_err()); // missing Z
    }
}
