//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  khata-core errors (this file)                                         │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  khata-db errors (separate crate)                                      │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → view layer              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Most of the core is deliberately infallible (tolerant parsing, pass-through
//! arithmetic). These errors only appear on the strict paths.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An existing record id does not follow `<PREFIX>-<digits>`.
    ///
    /// ## When This Occurs
    /// Only under [`Strictness::Strict`](crate::Strictness::Strict). The
    /// lenient generator treats such ids as number 0 instead.
    #[error("Malformed id '{id}': expected {prefix}-<digits>")]
    MalformedId { id: String, prefix: String },

    /// A stock movement would take an item below zero.
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: f64,
        requested: f64,
    },

    /// A record is in a state that does not allow the operation.
    #[error("{record} is {state}: cannot {action}")]
    InvalidState {
        record: String,
        state: String,
        action: String,
    },

    /// A paginator was registered under `name` for a different record type.
    #[error("Paginator '{name}' is registered for a different record type")]
    RegistryTypeMismatch { name: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used by callers that validate before invoking the pass-through core
/// functions (see [`crate::validation`]).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid GSTIN, invalid collection key).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MalformedId {
            id: "ORDER7".to_string(),
            prefix: "ORD".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed id 'ORDER7': expected ORD-<digits>"
        );

        let err = CoreError::RegistryTypeMismatch {
            name: "orders".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Paginator 'orders' is registered for a different record type"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer".to_string(),
        };
        assert_eq!(err.to_string(), "customer is required");

        let err = ValidationError::NotFinite {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be a finite number");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Negative {
            field: "rate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
