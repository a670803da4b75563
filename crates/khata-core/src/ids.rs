//! # Sequential Id Generator
//!
//! Derives the next human-readable id (`ORD-0007`, `INV-0004`, `GST-003`)
//! for a collection from the ids already in it.
//!
//! ## Algorithm
//! ```text
//! existing: ["ORD-0001", "ORD-0003", "legacy"]
//!               │            │          │
//!   strip non-digits:        1            3          (none → 0)
//!               └────────────┴──────────┘
//!                            │
//!                        max = 3
//!                            │
//!                     3 + 1 = 4 → "ORD-0004"
//! ```
//!
//! Deleting records out of order never makes an id go backwards, because the
//! maximum of what remains is always at least as large as any earlier gap.
//! Two callers working from the same stale snapshot will still produce the
//! same id; the store's per-key lock is what prevents that inside one process.

use crate::error::{CoreError, CoreResult};
use crate::types::{Record, Strictness};

/// Id layout for one collection: `<prefix>-<zero padded number>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFormat {
    prefix: String,
    width: usize,
}

impl IdFormat {
    /// Creates a format. `width` is the minimum digit count.
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        IdFormat {
            prefix: prefix.into(),
            width,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Renders an id for `number`.
    ///
    /// Numbers wider than `width` are written in full, never truncated.
    ///
    /// ```rust
    /// use khata_core::ids::IdFormat;
    ///
    /// let fmt = IdFormat::new("INV", 4);
    /// assert_eq!(fmt.render(4), "INV-0004");
    /// assert_eq!(fmt.render(12345), "INV-12345");
    /// ```
    pub fn render(&self, number: u64) -> String {
        format!("{}-{:0width$}", self.prefix, number, width = self.width)
    }

    /// Parses the number out of an id that follows this format exactly.
    fn parse_strict(&self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(&self.prefix)?.strip_prefix('-')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// Extracts the numeric part of an id by dropping every non-digit character.
///
/// Ids with no digits, or with more digits than fit in a `u64`, yield `0`.
///
/// ```rust
/// use khata_core::ids::numeric_suffix;
///
/// assert_eq!(numeric_suffix("ORD-0042"), 42);
/// assert_eq!(numeric_suffix("draft"), 0);
/// ```
pub fn numeric_suffix(id: &str) -> u64 {
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Returns the next id for a collection using the lenient policy.
///
/// ## Example
/// ```rust
/// use khata_core::ids::next_id;
///
/// assert_eq!(next_id("ORD", ["ORD-0001", "ORD-0003"], 4), "ORD-0004");
/// assert_eq!(next_id("ORD", Vec::<&str>::new(), 4), "ORD-0001");
/// ```
pub fn next_id<'a, I>(prefix: &str, existing: I, width: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing.into_iter().map(numeric_suffix).max().unwrap_or(0);
    IdFormat::new(prefix, width).render(max.saturating_add(1))
}

// =============================================================================
// Id Generator
// =============================================================================

/// Id generator bound to one collection's format and a parsing policy.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    format: IdFormat,
    strictness: Strictness,
}

impl IdGenerator {
    pub fn new(format: IdFormat, strictness: Strictness) -> Self {
        IdGenerator { format, strictness }
    }

    /// Lenient generator for a record type's collection.
    pub fn for_record<T: Record>() -> Self {
        IdGenerator::new(T::COLLECTION.id_format(), Strictness::Lenient)
    }

    /// Returns a copy using `strictness`.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn format(&self) -> &IdFormat {
        &self.format
    }

    /// Computes the next id from existing ids.
    ///
    /// ## Errors
    /// Under [`Strictness::Strict`], any id not shaped `<PREFIX>-<digits>`
    /// returns [`CoreError::MalformedId`]. The lenient policy never fails.
    pub fn next<'a, I>(&self, existing: I) -> CoreResult<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut max = 0u64;
        for id in existing {
            let number = match self.strictness {
                Strictness::Lenient => numeric_suffix(id),
                Strictness::Strict => {
                    self.format
                        .parse_strict(id)
                        .ok_or_else(|| CoreError::MalformedId {
                            id: id.to_string(),
                            prefix: self.format.prefix.clone(),
                        })?
                }
            };
            max = max.max(number);
        }
        Ok(self.format.render(max.saturating_add(1)))
    }

    /// Computes the next id from a slice of records.
    pub fn next_for<T: Record>(&self, records: &[T]) -> CoreResult<String> {
        self.next(records.iter().map(Record::id))
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
    fn test_next_id_examples() {
        assert_eq!(next_id("ORD", ["ORD-0001", "ORD-0003"], 4), "ORD-0004");
        assert_eq!(next_id("ORD", Vec::<&str>::new(), 4), "ORD-0001");
        assert_eq!(next_id("GST", ["GST-002"], 3), "GST-003");
    }

    #[test]
    fn test_next_id_ignores_malformed() {
        assert_eq!(next_id("STK", ["STK-005", "abc", ""], 3), "STK-006");
        assert_eq!(next_id("STK", ["abc"], 3), "STK-001");
    }

    #[test]
    fn test_overflowing_digits_count_as_zero() {
        let huge = "ORD-99999999999999999999999";
        assert_eq!(numeric_suffix(huge), 0);
        assert_eq!(next_id("ORD", [huge, "ORD-0002"], 4), "ORD-0003");
    }

    #[test]
    fn test_width_is_a_minimum() {
        assert_eq!(next_id("INV", ["INV-9999"], 4), "INV-10000");
    }

    #[test]
    fn test_strict_rejects_malformed() {
        let gen = IdGenerator::new(IdFormat::new("ORD", 4), Strictness::Strict);
        assert_eq!(gen.next(["ORD-0001", "ORD-0009"]).unwrap(), "ORD-0010");

        let err = gen.next(["ORD-0001", "ORDER-2"]).unwrap_err();
        assert!(matches!(err, CoreError::MalformedId { .. }));
        assert!(gen.next(["ORD-"]).is_err());
        assert!(gen.next(["INV-0001"]).is_err());
    }

    #[test]
    fn test_lenient_generator_matches_free_function() {
        let gen = IdGenerator::new(IdFormat::new("FIN", 3), Strictness::Lenient);
        let ids = ["FIN-001", "x", "FIN-010"];
        assert_eq!(gen.next(ids).unwrap(), next_id("FIN", ids, 3));
    }

    proptest! {
        #[test]
        fn prop_next_id_exceeds_every_existing(numbers in prop::collection::vec(0u64..100_000, 0..50)) {
            let ids: Vec<String> = numbers.iter().map(|n| format!("ORD-{:04}", n)).collect();
            let next = next_id("ORD", ids.iter().map(String::as_str), 4);
            let next_number = numeric_suffix(&next);
            prop_assert!(numbers.iter().all(|n| *n < next_number));
            prop_assert_eq!(next_number, numbers.iter().copied().max().unwrap_or(0) + 1);
        }
    }
}
