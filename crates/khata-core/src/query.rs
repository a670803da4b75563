//! # Filter & Sort Queries
//!
//! Each business module describes *what* to show with a predicate and a
//! comparator; [`Query`] applies them to a full collection so the
//! [`Paginator`](crate::pagination::Paginator) only ever sees the result.
//!
//! ```text
//! full collection ──► filters (all must match) ──► stable sort ──► Paginator
//! ```
//!
//! ## Example
//! ```rust
//! use khata_core::query::{Query, SortDirection};
//!
//! let amounts = vec![500.0, 120.0, 900.0, 40.0];
//! let big_first = Query::new()
//!     .filter(|a: &f64| *a >= 100.0)
//!     .sort_by(|a: &f64, b: &f64| SortDirection::Descending.apply(a.total_cmp(b)));
//!
//! assert_eq!(big_first.apply(&amounts), vec![900.0, 500.0, 120.0]);
//! ```

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;
type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

// =============================================================================
// Record Filter
// =============================================================================

/// A reusable predicate over records.
///
/// Business modules implement this on their filter structs; any
/// `Fn(&T) -> bool` closure also qualifies.
pub trait RecordFilter<T> {
    fn matches(&self, record: &T) -> bool;
}

impl<T, F> RecordFilter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, record: &T) -> bool {
        self(record)
    }
}

/// A reusable ordering over records. Module sort enums implement this.
pub trait RecordSort<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

// =============================================================================
// Query
// =============================================================================

/// Filters plus an optional ordering, applied to a full collection.
pub struct Query<'a, T> {
    filters: Vec<Predicate<'a, T>>,
    order: Option<Comparator<'a, T>>,
}

impl<'a, T> Query<'a, T> {
    /// A query that keeps everything in its original order.
    pub fn new() -> Self {
        Query {
            filters: Vec::new(),
            order: None,
        }
    }

    /// Adds a predicate. All predicates must match for a record to be kept.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: RecordFilter<T> + 'a,
    {
        self.filters
            .push(Box::new(move |record: &T| predicate.matches(record)));
        self
    }

    /// Sets the ordering. Sorting is stable, so equal records keep their
    /// collection order.
    pub fn sort_by<C>(mut self, compare: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + 'a,
    {
        self.order = Some(Box::new(compare));
        self
    }

    /// Uses a module sort as the ordering.
    pub fn ordered_by<S>(self, sort: S) -> Self
    where
        S: RecordSort<T> + 'a,
    {
        self.sort_by(move |a, b| sort.compare(a, b))
    }

    /// Orders by a key extracted from each record.
    pub fn sort_by_key<K, F>(self, key: F, direction: SortDirection) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'a,
    {
        self.sort_by(move |a, b| direction.apply(key(a).cmp(&key(b))))
    }

    /// Builds the query a business module describes: its filter and its
    /// sort.
    pub fn from_parts<F, S>(filter: F, sort: S) -> Self
    where
        F: RecordFilter<T> + 'a,
        S: RecordSort<T> + 'a,
    {
        Query::new().filter(filter).ordered_by(sort)
    }

    /// Returns true when the record passes every filter.
    pub fn matches(&self, record: &T) -> bool {
        self.filters.iter().all(|f| f(record))
    }

    /// Applies the query to `records`, returning the matching records in
    /// query order.
    pub fn apply(&self, records: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        let mut out: Vec<T> = records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        if let Some(order) = &self.order {
            out.sort_by(|a, b| order(a, b));
        }
        out
    }
}

impl<T> Default for Query<'_, T> {
    fn default() -> Self {
        Query::new()
    }
}

// =============================================================================
// Sort Direction
// =============================================================================

/// Ascending or descending order for module sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Applies the direction to an ascending comparison result.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

// =============================================================================
// Matching Helpers
// =============================================================================

/// Case-insensitive substring search across several fields.
///
/// A blank needle matches everything, so an empty search box shows the
/// whole collection.
pub fn text_matches<'f, I>(needle: &str, fields: I) -> bool
where
    I: IntoIterator<Item = &'f str>,
{
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// An inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        DateRange { from, to }
    }

    /// The range covering one calendar month.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let from = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(DateRange {
            from: Some(from),
            to: next.pred_opt(),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Total ordering for float fields (amounts) usable in comparators.
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        qty: u32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Bolt", qty: 10 },
            Row { name: "nut", qty: 3 },
            Row { name: "Washer", qty: 10 },
            Row { name: "Bracket", qty: 1 },
        ]
    }

    #[test]
    fn test_empty_query_keeps_order() {
        let q: Query<Row> = Query::new();
        assert_eq!(q.apply(&rows()), rows());
    }

    #[test]
    fn test_filters_are_anded() {
        let q = Query::new()
            .filter(|r: &Row| r.qty >= 3)
            .filter(|r: &Row| r.name.starts_with('B') || r.name.starts_with('n'));
        let names: Vec<_> = q.apply(&rows()).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Bolt", "nut"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let q = Query::new().sort_by_key(|r: &Row| r.qty, SortDirection::Descending);
        let names: Vec<_> = q.apply(&rows()).iter().map(|r| r.name).collect();
        // Bolt and Washer tie on qty and keep collection order
        assert_eq!(names, vec!["Bolt", "Washer", "nut", "Bracket"]);
    }

    #[test]
    fn test_text_matches() {
        assert!(text_matches("", ["anything"]));
        assert!(text_matches("  SHAR ", ["Sharma Traders", "ORD-0001"]));
        assert!(text_matches("0001", ["Sharma Traders", "ORD-0001"]));
        assert!(!text_matches("gupta", ["Sharma Traders"]));
    }

    #[test]
    fn test_date_range() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let march = DateRange::month(2024, 3).unwrap();
        assert!(march.contains(d(2024, 3, 1)));
        assert!(march.contains(d(2024, 3, 31)));
        assert!(!march.contains(d(2024, 4, 1)));

        let december = DateRange::month(2024, 12).unwrap();
        assert_eq!(december.to, Some(d(2024, 12, 31)));

        let open = DateRange::default();
        assert!(open.is_open());
        assert!(open.contains(d(1999, 1, 1)));

        assert!(DateRange::month(2024, 13).is_none());
    }

    #[test]
    fn test_cmp_f64_handles_nan() {
        let mut v = vec![3.0, f64::NAN, 1.0];
        v.sort_by(|a, b| cmp_f64(*a, *b));
        assert_eq!(v[0], 1.0);
        assert!(v[2].is_nan());
    }
}
