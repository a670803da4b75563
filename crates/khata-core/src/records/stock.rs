//! Stock items (`STK-001`) and stock movements.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::same_label;
use crate::error::{CoreError, CoreResult};
use crate::gst::{compute_gst, GstBreakdown};
use crate::query::{cmp_f64, text_matches, RecordFilter, RecordSort};
use crate::types::{CollectionSpec, Record};
use crate::validation::validate_amount;

/// Derived stock level, shown as a badge on the stock page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Low,
    OutOfStock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Unit of measure (`pcs`, `kg`, `m`).
    pub unit: String,
    pub quantity: f64,
    /// At or below this quantity the item is flagged as low.
    #[serde(default)]
    pub reorder_level: f64,
    /// Purchase cost per unit, pre-tax.
    pub unit_cost: f64,
    /// Selling price per unit, pre-tax.
    pub selling_price: f64,
    #[serde(default)]
    pub gst_rate: f64,
    #[serde(default)]
    pub hsn_code: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        unit: impl Into<String>,
        quantity: f64,
        unit_cost: f64,
        selling_price: f64,
    ) -> Self {
        let now = Utc::now();
        StockItem {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            unit: unit.into(),
            quantity,
            reorder_level: 0.0,
            unit_cost,
            selling_price,
            gst_rate: 0.0,
            hsn_code: None,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_reorder_level(mut self, level: f64) -> Self {
        self.reorder_level = level;
        self
    }

    pub fn with_gst_rate(mut self, rate: f64) -> Self {
        self.gst_rate = rate;
        self
    }

    pub fn status(&self) -> StockStatus {
        if self.quantity <= 0.0 {
            StockStatus::OutOfStock
        } else if self.quantity <= self.reorder_level {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }

    /// Inventory value at purchase cost.
    pub fn stock_value(&self) -> f64 {
        self.quantity * self.unit_cost
    }

    /// Tax on selling `quantity` units at the selling price.
    pub fn sale_gst(&self, quantity: f64, is_interstate: bool) -> GstBreakdown {
        compute_gst(quantity * self.selling_price, self.gst_rate, is_interstate)
    }

    /// Adds received stock.
    pub fn receive(&mut self, quantity: f64) {
        self.quantity += quantity.max(0.0);
    }

    /// Removes issued stock.
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] for a negative or non-finite quantity
    /// - [`CoreError::InsufficientStock`] when fewer units are on hand
    ///
    /// The quantity is left unchanged on error.
    pub fn issue(&mut self, quantity: f64) -> CoreResult<()> {
        validate_amount("quantity", quantity)?;
        if quantity > self.quantity {
            return Err(CoreError::InsufficientStock {
                item: self.name.clone(),
                available: self.quantity,
                requested: quantity,
            });
        }
        self.quantity -= quantity;
        Ok(())
    }
}

impl Record for StockItem {
    const COLLECTION: CollectionSpec = CollectionSpec::new("stock", "STK", 3);

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// =============================================================================
// Filter & Sort
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockFilter {
    /// Matches id, name or HSN code.
    pub search: String,
    pub category: Option<String>,
    pub status: Option<StockStatus>,
}

impl RecordFilter<StockItem> for StockFilter {
    fn matches(&self, item: &StockItem) -> bool {
        let fields = [
            item.id.as_str(),
            item.name.as_str(),
            item.hsn_code.as_deref().unwrap_or(""),
        ];
        text_matches(&self.search, fields)
            && self
                .category
                .as_deref()
                .map_or(true, |c| same_label(c, &item.category))
            && self.status.map_or(true, |s| item.status() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSort {
    #[default]
    Name,
    Category,
    QuantityLowToHigh,
    QuantityHighToLow,
    ValueHighToLow,
}

impl RecordSort<StockItem> for StockSort {
    fn compare(&self, a: &StockItem, b: &StockItem) -> Ordering {
        match self {
            StockSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            StockSort::Category => a
                .category
                .to_lowercase()
                .cmp(&b.category.to_lowercase())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            StockSort::QuantityLowToHigh => cmp_f64(a.quantity, b.quantity),
            StockSort::QuantityHighToLow => cmp_f64(b.quantity, a.quantity),
            StockSort::ValueHighToLow => cmp_f64(b.stock_value(), a.stock_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::query::Query;

    fn item(id: &str, name: &str, category: &str, qty: f64) -> StockItem {
        StockItem::new(id, name, category, "pcs", qty, 10.0, 15.0).with_reorder_level(5.0)
    }

    #[test]
    fn test_status_levels() {
        assert_eq!(item("STK-001", "Bolt", "Hardware", 50.0).status(), StockStatus::InStock);
        assert_eq!(item("STK-002", "Nut", "Hardware", 5.0).status(), StockStatus::Low);
        assert_eq!(item("STK-003", "Pin", "Hardware", 0.0).status(), StockStatus::OutOfStock);
    }

    #[test]
    fn test_issue_and_receive() {
        let mut bolt = item("STK-001", "Bolt", "Hardware", 3.0);
        let err = bolt.issue(5.0).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(bolt.quantity, 3.0);

        bolt.receive(7.0);
        bolt.issue(4.0).unwrap();
        assert_eq!(bolt.quantity, 6.0);
        assert_eq!(bolt.stock_value(), 60.0);
    }

    #[test]
    fn test_issue_rejects_negative_quantity() {
        let mut bolt = item("STK-001", "Bolt", "Hardware", 3.0);
        let err = bolt.issue(-2.0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Negative { .. })));
        assert!(bolt.issue(f64::NAN).is_err());
        assert_eq!(bolt.quantity, 3.0);

        bolt.issue(0.0).unwrap();
        assert_eq!(bolt.quantity, 3.0);
    }

    #[test]
    fn test_sale_gst() {
        let rod = item("STK-001", "Rod", "Steel", 10.0).with_gst_rate(18.0);
        let gst = rod.sale_gst(4.0, false);
        assert!((gst.taxable_value() - 60.0).abs() < 1e-9);
        assert_eq!(gst.cgst + gst.sgst, gst.gst_amount);
    }

    #[test]
    fn test_filter_by_category_and_status() {
        let items = vec![
            item("STK-001", "Bolt", "Hardware", 50.0),
            item("STK-002", "Nut", "hardware", 2.0),
            item("STK-003", "Sheet", "Steel", 1.0),
        ];
        let filter = StockFilter {
            category: Some("Hardware".into()),
            status: Some(StockStatus::Low),
            ..Default::default()
        };
        let hits = Query::from_parts(filter, StockSort::Name).apply(&items);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "STK-002");

        let by_qty = Query::from_parts(StockFilter::default(), StockSort::QuantityLowToHigh)
            .apply(&items);
        assert_eq!(by_qty[0].id, "STK-003");
    }
}
