//! Customer orders (`ORD-0001`).

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{subtotal, LineItem};
use crate::gst::{compute_gst, GstBreakdown};
use crate::query::{cmp_f64, text_matches, DateRange, RecordFilter, RecordSort};
use crate::types::{CollectionSpec, Record};

/// Order lifecycle.
///
/// ```text
/// Pending ──► Processing ──► Dispatched ──► Delivered
///    │            │
///    └────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Dispatched,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Still expected to ship.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Processing | OrderStatus::Dispatched
        )
    }

    fn can_move_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Dispatched)
                | (Dispatched, Delivered)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_gstin: Option<String>,
    pub items: Vec<LineItem>,
    pub gst_rate: f64,
    #[serde(default)]
    pub is_interstate: bool,
    #[serde(default)]
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        items: Vec<LineItem>,
        gst_rate: f64,
        order_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Order {
            id: id.into(),
            customer_name: customer_name.into(),
            customer_phone: None,
            customer_gstin: None,
            items,
            gst_rate,
            is_interstate: false,
            status: OrderStatus::Pending,
            order_date,
            delivery_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn interstate(mut self, is_interstate: bool) -> Self {
        self.is_interstate = is_interstate;
        self
    }

    pub fn subtotal(&self) -> f64 {
        subtotal(&self.items)
    }

    pub fn gst(&self) -> GstBreakdown {
        compute_gst(self.subtotal(), self.gst_rate, self.is_interstate)
    }

    /// Tax-inclusive order value.
    pub fn total(&self) -> f64 {
        self.gst().total
    }

    /// Moves the order along its lifecycle.
    ///
    /// ## Errors
    /// [`CoreError::InvalidState`] for a transition the lifecycle does not
    /// allow (e.g. re-opening a delivered order).
    pub fn advance(&mut self, next: OrderStatus) -> crate::CoreResult<()> {
        if !self.status.can_move_to(next) {
            return Err(crate::CoreError::InvalidState {
                record: self.id.clone(),
                state: format!("{:?}", self.status).to_lowercase(),
                action: format!("move to {:?}", next).to_lowercase(),
            });
        }
        self.status = next;
        Ok(())
    }
}

impl Record for Order {
    const COLLECTION: CollectionSpec = CollectionSpec::new("orders", "ORD", 4);

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

/// The orders page filter bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Matches id, customer name or phone.
    pub search: String,
    pub status: Option<OrderStatus>,
    pub dates: DateRange,
    /// Only orders that have not been delivered or cancelled.
    pub open_only: bool,
}

impl RecordFilter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        let fields = [
            order.id.as_str(),
            order.customer_name.as_str(),
            order.customer_phone.as_deref().unwrap_or(""),
        ];
        text_matches(&self.search, fields)
            && self.status.map_or(true, |s| order.status == s)
            && self.dates.contains(order.order_date)
            && (!self.open_only || order.status.is_open())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
    Customer,
    TotalHighToLow,
    TotalLowToHigh,
}

impl RecordSort<Order> for OrderSort {
    fn compare(&self, a: &Order, b: &Order) -> Ordering {
        match self {
            OrderSort::Newest => b.order_date.cmp(&a.order_date).then_with(|| b.id.cmp(&a.id)),
            OrderSort::Oldest => a.order_date.cmp(&b.order_date).then_with(|| a.id.cmp(&b.id)),
            OrderSort::Customer => a
                .customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase()),
            OrderSort::TotalHighToLow => cmp_f64(b.total(), a.total()),
            OrderSort::TotalLowToHigh => cmp_f64(a.total(), b.total()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use crate::records::fixtures::date;
    use crate::CoreError;

    fn order(id: &str, customer: &str, amount: f64, day: u32) -> Order {
        Order::new(
            id,
            customer,
            vec![LineItem::new("Widget", 1.0, amount)],
            18.0,
            date(2024, 3, day),
        )
    }

    #[test]
    fn test_order_gst_goes_through_calculator() {
        let o = Order::new(
            "ORD-0001",
            "Sharma Traders",
            vec![LineItem::new("Rod", 4.0, 250.0)],
            18.0,
            date(2024, 3, 1),
        );
        let gst = o.gst();
        assert_eq!(o.subtotal(), 1000.0);
        assert_eq!(gst.cgst, 90.0);
        assert_eq!(gst.sgst, 90.0);
        assert_eq!(o.total(), 1180.0);

        let inter = o.interstate(true);
        assert_eq!(inter.gst().igst, 180.0);
        assert_eq!(inter.gst().cgst, 0.0);
    }

    #[test]
    fn test_order_lifecycle() {
        let mut o = order("ORD-0001", "A", 100.0, 1);
        o.advance(OrderStatus::Processing).unwrap();
        o.advance(OrderStatus::Dispatched).unwrap();
        let err = o.advance(OrderStatus::Cancelled).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
        o.advance(OrderStatus::Delivered).unwrap();
        assert!(!o.status.is_open());
    }

    #[test]
    fn test_filter_and_sort() {
        let mut orders = vec![
            order("ORD-0001", "Sharma Traders", 500.0, 1),
            order("ORD-0002", "Gupta & Sons", 900.0, 5),
            order("ORD-0003", "Sharma Steel", 100.0, 20),
        ];
        orders[2].status = OrderStatus::Cancelled;

        let filter = OrderFilter {
            search: "sharma".into(),
            ..Default::default()
        };
        let q = Query::from_parts(filter, OrderSort::Newest);
        let ids: Vec<_> = q.apply(&orders).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["ORD-0003", "ORD-0001"]);

        let open = OrderFilter {
            open_only: true,
            ..Default::default()
        };
        let q = Query::from_parts(open, OrderSort::TotalHighToLow);
        let ids: Vec<_> = q.apply(&orders).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["ORD-0002", "ORD-0001"]);

        let early = OrderFilter {
            dates: DateRange::new(None, Some(date(2024, 3, 5))),
            ..Default::default()
        };
        assert_eq!(Query::from_parts(early, OrderSort::Oldest).apply(&orders).len(), 2);
    }

    #[test]
    fn test_order_json_is_camel_case() {
        let json = serde_json::to_value(order("ORD-0001", "A", 1.0, 1)).unwrap();
        assert_eq!(json["customerName"], "A");
        assert_eq!(json["orderDate"], "2024-03-01");
        assert_eq!(json["status"], "pending");
        assert_eq!(Order::COLLECTION.id_format().render(12), "ORD-0012");
    }
}
