//! Tax invoices (`INV-0001`) and their payments.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{subtotal, LineItem, Order};
use crate::error::{CoreError, CoreResult};
use crate::gst::{compute_gst, GstBreakdown};
use crate::query::{cmp_f64, text_matches, DateRange, RecordFilter, RecordSort};
use crate::types::{CollectionSpec, PaymentMethod, Record};
use crate::validation::validate_amount;

/// Half a paisa. Balances below this count as settled.
const SETTLED_EPSILON: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
    Cancelled,
}

/// A tax invoice, optionally raised against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    pub customer_name: String,
    #[serde(default)]
    pub customer_gstin: Option<String>,
    #[serde(default)]
    pub billing_address: Option<String>,
    pub items: Vec<LineItem>,
    pub gst_rate: f64,
    #[serde(default)]
    pub is_interstate: bool,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        items: Vec<LineItem>,
        gst_rate: f64,
        invoice_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Invoice {
            id: id.into(),
            order_id: None,
            customer_name: customer_name.into(),
            customer_gstin: None,
            billing_address: None,
            items,
            gst_rate,
            is_interstate: false,
            invoice_date,
            due_date: None,
            amount_paid: 0.0,
            payment_method: None,
            status: PaymentStatus::Unpaid,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bills an order: copies its customer, lines, rate and supply type.
    pub fn from_order(id: impl Into<String>, order: &Order, invoice_date: NaiveDate) -> Self {
        let mut invoice = Invoice::new(
            id,
            order.customer_name.clone(),
            order.items.clone(),
            order.gst_rate,
            invoice_date,
        );
        invoice.order_id = Some(order.id.clone());
        invoice.customer_gstin = order.customer_gstin.clone();
        invoice.is_interstate = order.is_interstate;
        invoice
    }

    pub fn due_on(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn subtotal(&self) -> f64 {
        subtotal(&self.items)
    }

    pub fn gst(&self) -> GstBreakdown {
        compute_gst(self.subtotal(), self.gst_rate, self.is_interstate)
    }

    pub fn total(&self) -> f64 {
        self.gst().total
    }

    /// Amount still owed. Never negative.
    pub fn balance_due(&self) -> f64 {
        (self.total() - self.amount_paid).max(0.0)
    }

    /// Records a payment and updates the status.
    ///
    /// ## Errors
    /// - [`CoreError::InvalidState`] for a cancelled invoice
    /// - [`CoreError::Validation`] for a negative or non-finite amount
    pub fn record_payment(&mut self, amount: f64, method: PaymentMethod) -> CoreResult<()> {
        if self.status == PaymentStatus::Cancelled {
            return Err(self.invalid_state("record a payment"));
        }
        validate_amount("payment", amount)?;

        self.amount_paid += amount;
        self.payment_method = Some(method);
        self.status = if self.total() - self.amount_paid < SETTLED_EPSILON {
            PaymentStatus::Paid
        } else if self.amount_paid > 0.0 {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Unpaid
        };
        Ok(())
    }

    /// Voids the invoice. Paid invoices cannot be cancelled.
    pub fn cancel(&mut self) -> CoreResult<()> {
        if self.status == PaymentStatus::Paid {
            return Err(self.invalid_state("cancel"));
        }
        self.status = PaymentStatus::Cancelled;
        Ok(())
    }

    /// Past its due date with money still owed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(
            self.status,
            PaymentStatus::Unpaid | PaymentStatus::PartiallyPaid
        ) && self.due_date.is_some_and(|due| today > due)
    }

    fn invalid_state(&self, action: &str) -> CoreError {
        CoreError::InvalidState {
            record: self.id.clone(),
            state: format!("{:?}", self.status).to_lowercase(),
            action: action.to_string(),
        }
    }
}

impl Record for Invoice {
    const COLLECTION: CollectionSpec = CollectionSpec::new("billing", "INV", 4);

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
pub struct InvoiceFilter {
    /// Matches invoice id, order id, customer name or GSTIN.
    pub search: String,
    pub status: Option<PaymentStatus>,
    pub dates: DateRange,
    /// When set, only invoices overdue on this date.
    pub overdue_on: Option<NaiveDate>,
}

impl RecordFilter<Invoice> for InvoiceFilter {
    fn matches(&self, inv: &Invoice) -> bool {
        let fields = [
            inv.id.as_str(),
            inv.order_id.as_deref().unwrap_or(""),
            inv.customer_name.as_str(),
            inv.customer_gstin.as_deref().unwrap_or(""),
        ];
        text_matches(&self.search, fields)
            && self.status.map_or(true, |s| inv.status == s)
            && self.dates.contains(inv.invoice_date)
            && self.overdue_on.map_or(true, |today| inv.is_overdue(today))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceSort {
    #[default]
    Newest,
    Oldest,
    Customer,
    TotalHighToLow,
    BalanceHighToLow,
    /// Earliest due first; invoices without a due date last.
    DueDate,
}

impl RecordSort<Invoice> for InvoiceSort {
    fn compare(&self, a: &Invoice, b: &Invoice) -> Ordering {
        match self {
            InvoiceSort::Newest => b
                .invoice_date
                .cmp(&a.invoice_date)
                .then_with(|| b.id.cmp(&a.id)),
            InvoiceSort::Oldest => a
                .invoice_date
                .cmp(&b.invoice_date)
                .then_with(|| a.id.cmp(&b.id)),
            InvoiceSort::Customer => a
                .customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase()),
            InvoiceSort::TotalHighToLow => cmp_f64(b.total(), a.total()),
            InvoiceSort::BalanceHighToLow => cmp_f64(b.balance_due(), a.balance_due()),
            InvoiceSort::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use crate::records::fixtures::date;

    fn invoice(id: &str, amount: f64) -> Invoice {
        Invoice::new(
            id,
            "Sharma Traders",
            vec![LineItem::new("Rod", 1.0, amount)],
            18.0,
            date(2024, 4, 1),
        )
    }

    #[test]
    fn test_from_order_copies_billing_fields() {
        let order = Order::new(
            "ORD-0007",
            "Gupta & Sons",
            vec![LineItem::new("Sheet", 2.0, 500.0)],
            12.0,
            date(2024, 4, 1),
        )
        .interstate(true);
        let inv = Invoice::from_order("INV-0001", &order, date(2024, 4, 2));
        assert_eq!(inv.order_id.as_deref(), Some("ORD-0007"));
        assert_eq!(inv.gst(), order.gst());
        assert_eq!(inv.gst().igst, 120.0);
    }

    #[test]
    fn test_payments_update_status() {
        let mut inv = invoice("INV-0001", 1000.0);
        assert_eq!(inv.balance_due(), 1180.0);

        inv.record_payment(180.0, PaymentMethod::Upi).unwrap();
        assert_eq!(inv.status, PaymentStatus::PartiallyPaid);
        assert_eq!(inv.balance_due(), 1000.0);

        inv.record_payment(1000.0, PaymentMethod::Cash).unwrap();
        assert_eq!(inv.status, PaymentStatus::Paid);
        assert_eq!(inv.balance_due(), 0.0);
        assert!(inv.cancel().is_err());
    }

    #[test]
    fn test_rejects_bad_payments() {
        let mut inv = invoice("INV-0001", 100.0);
        assert!(matches!(
            inv.record_payment(-5.0, PaymentMethod::Cash),
            Err(CoreError::Validation(_))
        ));
        inv.cancel().unwrap();
        assert!(matches!(
            inv.record_payment(5.0, PaymentMethod::Cash),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_overdue_filter_and_due_sort() {
        let a = invoice("INV-0001", 100.0).due_on(date(2024, 4, 10));
        let b = invoice("INV-0002", 100.0).due_on(date(2024, 4, 30));
        let c = invoice("INV-0003", 100.0);
        let all = vec![c.clone(), b.clone(), a.clone()];

        let overdue = InvoiceFilter {
            overdue_on: Some(date(2024, 4, 15)),
            ..Default::default()
        };
        let hits = Query::from_parts(overdue, InvoiceSort::DueDate).apply(&all);
        assert_eq!(hits, vec![a.clone()]);

        let sorted = Query::from_parts(InvoiceFilter::default(), InvoiceSort::DueDate).apply(&all);
        let ids: Vec<_> = sorted.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["INV-0001", "INV-0002", "INV-0003"]);
    }
}
