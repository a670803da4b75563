//! # Business Records
//!
//! One submodule per dashboard module. Each defines the persisted record,
//! exactly one filter type and one sort enum, so paging and storage never
//! have to be re-derived per module.
//!
//! ```text
//! ┌──────────────┬───────────────────┬────────┬───────┬──────────────────┐
//! │ module       │ record            │ prefix │ width │ filter / sort    │
//! ├──────────────┼───────────────────┼────────┼───────┼──────────────────┤
//! │ orders       │ Order             │ ORD    │ 4     │ OrderFilter      │
//! │ billing      │ Invoice           │ INV    │ 4     │ InvoiceFilter    │
//! │ stock        │ StockItem         │ STK    │ 3     │ StockFilter      │
//! │ financial    │ FinancialRecord   │ FIN    │ 3     │ LedgerFilter     │
//! │ gst          │ GstFiling         │ GST    │ 3     │ GstFilingFilter  │
//! │ staff        │ StaffMember       │ STF    │ 3     │ StaffFilter      │
//! │ attendance   │ AttendanceEntry   │ ATT    │ 3     │ AttendanceFilter │
//! └──────────────┴───────────────────┴────────┴───────┴──────────────────┘
//! ```
//!
//! Money-bearing records (orders, invoices, ledger entries) compute their
//! tax only through [`compute_gst`](crate::gst::compute_gst).

mod gst_filing;
mod invoice;
mod ledger;
mod order;
mod staff;
mod stock;

pub use gst_filing::{period_of, FilingStatus, GstFiling, GstFilingFilter, GstFilingSort, ReturnType};
pub use invoice::{Invoice, InvoiceFilter, InvoiceSort, PaymentStatus};
pub use ledger::{EntryType, FinancialRecord, LedgerFilter, LedgerSort, LedgerSummary};
pub use order::{Order, OrderFilter, OrderSort, OrderStatus};
pub use staff::{
    AttendanceEntry, AttendanceFilter, AttendanceSort, AttendanceStatus, AttendanceSummary,
    StaffFilter, StaffMember, StaffSort,
};
pub use stock::{StockFilter, StockItem, StockSort, StockStatus};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Line Items
// =============================================================================

/// One billed line on an order or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    /// Pre-tax price per unit, in rupees.
    pub rate: f64,
    /// HSN/SAC code printed on tax invoices.
    #[serde(default)]
    pub hsn_code: Option<String>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        LineItem {
            description: description.into(),
            quantity,
            rate,
            hsn_code: None,
        }
    }

    pub fn with_hsn(mut self, code: impl Into<String>) -> Self {
        self.hsn_code = Some(code.into());
        self
    }

    /// Pre-tax line amount.
    pub fn amount(&self) -> f64 {
        self.quantity * self.rate
    }
}

/// Pre-tax sum of every line.
pub fn subtotal(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::amount).sum()
}

/// Lowercase match for optional free-text categories.
pub(crate) fn same_label(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }
}
