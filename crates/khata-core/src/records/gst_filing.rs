//! Monthly GST returns (`GST-001`) prepared from the period's invoices.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{Invoice, PaymentStatus};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::gst::GstBreakdown;
use crate::query::{cmp_f64, DateRange, RecordFilter, RecordSort};
use crate::types::{CollectionSpec, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    /// Outward supplies.
    Gstr1,
    /// Monthly summary return with tax payment.
    Gstr3b,
}

impl ReturnType {
    pub fn label(&self) -> &'static str {
        match self {
            ReturnType::Gstr1 => "GSTR-1",
            ReturnType::Gstr3b => "GSTR-3B",
        }
    }

    /// Day of the following month the return is due.
    fn due_day(&self) -> u32 {
        match self {
            ReturnType::Gstr1 => 11,
            ReturnType::Gstr3b => 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Draft,
    Filed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GstFiling {
    pub id: String,
    pub return_type: ReturnType,
    pub period_year: i32,
    pub period_month: u32,
    pub taxable_value: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    /// Number of invoices summed into this return.
    pub invoice_count: usize,
    #[serde(default)]
    pub status: FilingStatus,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub filed_on: Option<NaiveDate>,
    /// Acknowledgement reference number issued on filing.
    #[serde(default)]
    pub arn: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl GstFiling {
    /// Drafts a return for `year`/`month` from the invoices dated in that
    /// month. Cancelled invoices are left out.
    ///
    /// ## Errors
    /// [`CoreError::Validation`] for a month outside 1-12.
    pub fn prepare(
        id: impl Into<String>,
        return_type: ReturnType,
        year: i32,
        month: u32,
        invoices: &[Invoice],
    ) -> CoreResult<Self> {
        let period = DateRange::month(year, month).ok_or(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1.0,
            max: 12.0,
        })?;
        let due_date = due_date(return_type, year, month)?;

        let in_period: Vec<&Invoice> = invoices
            .iter()
            .filter(|inv| inv.status != PaymentStatus::Cancelled)
            .filter(|inv| period.contains(inv.invoice_date))
            .collect();
        let tax: GstBreakdown = in_period.iter().map(|inv| inv.gst()).sum();
        let taxable_value: f64 = in_period.iter().map(|inv| inv.subtotal()).sum();

        let now = Utc::now();
        Ok(GstFiling {
            id: id.into(),
            return_type,
            period_year: year,
            period_month: month,
            taxable_value,
            cgst: tax.cgst,
            sgst: tax.sgst,
            igst: tax.igst,
            invoice_count: in_period.len(),
            status: FilingStatus::Draft,
            due_date,
            filed_on: None,
            arn: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn total_tax(&self) -> f64 {
        self.cgst + self.sgst + self.igst
    }

    /// `"03/2024"`, as printed on the return.
    pub fn period_label(&self) -> String {
        format!("{:02}/{}", self.period_month, self.period_year)
    }

    /// Marks the return filed.
    ///
    /// ## Errors
    /// [`CoreError::InvalidState`] if it was already filed.
    pub fn mark_filed(&mut self, filed_on: NaiveDate, arn: impl Into<String>) -> CoreResult<()> {
        if self.status == FilingStatus::Filed {
            return Err(CoreError::InvalidState {
                record: self.id.clone(),
                state: "filed".to_string(),
                action: "file again".to_string(),
            });
        }
        self.status = FilingStatus::Filed;
        self.filed_on = Some(filed_on);
        self.arn = Some(arn.into());
        Ok(())
    }

    /// Filed after the due date, or still a draft past it.
    pub fn is_late(&self, today: NaiveDate) -> bool {
        match self.filed_on {
            Some(filed) => filed > self.due_date,
            None => today > self.due_date,
        }
    }
}

fn due_date(return_type: ReturnType, year: i32, month: u32) -> CoreResult<NaiveDate> {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, return_type.due_day()).ok_or_else(|| {
        CoreError::Validation(ValidationError::InvalidFormat {
            field: "period".to_string(),
            reason: format!("{month:02}/{year} has no due date"),
        })
    })
}

impl Record for GstFiling {
    const COLLECTION: CollectionSpec = CollectionSpec::new("gst", "GST", 3);

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
pub struct GstFilingFilter {
    pub return_type: Option<ReturnType>,
    pub status: Option<FilingStatus>,
    pub year: Option<i32>,
    /// When set, only returns late on this date.
    pub late_on: Option<NaiveDate>,
}

impl RecordFilter<GstFiling> for GstFilingFilter {
    fn matches(&self, f: &GstFiling) -> bool {
        self.return_type.map_or(true, |t| f.return_type == t)
            && self.status.map_or(true, |s| f.status == s)
            && self.year.map_or(true, |y| f.period_year == y)
            && self.late_on.map_or(true, |today| f.is_late(today))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstFilingSort {
    #[default]
    PeriodNewest,
    PeriodOldest,
    DueDate,
    TaxHighToLow,
}

impl RecordSort<GstFiling> for GstFilingSort {
    fn compare(&self, a: &GstFiling, b: &GstFiling) -> Ordering {
        let period = |f: &GstFiling| (f.period_year, f.period_month);
        match self {
            GstFilingSort::PeriodNewest => period(b).cmp(&period(a)),
            GstFilingSort::PeriodOldest => period(a).cmp(&period(b)),
            GstFilingSort::DueDate => a.due_date.cmp(&b.due_date),
            GstFilingSort::TaxHighToLow => cmp_f64(b.total_tax(), a.total_tax()),
        }
    }
}

/// The filing period a date falls in, as `(year, month)`.
pub fn period_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use crate::records::fixtures::date;
    use crate::records::LineItem;

    fn invoices() -> Vec<Invoice> {
        let line = |amount| vec![LineItem::new("Goods", 1.0, amount)];
        let mut cancelled = Invoice::new("INV-0003", "C", line(5000.0), 18.0, date(2024, 3, 20));
        cancelled.cancel().unwrap();
        let mut inter = Invoice::new("INV-0002", "B", line(500.0), 18.0, date(2024, 3, 15));
        inter.is_interstate = true;
        vec![
            Invoice::new("INV-0001", "A", line(1000.0), 18.0, date(2024, 3, 1)),
            inter,
            cancelled,
            Invoice::new("INV-0004", "D", line(700.0), 18.0, date(2024, 4, 1)),
        ]
    }

    #[test]
    fn test_prepare_sums_period_invoices() {
        let filing = GstFiling::prepare("GST-001", ReturnType::Gstr3b, 2024, 3, &invoices()).unwrap();
        assert_eq!(filing.invoice_count, 2);
        assert_eq!(filing.taxable_value, 1500.0);
        assert_eq!(filing.cgst, 90.0);
        assert_eq!(filing.sgst, 90.0);
        assert_eq!(filing.igst, 90.0);
        assert_eq!(filing.total_tax(), 270.0);
        assert_eq!(filing.due_date, date(2024, 4, 20));
        assert_eq!(filing.period_label(), "03/2024");
    }

    #[test]
    fn test_december_due_in_january() {
        let filing = GstFiling::prepare("GST-001", ReturnType::Gstr1, 2024, 12, &[]).unwrap();
        assert_eq!(filing.due_date, date(2025, 1, 11));
        assert_eq!(filing.total_tax(), 0.0);
    }

    #[test]
    fn test_bad_month_is_rejected() {
        let err = GstFiling::prepare("GST-001", ReturnType::Gstr1, 2024, 13, &[]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_filing_and_lateness() {
        let mut filing = GstFiling::prepare("GST-001", ReturnType::Gstr1, 2024, 3, &[]).unwrap();
        assert!(!filing.is_late(date(2024, 4, 11)));
        assert!(filing.is_late(date(2024, 4, 12)));

        filing.mark_filed(date(2024, 4, 10), "AA270324000001").unwrap();
        assert!(!filing.is_late(date(2024, 6, 1)));
        assert!(filing.mark_filed(date(2024, 4, 10), "again").is_err());
    }

    #[test]
    fn test_filter_and_sort() {
        let all = vec![
            GstFiling::prepare("GST-001", ReturnType::Gstr1, 2023, 12, &[]).unwrap(),
            GstFiling::prepare("GST-002", ReturnType::Gstr3b, 2024, 3, &invoices()).unwrap(),
            GstFiling::prepare("GST-003", ReturnType::Gstr1, 2024, 1, &[]).unwrap(),
        ];
        let filter = GstFilingFilter {
            year: Some(2024),
            ..Default::default()
        };
        let hits = Query::from_parts(filter, GstFilingSort::PeriodNewest).apply(&all);
        let ids: Vec<_> = hits.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["GST-002", "GST-003"]);
        assert_eq!(period_of(date(2024, 3, 9)), (2024, 3));
    }
}
