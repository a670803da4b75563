//! Financial ledger entries (`FIN-001`): income and expenses.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::same_label;
use crate::gst::{compute_gst, GstBreakdown};
use crate::query::{cmp_f64, text_matches, DateRange, RecordFilter, RecordSort};
use crate::types::{CollectionSpec, PaymentMethod, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    pub id: String,
    pub entry_type: EntryType,
    pub category: String,
    pub description: String,
    /// Pre-tax amount in rupees.
    pub amount: f64,
    #[serde(default)]
    pub gst_rate: f64,
    #[serde(default)]
    pub is_interstate: bool,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Invoice number, cheque number or UPI reference.
    #[serde(default)]
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl FinancialRecord {
    pub fn new(
        id: impl Into<String>,
        entry_type: EntryType,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        payment_method: PaymentMethod,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        FinancialRecord {
            id: id.into(),
            entry_type,
            category: category.into(),
            description: description.into(),
            amount,
            gst_rate: 0.0,
            is_interstate: false,
            payment_method,
            date,
            reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_gst(mut self, rate: f64, is_interstate: bool) -> Self {
        self.gst_rate = rate;
        self.is_interstate = is_interstate;
        self
    }

    pub fn gst(&self) -> GstBreakdown {
        compute_gst(self.amount, self.gst_rate, self.is_interstate)
    }

    pub fn total(&self) -> f64 {
        self.gst().total
    }

    /// Total with expenses negative, for running balances.
    pub fn signed_total(&self) -> f64 {
        match self.entry_type {
            EntryType::Income => self.total(),
            EntryType::Expense => -self.total(),
        }
    }
}

impl Record for FinancialRecord {
    const COLLECTION: CollectionSpec = CollectionSpec::new("financial", "FIN", 3);

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Period totals for the financial dashboard cards.
///
/// ```text
/// income ─────┐                output gst (on income) ──┐
///             ├─► net                                   ├─► net gst payable
/// expense ────┘                input gst (on expenses) ─┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub output_gst: GstBreakdown,
    pub input_gst: GstBreakdown,
    /// Output tax less input tax credit. Negative means a carry-forward
    /// credit.
    pub net_gst_payable: f64,
}

impl LedgerSummary {
    pub fn summarize<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FinancialRecord>,
    {
        let mut summary = LedgerSummary::default();
        for record in records {
            let gst = record.gst();
            match record.entry_type {
                EntryType::Income => {
                    summary.income += gst.total;
                    summary.output_gst += gst;
                }
                EntryType::Expense => {
                    summary.expense += gst.total;
                    summary.input_gst += gst;
                }
            }
        }
        summary.net = summary.income - summary.expense;
        summary.net_gst_payable = summary.output_gst.gst_amount - summary.input_gst.gst_amount;
        summary
    }
}

// =============================================================================
// Filter & Sort
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Matches id, description or reference.
    pub search: String,
    pub entry_type: Option<EntryType>,
    pub category: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub dates: DateRange,
}

impl RecordFilter<FinancialRecord> for LedgerFilter {
    fn matches(&self, r: &FinancialRecord) -> bool {
        let fields = [
            r.id.as_str(),
            r.description.as_str(),
            r.reference.as_deref().unwrap_or(""),
        ];
        text_matches(&self.search, fields)
            && self.entry_type.map_or(true, |t| r.entry_type == t)
            && self
                .category
                .as_deref()
                .map_or(true, |c| same_label(c, &r.category))
            && self.payment_method.map_or(true, |m| r.payment_method == m)
            && self.dates.contains(r.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSort {
    #[default]
    Newest,
    Oldest,
    AmountHighToLow,
    AmountLowToHigh,
    Category,
}

impl RecordSort<FinancialRecord> for LedgerSort {
    fn compare(&self, a: &FinancialRecord, b: &FinancialRecord) -> Ordering {
        match self {
            LedgerSort::Newest => b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)),
            LedgerSort::Oldest => a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)),
            LedgerSort::AmountHighToLow => cmp_f64(b.total(), a.total()),
            LedgerSort::AmountLowToHigh => cmp_f64(a.total(), b.total()),
            LedgerSort::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        }
    }
}
