//! Staff (`STF-001`) and daily attendance (`ATT-001`).

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::same_label;
use crate::query::{cmp_f64, text_matches, DateRange, RecordFilter, RecordSort};
use crate::types::{CollectionSpec, Record};

// =============================================================================
// Staff Member
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub monthly_salary: f64,
    #[ts(as = "String")]
    pub joined_on: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl StaffMember {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        monthly_salary: f64,
        joined_on: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        StaffMember {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            phone: None,
            monthly_salary,
            joined_on,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Salary for a month given the payable days worked.
    pub fn salary_for(&self, summary: &AttendanceSummary, days_in_month: u32) -> f64 {
        if days_in_month == 0 {
            return 0.0;
        }
        self.monthly_salary * summary.payable_days() / f64::from(days_in_month)
    }
}

impl Record for StaffMember {
    const COLLECTION: CollectionSpec = CollectionSpec::new("staff", "STF", 3);

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffFilter {
    /// Matches id, name or phone.
    pub search: String,
    pub role: Option<String>,
    pub active_only: bool,
}

impl RecordFilter<StaffMember> for StaffFilter {
    fn matches(&self, s: &StaffMember) -> bool {
        let fields = [
            s.id.as_str(),
            s.name.as_str(),
            s.phone.as_deref().unwrap_or(""),
        ];
        text_matches(&self.search, fields)
            && self.role.as_deref().map_or(true, |r| same_label(r, &s.role))
            && (!self.active_only || s.active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffSort {
    #[default]
    Name,
    Role,
    JoinedNewest,
    SalaryHighToLow,
}

impl RecordSort<StaffMember> for StaffSort {
    fn compare(&self, a: &StaffMember, b: &StaffMember) -> Ordering {
        match self {
            StaffSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            StaffSort::Role => a
                .role
                .to_lowercase()
                .cmp(&b.role.to_lowercase())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            StaffSort::JoinedNewest => b.joined_on.cmp(&a.joined_on),
            StaffSort::SalaryHighToLow => cmp_f64(b.monthly_salary, a.monthly_salary),
        }
    }
}

// =============================================================================
// Attendance
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    HalfDay,
    /// Paid leave.
    Leave,
}

impl AttendanceStatus {
    /// Fraction of a day this status pays.
    pub fn payable_fraction(&self) -> f64 {
        match self {
            AttendanceStatus::Present | AttendanceStatus::Leave => 1.0,
            AttendanceStatus::HalfDay => 0.5,
            AttendanceStatus::Absent => 0.0,
        }
    }
}

/// One staff member's attendance for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub id: String,
    pub staff_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub check_in: Option<NaiveTime>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceEntry {
    pub fn new(
        id: impl Into<String>,
        staff_id: impl Into<String>,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        let now = Utc::now();
        AttendanceEntry {
            id: id.into(),
            staff_id: staff_id.into(),
            date,
            status,
            check_in: None,
            check_out: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_times(mut self, check_in: NaiveTime, check_out: NaiveTime) -> Self {
        self.check_in = Some(check_in);
        self.check_out = Some(check_out);
        self
    }

    /// Hours between check-in and check-out. Zero if either is missing or
    /// check-out precedes check-in.
    pub fn hours_worked(&self) -> f64 {
        match (self.check_in, self.check_out) {
            (Some(start), Some(end)) if end > start => {
                (end - start).num_minutes() as f64 / 60.0
            }
            _ => 0.0,
        }
    }
}

impl Record for AttendanceEntry {
    const COLLECTION: CollectionSpec = CollectionSpec::new("attendance", "ATT", 3);

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Day counts for one staff member over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present: u32,
    pub absent: u32,
    pub half_days: u32,
    pub leave: u32,
}

impl AttendanceSummary {
    pub fn for_staff(entries: &[AttendanceEntry], staff_id: &str, range: DateRange) -> Self {
        entries
            .iter()
            .filter(|e| e.staff_id == staff_id && range.contains(e.date))
            .fold(AttendanceSummary::default(), |mut s, e| {
                match e.status {
                    AttendanceStatus::Present => s.present += 1,
                    AttendanceStatus::Absent => s.absent += 1,
                    AttendanceStatus::HalfDay => s.half_days += 1,
                    AttendanceStatus::Leave => s.leave += 1,
                }
                s
            })
    }

    pub fn days_marked(&self) -> u32 {
        self.present + self.absent + self.half_days + self.leave
    }

    pub fn payable_days(&self) -> f64 {
        f64::from(self.present + self.leave) + f64::from(self.half_days) * 0.5
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceFilter {
    pub staff_id: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub dates: DateRange,
}

impl RecordFilter<AttendanceEntry> for AttendanceFilter {
    fn matches(&self, e: &AttendanceEntry) -> bool {
        self.staff_id.as_deref().map_or(true, |id| e.staff_id == id)
            && self.status.map_or(true, |s| e.status == s)
            && self.dates.contains(e.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceSort {
    #[default]
    Newest,
    Oldest,
    /// By staff id, then date.
    Staff,
}

impl RecordSort<AttendanceEntry> for AttendanceSort {
    fn compare(&self, a: &AttendanceEntry, b: &AttendanceEntry) -> Ordering {
        match self {
            AttendanceSort::Newest => b.date.cmp(&a.date).then_with(|| a.staff_id.cmp(&b.staff_id)),
            AttendanceSort::Oldest => a.date.cmp(&b.date).then_with(|| a.staff_id.cmp(&b.staff_id)),
            AttendanceSort::Staff => a.staff_id.cmp(&b.staff_id).then_with(|| a.date.cmp(&b.date)),
        }
    }
}
