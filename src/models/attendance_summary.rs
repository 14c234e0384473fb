//! Computed monthly attendance views.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::YearMonth;

/// What a calendar cell shows for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMark {
    /// Padding day belonging to the previous or next month.
    OutsideMonth,
    /// Weekly rest day (Sunday by default).
    RestDay,
    /// A day after today.
    Future,
    /// Marked present.
    Present,
    /// Marked on duty.
    OnDuty,
    /// Approved paid leave.
    PaidLeave,
    /// Approved unpaid leave.
    UnpaidLeave,
    /// Leave awaiting a decision.
    PendingLeave,
    /// Absent without approved leave.
    Absent,
    /// No attendance record.
    Unmarked,
}

/// One cell of the 6-week calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    /// The day this cell shows.
    pub date: NaiveDate,
    /// Whether the day belongs to the aggregated month.
    pub in_month: bool,
    /// The cell's classification.
    pub mark: DayMark,
    /// Leave reason for tooltip display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_reason: Option<String>,
    /// Leave approval state for tooltip display; `None` while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_approved: Option<bool>,
}

/// Monthly attendance counters and the derived salary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCounters {
    /// Days marked present.
    pub present: u32,
    /// Days marked on duty.
    pub on_duty: u32,
    /// Days of approved paid leave.
    pub paid_leave: u32,
    /// Days of approved unpaid leave.
    pub unpaid_leave: u32,
    /// Days of leave awaiting approval.
    pub pending_leave: u32,
    /// Days absent without approved leave.
    pub absent: u32,
    /// Non-rest days of the month up to and including today.
    pub total_working_days: u32,
    /// `present + on_duty + paid_leave`.
    pub effective_days: u32,
    /// Rounded percentage of working days that were effective.
    pub attendance_rate: u32,
    /// `effective_days × daily_rate`.
    pub monthly_salary: Decimal,
}

/// A person's aggregated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAttendance {
    /// The person aggregated.
    pub person_id: String,
    /// The month aggregated.
    pub month: YearMonth,
    /// The daily rate the salary was derived from.
    pub daily_rate: Decimal,
    /// Counters for the month.
    pub counters: AttendanceCounters,
    /// 42 cells, six Sunday-first weeks covering the month.
    pub calendar: Vec<CalendarCell>,
}
