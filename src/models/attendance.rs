//! Daily attendance and shift records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;

/// Canonical attendance status after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Worked the day.
    Present,
    /// Compensated duty away from normal tasking.
    OnDuty,
    /// Did not attend.
    Absent,
}

/// How an absent day is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceClass {
    /// Approved and compensated.
    PaidLeave,
    /// Approved but not compensated.
    UnpaidLeave,
    /// Awaiting an approval decision.
    PendingLeave,
    /// Absent without approved leave.
    AbsentNoLeave,
}

/// One person's attendance on one day, as stored.
///
/// `status` is kept raw; the classifier normalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// The person this record belongs to.
    pub person_id: String,
    /// The calendar day.
    pub date: NaiveDate,
    /// Raw status string as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Legacy boolean presence flag, consulted when `status` is unrecognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
    /// Leave approval decision; `None` while undecided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_leave_approved: Option<bool>,
    /// Whether approved leave is paid.
    #[serde(default)]
    pub is_leave_paid: bool,
    /// Reason given for the leave.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_reason: Option<String>,
}

impl AttendanceRecord {
    /// Creates a record with the given raw status and no leave details.
    pub fn new(person_id: impl Into<String>, date: NaiveDate, status: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            date,
            status: Some(status.into()),
            present: None,
            is_leave_approved: None,
            is_leave_paid: false,
            leave_reason: None,
        }
    }

    /// Creates an absent record carrying a leave decision.
    pub fn leave(
        person_id: impl Into<String>,
        date: NaiveDate,
        approved: Option<bool>,
        paid: bool,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            is_leave_approved: approved,
            is_leave_paid: paid,
            leave_reason: Some(reason.into()),
            ..Self::new(person_id, date, "absent")
        }
    }
}

/// Shifts worked by a shift-paid person on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    /// The person this record belongs to.
    pub person_id: String,
    /// The calendar day.
    pub date: NaiveDate,
    /// Shifts worked, as entered (quantized on use).
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub shift_count: Decimal,
    /// Pay per full shift.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub per_shift_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_pending_leave_record() {
        let json = r#"{
            "personId": "emp_001",
            "date": "2026-03-09",
            "status": "Absent",
            "isLeavePaid": false,
            "leaveReason": "family function"
        }"#;

        let record: AttendanceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.is_leave_approved, None);
        assert_eq!(record.leave_reason.as_deref(), Some("family function"));
    }

    #[test]
    fn test_deserialize_shift_record_with_string_count() {
        let json = r#"{"personId": "w1", "date": "2026-03-09", "shiftCount": "1.5", "perShiftRate": 600}"#;
        let record: ShiftRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.shift_count, Decimal::new(15, 1));
        assert_eq!(record.per_shift_rate, Decimal::new(600, 0));
    }

    #[test]
    fn test_leave_constructor() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let record = AttendanceRecord::leave("e1", date, Some(true), true, "sick");
        assert_eq!(record.status.as_deref(), Some("absent"));
        assert_eq!(record.is_leave_approved, Some(true));
        assert!(record.is_leave_paid);
    }
}
