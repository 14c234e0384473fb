//! Attendance status normalization and absence classification.
//!
//! Attendance statuses arrive as free text typed or picked in several UIs
//! ("Present", "on_duty", "OD", ...). Everything downstream works on the
//! canonical [`AttendanceStatus`] produced here.

use crate::models::{AbsenceClass, AttendanceRecord, AttendanceStatus};

/// Normalizes a raw status string, falling back to the boolean presence flag.
///
/// Matching is case-insensitive and ignores surrounding whitespace; `_`, `-`
/// and `.` are treated as spaces. A string that matches nothing defers to
/// `present_flag` (`true` → Present, `false` → Absent). With neither a
/// recognized string nor a flag there is no record, and `None` is returned.
///
/// # Examples
///
/// ```
/// use site_ledger::calculation::normalize_status;
/// use site_ledger::models::AttendanceStatus;
///
/// assert_eq!(normalize_status(Some("ON DUTY"), None), Some(AttendanceStatus::OnDuty));
/// assert_eq!(normalize_status(Some("on_duty"), None), Some(AttendanceStatus::OnDuty));
/// assert_eq!(normalize_status(Some("od"), None), Some(AttendanceStatus::OnDuty));
/// assert_eq!(normalize_status(Some("???"), Some(true)), Some(AttendanceStatus::Present));
/// assert_eq!(normalize_status(Some("???"), None), None);
/// ```
pub fn normalize_status(raw: Option<&str>, present_flag: Option<bool>) -> Option<AttendanceStatus> {
    raw.and_then(match_status).or(match present_flag {
        Some(true) => Some(AttendanceStatus::Present),
        Some(false) => Some(AttendanceStatus::Absent),
        None => None,
    })
}

fn match_status(raw: &str) -> Option<AttendanceStatus> {
    let folded: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.') { ' ' } else { c })
        .collect();
    let key = folded.split_whitespace().collect::<Vec<_>>().join(" ");

    match key.as_str() {
        "present" | "p" | "yes" | "true" | "1" | "attended" => Some(AttendanceStatus::Present),
        "on duty" | "onduty" | "od" | "o d" | "duty" => Some(AttendanceStatus::OnDuty),
        "absent" | "a" | "no" | "false" | "0" | "leave" => Some(AttendanceStatus::Absent),
        _ => None,
    }
}

/// Returns the canonical status of a stored record.
pub fn record_status(record: &AttendanceRecord) -> Option<AttendanceStatus> {
    normalize_status(record.status.as_deref(), record.present)
}

/// Classifies an absent day by its leave decision.
///
/// Approved and paid is paid leave, approved and unpaid is unpaid leave, no
/// decision yet is pending, and an explicit refusal is a plain absence.
/// Called on a record that is not absent, this still returns the class its
/// leave fields describe.
pub fn classify_absence(record: &AttendanceRecord) -> AbsenceClass {
    match record.is_leave_approved {
        Some(true) if record.is_leave_paid => AbsenceClass::PaidLeave,
        Some(true) => AbsenceClass::UnpaidLeave,
        None => AbsenceClass::PendingLeave,
        Some(false) => AbsenceClass::AbsentNoLeave,
    }
}
