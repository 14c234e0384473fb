//! Request bodies for the ledger API.
//!
//! Every endpoint takes a JSON body in the same camelCase record shapes the
//! engine stores, so callers pass records through without reshaping them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AllocationPolicyKind;
use crate::models::lenient;
use crate::models::{AttendanceRecord, PayrollTransaction, Person, Role, ShiftRecord, YearMonth};

/// Body for `POST /attendance/monthly`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAttendanceRequest {
    /// The person whose month is aggregated.
    pub person_id: String,
    /// The month, as `YYYY-MM`.
    pub month: YearMonth,
    /// Attendance records; records for other people or months are ignored.
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    /// Pay per effective day. Derived from `person` when absent.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub daily_rate: Option<Decimal>,
    /// The person record, used to derive the daily rate.
    #[serde(default)]
    pub person: Option<Person>,
    /// The current date; defaults to today in UTC.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Body for `POST /attendance/summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryRequest {
    /// The month, as `YYYY-MM`.
    pub month: YearMonth,
    /// Everyone to consider; only employees and supervisors are summarized.
    #[serde(default)]
    pub people: Vec<Person>,
    /// Attendance records for all people.
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    /// The current date; defaults to today in UTC.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Body for `POST /shifts/daily-pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPayRequest {
    /// Entered shift count, before clamping.
    #[serde(deserialize_with = "lenient::decimal")]
    pub shift_count: Decimal,
    /// Pay per shift.
    #[serde(deserialize_with = "lenient::decimal")]
    pub per_shift_rate: Decimal,
}

/// Body for `POST /shifts/accrue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrueShiftsRequest {
    /// The person accrued for.
    pub person_id: String,
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range, inclusive.
    pub to: NaiveDate,
    /// Shift records; only the person's records in range count.
    #[serde(default)]
    pub records: Vec<ShiftRecord>,
}

/// Body for `POST /due`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueRequest {
    /// People to compute due amounts for.
    pub people: Vec<Person>,
}

/// Body for `POST /suppliers/due`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDueRequest {
    /// The supplier.
    pub supplier: Person,
    /// Project scope; overrides the record's `selectedProjectId` when given.
    #[serde(default)]
    pub scope_project_id: Option<String>,
}

/// Body for `POST /suppliers/reallocate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReallocateRequest {
    /// The supplier.
    pub supplier: Person,
    /// The paid total to spread over the scope.
    #[serde(deserialize_with = "lenient::decimal")]
    pub new_total_paid: Decimal,
    /// Project scope; `None` spreads over every material.
    #[serde(default)]
    pub scope_project_id: Option<String>,
    /// Policy override; defaults to the configured policy.
    #[serde(default)]
    pub policy: Option<AllocationPolicyKind>,
}

/// Body for `POST /transactions/aggregate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    /// The transaction log.
    #[serde(default)]
    pub transactions: Vec<PayrollTransaction>,
    /// Only aggregate transactions of this role.
    #[serde(default)]
    pub role: Option<Role>,
    /// Fetched records to reconcile against their aggregates.
    #[serde(default)]
    pub records: Vec<Person>,
}

/// Body for `POST /payments/apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPaymentRequest {
    /// The record as it was before editing.
    pub original: Person,
    /// The record after editing.
    pub edited: Person,
}

/// Body for `POST /transactions/compensate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensateRequest {
    /// Id of the logged transaction being corrected.
    pub transaction_id: String,
    /// What the transaction should be worth.
    #[serde(deserialize_with = "lenient::decimal")]
    pub corrected_amount: Decimal,
    /// The person as the caller last read them. When the store holds the
    /// person this must carry the stored version.
    #[serde(default)]
    pub person: Option<Person>,
}

/// Body for `POST /sync/people`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPeopleRequest {
    /// Records held locally.
    #[serde(default)]
    pub local: Vec<Person>,
    /// Records just fetched from the server.
    #[serde(default)]
    pub remote: Vec<Person>,
    /// Transaction log to reconcile suppliers against, if fetched.
    #[serde(default)]
    pub transactions: Vec<PayrollTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_monthly_attendance_request() {
        let json = r#"{
            "personId": "emp_001",
            "month": "2026-03",
            "dailyRate": "450",
            "today": "2026-03-31",
            "records": [
                {"personId": "emp_001", "date": "2026-03-02", "status": "Present"}
            ]
        }"#;

        let request: MonthlyAttendanceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.month, YearMonth::new(2026, 3).unwrap());
        assert_eq!(request.daily_rate, Some(Decimal::new(450, 0)));
        assert_eq!(request.records.len(), 1);
        assert!(request.person.is_none());
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        let json = r#"{"personId": "emp_001", "month": "March"}"#;
        assert!(serde_json::from_str::<MonthlyAttendanceRequest>(json).is_err());
    }

    #[test]
    fn test_reallocate_request_policy_override() {
        let json = r#"{
            "supplier": {"id": "s1", "role": "supplier"},
            "newTotalPaid": "9000",
            "policy": "fifo"
        }"#;

        let request: ReallocateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.policy, Some(AllocationPolicyKind::Fifo));
        assert!(request.scope_project_id.is_none());
    }
}
