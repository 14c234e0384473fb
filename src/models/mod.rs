//! Core data models for the site ledger engine.
//!
//! These are the JSON record shapes exchanged with the CRUD persistence layer,
//! plus the computed views the engine returns.

mod attendance;
mod attendance_summary;
mod audit;
pub(crate) mod lenient;
mod material;
mod month;
mod person;
mod transaction;

pub use attendance::{AbsenceClass, AttendanceRecord, AttendanceStatus, ShiftRecord};
pub use attendance_summary::{AttendanceCounters, CalendarCell, DayMark, MonthlyAttendance};
pub use audit::{AuditStep, AuditWarning};
pub use lenient::parse_decimal;
pub use material::{MaterialLineItem, Project};
pub use month::YearMonth;
pub use person::{
    ClientTerms, CompensationMode, Person, PersonKind, Role, SupplierAccount, Workforce,
};
pub use transaction::{PayrollTransaction, TransactionKind};
