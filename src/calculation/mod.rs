//! Calculation logic for the site ledger engine.
//!
//! Every function here is a pure transform over explicit records: attendance
//! classification and monthly aggregation, shift pay, due amounts per role,
//! the supplier material ledger with pluggable allocation, transaction
//! aggregation, payment application, and reconciliation of polled state.

mod allocation_policy;
mod attendance_classifier;
mod due_amount;
mod monthly_attendance;
mod payment_applier;
mod reconciliation;
mod shift_accounting;
mod supplier_ledger;
mod transaction_aggregator;

pub use allocation_policy::{
    AllocationPolicy, DueWeighted, FifoByCreatedAt, ManualAllocation, ProportionalToValue,
};
pub use attendance_classifier::{classify_absence, normalize_status, record_status};
pub use due_amount::{compute_due, daily_rate};
pub use monthly_attendance::{
    CALENDAR_CELLS, aggregate_month, attendance_rate, summarize_month, total_working_days,
};
pub use payment_applier::{
    CORRECTION_FLOORED, CommitFailure, CommitReport, DECREASE_REJECTED, PaymentOutcome,
    UNALLOCATED_CREDIT, apply_checked, apply_correction, apply_payment, commit, compensate,
    effective_amount,
};
pub use reconciliation::{merge_people, merge_transactions};
pub use shift_accounting::{
    ShiftAccrual, accrue_shifts, clamp_shift, daily_pay, max_shifts_per_day, round_to_half,
};
pub use supplier_ledger::{ProjectDue, Reallocation, ScopedTotals, SupplierLedger};
pub use transaction_aggregator::{
    LatestSnapshot, PersonAggregate, aggregate_by_person, aggregate_suppliers,
    merge_supplier_with_aggregate,
};
