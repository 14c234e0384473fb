//! Turns an edited person record into a committed payment.
//!
//! Applying an edit is pure: it produces the updated person, the transaction
//! to append and an audit trail. [`commit`] then writes both through a
//! [`PayrollStore`]. A failed write is reported, not rolled back; the next read
//! reconciles local state with the store.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, PayrollTransaction, Person, TransactionKind};
use crate::store::PayrollStore;

use super::due_amount::compute_due;
use super::supplier_ledger::{Reallocation, SupplierLedger};

/// Warning code for an edit that tried to lower `totalPaid`.
pub const DECREASE_REJECTED: &str = "DECREASE_REJECTED";

/// Warning code for paid money the supplier's materials could not absorb.
pub const UNALLOCATED_CREDIT: &str = "UNALLOCATED_CREDIT";

/// Warning code for a correction that would take `totalPaid` below zero.
pub const CORRECTION_FLOORED: &str = "CORRECTION_FLOORED";

/// The result of applying an edit or a correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    /// The person as it should now be stored.
    pub updated_person: Person,
    /// The transaction to append, if money moved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<PayrollTransaction>,
    /// How a supplier's paid total was spread over materials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reallocation: Option<Reallocation>,
    /// Steps taken, in order.
    pub audit_trail: Vec<AuditStep>,
    /// Parts of the edit that were refused or need attention.
    pub warnings: Vec<AuditWarning>,
}

fn money(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// Applies an edit of a person record.
///
/// `delta = edited.totalPaid − original.totalPaid`. A positive delta emits a
/// payment transaction dated `now`; for suppliers the in-scope materials are
/// reallocated with the configured policy and the full material list is
/// snapshotted onto the transaction. A negative delta is refused with a
/// [`DECREASE_REJECTED`] warning and `totalPaid` stays at the original value;
/// lowering a total goes through [`compensate`]. The due amount is always
/// recomputed, the version bumped and `updatedAt` set to `now`.
///
/// # Errors
///
/// Returns [`EngineError::PersonMismatch`] when the records have different ids.
pub fn apply_payment(
    original: &Person,
    edited: &Person,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> EngineResult<PaymentOutcome> {
    if original.id != edited.id {
        return Err(EngineError::PersonMismatch {
            original: original.id.clone(),
            edited: edited.id.clone(),
        });
    }

    let delta = edited.total_paid - original.total_paid;
    let mut updated = edited.clone();
    let mut audit_trail = vec![AuditStep {
        step_number: 1,
        rule_id: "payment_delta".to_string(),
        rule_name: "Payment Delta".to_string(),
        input: serde_json::json!({
            "original_total_paid": money(original.total_paid),
            "edited_total_paid": money(edited.total_paid),
        }),
        output: serde_json::json!({ "delta": money(delta) }),
        reasoning: format!(
            "${} - ${} = ${}",
            money(edited.total_paid),
            money(original.total_paid),
            money(delta)
        ),
    }];
    let mut warnings = Vec::new();
    let mut reallocation = None;

    if delta < Decimal::ZERO {
        updated.total_paid = original.total_paid;
        warnings.push(AuditWarning::new(
            DECREASE_REJECTED,
            format!(
                "Total paid cannot decrease from {} to {}; record a correction instead",
                money(original.total_paid),
                money(edited.total_paid)
            ),
            "medium",
        ));
    } else if delta > Decimal::ZERO {
        let policy = config.allocation_policy.policy();
        if let Some(account) = updated.supplier_mut() {
            let scope = account.selected_project_id.clone();
            let ledger = SupplierLedger::new(&account.materials, original.total_paid);
            // A scoped view edits the scope's share; the rest of the ledger keeps its paid.
            let target = match scope.as_deref() {
                Some(project) => ledger.scoped_totals(Some(project)).scoped_paid + delta,
                None => edited.total_paid,
            }
            .round_dp_with_strategy(config.money_scale, RoundingStrategy::MidpointAwayFromZero);

            let result = ledger.reallocate(target, scope.as_deref(), policy, config.money_scale);
            account.materials = result.materials.clone();

            audit_trail.push(AuditStep {
                step_number: 2,
                rule_id: "supplier_reallocation".to_string(),
                rule_name: "Supplier Reallocation".to_string(),
                input: serde_json::json!({
                    "policy": policy.name(),
                    "scope": scope,
                    "scoped_total": money(result.scoped_total),
                    "target_paid": money(target),
                }),
                output: serde_json::json!({
                    "allocated": money(result.allocated),
                    "unallocated_credit": money(result.unallocated_credit),
                }),
                reasoning: format!(
                    "Spread ${} over ${} of materials by {}",
                    money(target),
                    money(result.scoped_total),
                    policy.name()
                ),
            });
            if result.unallocated_credit > Decimal::ZERO {
                warnings.push(AuditWarning::new(
                    UNALLOCATED_CREDIT,
                    format!(
                        "${} exceeds the value of the materials in scope",
                        money(result.unallocated_credit)
                    ),
                    "low",
                ));
            }
            reallocation = Some(result);
        }
    }

    updated.due_amount = compute_due(&updated);
    updated.version = original.version + 1;
    updated.updated_at = Some(now);
    audit_trail.push(due_step(audit_trail.len() as u32 + 1, &updated));

    let transaction = (delta > Decimal::ZERO).then(|| {
        updated.last_payment_date = Some(now);
        let mut tx = PayrollTransaction::payment(
            Uuid::new_v4().to_string(),
            updated.id.clone(),
            updated.role(),
            delta,
            now,
        );
        if let Some(account) = updated.supplier() {
            let ledger = SupplierLedger::new(&account.materials, updated.total_paid);
            tx.materials_snapshot = Some(account.materials.clone());
            tx.snapshot_scope = account.selected_project_id.clone();
            tx.total_supply_value_at_time = Some(ledger.all_materials_total());
            tx.due_amount_at_time = Some(updated.due_amount);
        }
        tx
    });

    debug!(
        person_id = %updated.id,
        delta = %delta,
        due_amount = %updated.due_amount,
        transaction = transaction.is_some(),
        "Applied person edit"
    );

    Ok(PaymentOutcome {
        updated_person: updated,
        transaction,
        reallocation,
        audit_trail,
        warnings,
    })
}

/// Applies an edit only if it was made against the stored version.
///
/// # Errors
///
/// Returns [`EngineError::StaleVersion`] when `original.version` differs from
/// `stored.version`, or any error from [`apply_payment`].
pub fn apply_checked(
    stored: &Person,
    original: &Person,
    edited: &Person,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> EngineResult<PaymentOutcome> {
    if original.version != stored.version {
        return Err(EngineError::StaleVersion {
            person_id: stored.id.clone(),
            expected: stored.version,
            found: original.version,
        });
    }
    apply_payment(stored, edited, now, config)
}

/// What a transaction is currently worth: its own amount plus every
/// correction in `log` that points at it.
pub fn effective_amount(original: &PayrollTransaction, log: &[PayrollTransaction]) -> Decimal {
    log.iter()
        .filter(|t| {
            t.kind == TransactionKind::Correction
                && t.id != original.id
                && t.corrects_id.as_deref() == Some(original.id.as_str())
        })
        .fold(original.amount, |acc, t| acc + t.amount)
}

/// Records a corrected amount for an earlier transaction.
///
/// The original is left as it is. The correction carries the signed
/// difference between `corrected_amount` and the original's effective amount
/// in `log`, and points back at the original. Returns `None` when the
/// effective amount already equals `corrected_amount`, so resubmitting a
/// correction records nothing.
pub fn compensate(
    original: &PayrollTransaction,
    log: &[PayrollTransaction],
    corrected_amount: Decimal,
    now: DateTime<Utc>,
) -> Option<PayrollTransaction> {
    let current = effective_amount(original, log);
    let difference = corrected_amount - current;
    if difference == Decimal::ZERO {
        return None;
    }

    let mut correction = PayrollTransaction::payment(
        Uuid::new_v4().to_string(),
        original.person_id.clone(),
        original.role,
        difference,
        now,
    );
    correction.kind = TransactionKind::Correction;
    correction.corrects_id = Some(original.id.clone());
    correction.notes = Some(format!(
        "Corrects {} from {} to {}",
        original.id,
        money(current),
        money(corrected_amount)
    ));
    Some(correction)
}

/// Applies a correction transaction to the person it belongs to.
///
/// `totalPaid` moves by the correction amount, floored at zero with a
/// [`CORRECTION_FLOORED`] warning. A supplier's materials are reallocated over
/// the new total across all projects.
///
/// # Errors
///
/// Returns [`EngineError::PersonMismatch`] when the correction belongs to
/// someone else.
pub fn apply_correction(
    person: &Person,
    correction: &PayrollTransaction,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> EngineResult<PaymentOutcome> {
    if correction.person_id != person.id {
        return Err(EngineError::PersonMismatch {
            original: person.id.clone(),
            edited: correction.person_id.clone(),
        });
    }

    let mut warnings = Vec::new();
    let corrected_total = person.total_paid + correction.amount;
    let new_total = corrected_total.max(Decimal::ZERO);
    if corrected_total < Decimal::ZERO {
        warnings.push(AuditWarning::new(
            CORRECTION_FLOORED,
            format!(
                "Correction of ${} would take total paid from ${} to ${}; held at $0",
                money(correction.amount),
                money(person.total_paid),
                money(corrected_total)
            ),
            "high",
        ));
    }

    let mut updated = person.clone();
    updated.total_paid = new_total;

    let mut reallocation = None;
    if let Some(account) = updated.supplier_mut() {
        let ledger = SupplierLedger::new(&account.materials, person.total_paid);
        let result = ledger.reallocate(
            new_total,
            None,
            config.allocation_policy.policy(),
            config.money_scale,
        );
        account.materials = result.materials.clone();
        if result.unallocated_credit > Decimal::ZERO {
            warnings.push(AuditWarning::new(
                UNALLOCATED_CREDIT,
                format!(
                    "${} exceeds the value of the supplier's materials",
                    money(result.unallocated_credit)
                ),
                "low",
            ));
        }
        reallocation = Some(result);
    }

    updated.due_amount = compute_due(&updated);
    updated.version = person.version + 1;
    updated.updated_at = Some(now);

    let audit_trail = vec![
        AuditStep {
            step_number: 1,
            rule_id: "correction".to_string(),
            rule_name: "Compensating Correction".to_string(),
            input: serde_json::json!({
                "total_paid": money(person.total_paid),
                "correction": money(correction.amount),
                "corrects_id": correction.corrects_id,
            }),
            output: serde_json::json!({ "total_paid": money(updated.total_paid) }),
            reasoning: format!(
                "${} + ${} = ${}",
                money(person.total_paid),
                money(correction.amount),
                money(updated.total_paid)
            ),
        },
        due_step(2, &updated),
    ];

    Ok(PaymentOutcome {
        updated_person: updated,
        transaction: Some(correction.clone()),
        reallocation,
        audit_trail,
        warnings,
    })
}

fn due_step(step_number: u32, person: &Person) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "due_amount".to_string(),
        rule_name: "Due Amount".to_string(),
        input: serde_json::json!({
            "role": person.role().to_string(),
            "total_paid": money(person.total_paid),
        }),
        output: serde_json::json!({ "due_amount": money(person.due_amount) }),
        reasoning: format!("Due for {} is ${}", person.role(), money(person.due_amount)),
    }
}

/// A write that failed during [`commit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitFailure {
    /// The store operation.
    pub operation: String,
    /// What the store reported.
    pub message: String,
}

/// What [`commit`] managed to write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    /// Whether the outcome's transaction was appended.
    pub transaction_appended: bool,
    /// Whether the updated person was stored.
    pub person_upserted: bool,
    /// Writes that failed.
    pub failures: Vec<CommitFailure>,
}

impl CommitReport {
    /// True when every write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn record_failure(report: &mut CommitReport, operation: &str, error: EngineError) {
    warn!(operation, error = %error, "Ledger write failed");
    report.failures.push(CommitFailure {
        operation: operation.to_string(),
        message: error.to_string(),
    });
}

/// Writes an outcome: the transaction first, then the person.
///
/// Each write is attempted once. Failures are collected in the report and
/// nothing already written is undone.
pub fn commit<S: PayrollStore + ?Sized>(store: &S, outcome: &PaymentOutcome) -> CommitReport {
    let mut report = CommitReport::default();

    if let Some(tx) = &outcome.transaction {
        match store.append_transaction(tx) {
            Ok(()) => report.transaction_appended = true,
            Err(error) => record_failure(&mut report, "append_transaction", error),
        }
    }

    match store.upsert_person(&outcome.updated_person) {
        Ok(()) => report.person_upserted = true,
        Err(error) => record_failure(&mut report, "upsert_person", error),
    }

    report
}
