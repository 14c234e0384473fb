//! Due amount computation per person type.
//!
//! `due = obligation − paid`, floored at zero, where the obligation depends on
//! the role: salary or contract value for workers, project value for clients
//! and scoped material value for suppliers.

use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::models::{CompensationMode, Person, PersonKind};

use super::supplier_ledger::SupplierLedger;

/// Computes what is still owed to (or by) a person.
///
/// * Monthly workers owe `salary − totalPaid`.
/// * Daily workers owe `accruedToDate − totalPaid`; the accrual is supplied by
///   the caller (see [`accrue_shifts`](super::accrue_shifts)). Without one the
///   stored due amount stands.
/// * Contract workers owe `contract value − totalPaid`.
/// * Clients owe `projectTotalAmount − totalPaid`.
/// * Suppliers delegate to the ledger, scoped to `selectedProjectId`.
/// * Unknown roles keep their stored due amount.
///
/// The result is never negative.
///
/// # Examples
///
/// ```
/// use site_ledger::calculation::compute_due;
/// use site_ledger::models::{ClientTerms, Person, PersonKind};
/// use rust_decimal::Decimal;
///
/// let mut client = Person::new("c1", "Acme", PersonKind::Client(ClientTerms {
///     project_total_amount: Decimal::new(100000, 0),
/// }));
/// client.total_paid = Decimal::new(60000, 0);
/// assert_eq!(compute_due(&client), Decimal::new(40000, 0));
/// ```
pub fn compute_due(person: &Person) -> Decimal {
    let due = match &person.kind {
        PersonKind::Employee(terms) | PersonKind::Supervisor(terms) => {
            match terms.compensation_mode {
                CompensationMode::Monthly | CompensationMode::Contract => {
                    terms.rate - person.total_paid
                }
                CompensationMode::Daily => match terms.accrued_to_date {
                    Some(accrued) => accrued - person.total_paid,
                    None => person.due_amount,
                },
            }
        }
        PersonKind::Client(terms) => terms.project_total_amount - person.total_paid,
        PersonKind::Supplier(account) => {
            return SupplierLedger::new(&account.materials, person.total_paid)
                .compute_due(account.selected_project_id.as_deref());
        }
        PersonKind::Unknown => person.due_amount,
    };
    due.max(Decimal::ZERO)
}

/// Returns the pay for one effective attendance day.
///
/// Monthly salaries are divided by `monthly_rate_divisor`; daily workers are
/// paid one shift at their rate; contract workers and non-workers earn
/// nothing per day.
pub fn daily_rate(person: &Person, config: &EngineConfig) -> Decimal {
    let Some(terms) = person.workforce() else {
        return Decimal::ZERO;
    };
    match terms.compensation_mode {
        CompensationMode::Monthly if config.monthly_rate_divisor > Decimal::ZERO => {
            terms.rate / config.monthly_rate_divisor
        }
        CompensationMode::Monthly | CompensationMode::Contract => Decimal::ZERO,
        CompensationMode::Daily => terms.rate,
    }
}
