//! Merging freshly polled server state into local state.
//!
//! People merge last-write-wins on `updatedAt`. The transaction log is
//! append-only, so two copies of it merge by union on id.

use std::collections::BTreeMap;

use crate::models::{PayrollTransaction, Person};

/// Merges local and remote person records by id.
///
/// A record present on only one side is kept. Where both sides hold the
/// same id, the later `updatedAt` wins; the remote copy wins ties and any
/// comparison where either timestamp is missing. The result is ordered by id.
///
/// # Examples
///
/// ```
/// use site_ledger::calculation::merge_people;
/// use site_ledger::models::{Person, PersonKind};
///
/// let mut local = Person::new("p1", "Local", PersonKind::Unknown);
/// local.updated_at = Some("2026-03-02T00:00:00Z".parse().unwrap());
/// let mut remote = Person::new("p1", "Remote", PersonKind::Unknown);
/// remote.updated_at = Some("2026-03-01T00:00:00Z".parse().unwrap());
///
/// let merged = merge_people(&[local], &[remote]);
/// assert_eq!(merged[0].name, "Local");
/// ```
pub fn merge_people(local: &[Person], remote: &[Person]) -> Vec<Person> {
    let mut merged: BTreeMap<&str, &Person> = local.iter().map(|p| (p.id.as_str(), p)).collect();

    for incoming in remote {
        let keep_local = merged.get(incoming.id.as_str()).is_some_and(|current| {
            matches!(
                (current.updated_at, incoming.updated_at),
                (Some(local_at), Some(remote_at)) if local_at > remote_at
            )
        });
        if !keep_local {
            merged.insert(incoming.id.as_str(), incoming);
        }
    }

    merged.into_values().cloned().collect()
}

/// Unions two copies of the transaction log.
///
/// Local entries keep their order; remote entries not already present follow
/// in remote order. Entries are never edited, so equal ids are the same entry.
pub fn merge_transactions(
    local: &[PayrollTransaction],
    remote: &[PayrollTransaction],
) -> Vec<PayrollTransaction> {
    let mut merged = local.to_vec();
    for tx in remote {
        if !merged.iter().any(|t| t.id == tx.id) {
            merged.push(tx.clone());
        }
    }
    merged
}
