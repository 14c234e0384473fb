//! Folds the append-only transaction log into per-person totals.
//!
//! The aggregate is the committed truth for what a person has been paid. A
//! freshly fetched supplier record is reconciled against it with
//! [`merge_supplier_with_aggregate`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{MaterialLineItem, PayrollTransaction, Person, Role, TransactionKind};

use super::due_amount::compute_due;

/// The materials snapshot from a person's most recent snapshotting payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestSnapshot {
    /// The transaction that carried the snapshot.
    pub transaction_id: String,
    /// When that payment was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    /// The frozen material line items.
    pub materials: Vec<MaterialLineItem>,
    /// Supply value recorded alongside the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply_value_at_time: Option<Decimal>,
    /// Due amount recorded alongside the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_amount_at_time: Option<Decimal>,
}

/// Totals for one person across the transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonAggregate {
    /// The person.
    pub person_id: String,
    /// Role recorded on the person's transactions.
    pub role: Role,
    /// Sum of all payment and correction amounts.
    pub total_paid: Decimal,
    /// Latest payment date among payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<DateTime<Utc>>,
    /// Number of transactions folded in.
    pub transaction_count: u32,
    /// Most recent materials snapshot, if any payment carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_snapshot: Option<LatestSnapshot>,
}

impl PersonAggregate {
    fn empty(tx: &PayrollTransaction) -> Self {
        Self {
            person_id: tx.person_id.clone(),
            role: tx.role,
            total_paid: Decimal::ZERO,
            last_payment_date: None,
            transaction_count: 0,
            latest_snapshot: None,
        }
    }
}

/// Aggregates transactions by person, optionally keeping only one role.
///
/// Payments and corrections both count toward `total_paid`. Only payments move
/// `last_payment_date`, and only payments carrying a materials snapshot are
/// candidates for `latest_snapshot`: the one with the latest payment date,
/// ties going to the latest `updatedAt` (or `createdAt`).
pub fn aggregate_by_person(
    transactions: &[PayrollTransaction],
    role: Option<Role>,
) -> BTreeMap<String, PersonAggregate> {
    let mut aggregates: BTreeMap<String, PersonAggregate> = BTreeMap::new();
    let mut snapshot_keys: BTreeMap<String, (Option<DateTime<Utc>>, Option<DateTime<Utc>>)> =
        BTreeMap::new();

    for tx in transactions.iter().filter(|tx| role.is_none_or(|r| tx.role == r)) {
        let aggregate = aggregates
            .entry(tx.person_id.clone())
            .or_insert_with(|| PersonAggregate::empty(tx));
        aggregate.total_paid += tx.amount;
        aggregate.transaction_count += 1;

        if tx.kind != TransactionKind::Payment {
            continue;
        }
        if tx.payment_date > aggregate.last_payment_date {
            aggregate.last_payment_date = tx.payment_date;
        }

        let Some(materials) = &tx.materials_snapshot else {
            continue;
        };
        let key = tx.recency_key();
        let newer = snapshot_keys
            .get(&tx.person_id)
            .is_none_or(|current| key >= *current);
        if newer {
            snapshot_keys.insert(tx.person_id.clone(), key);
            aggregate.latest_snapshot = Some(LatestSnapshot {
                transaction_id: tx.id.clone(),
                payment_date: tx.payment_date,
                materials: materials.clone(),
                total_supply_value_at_time: tx.total_supply_value_at_time,
                due_amount_at_time: tx.due_amount_at_time,
            });
        }
    }

    aggregates
}

/// Aggregates supplier transactions only.
pub fn aggregate_suppliers(transactions: &[PayrollTransaction]) -> BTreeMap<String, PersonAggregate> {
    aggregate_by_person(transactions, Some(Role::Supplier))
}

/// Reconciles a fetched person record with its transaction aggregate.
///
/// `totalPaid` takes the larger of the two, since a record's cached total can
/// lag its own history. `lastPaymentDate` prefers the aggregate. For suppliers
/// the latest snapshot's materials replace the record's. The due amount is
/// recomputed from the merged state.
pub fn merge_supplier_with_aggregate(record: &Person, aggregate: Option<&PersonAggregate>) -> Person {
    let mut merged = record.clone();
    let Some(aggregate) = aggregate else {
        return merged;
    };

    merged.total_paid = record.total_paid.max(aggregate.total_paid);
    merged.last_payment_date = aggregate.last_payment_date.or(record.last_payment_date);

    if let (Some(account), Some(snapshot)) = (merged.supplier_mut(), &aggregate.latest_snapshot) {
        account.materials = snapshot.materials.clone();
    }
    merged.due_amount = compute_due(&merged);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonKind, SupplierAccount};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn payment(id: &str, person: &str, role: Role, amount: i64, date: &str) -> PayrollTransaction {
        PayrollTransaction::payment(id, person, role, Decimal::new(amount, 0), at(date))
    }

    fn snapshot_of(total: i64, paid: i64) -> Vec<MaterialLineItem> {
        vec![MaterialLineItem::new("m1", "p1", "cement", Decimal::ONE, Decimal::new(total, 0))
            .with_paid(Decimal::new(paid, 0))]
    }

    #[test]
    fn test_sums_per_person() {
        let txs = vec![
            payment("t1", "s1", Role::Supplier, 1000, "2026-03-01T10:00:00Z"),
            payment("t2", "s1", Role::Supplier, 500, "2026-03-05T10:00:00Z"),
            payment("t3", "c1", Role::Client, 9000, "2026-03-02T10:00:00Z"),
        ];

        let all = aggregate_by_person(&txs, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all["s1"].total_paid, Decimal::new(1500, 0));
        assert_eq!(all["s1"].transaction_count, 2);
        assert_eq!(all["s1"].last_payment_date, Some(at("2026-03-05T10:00:00Z")));

        let suppliers = aggregate_suppliers(&txs);
        assert_eq!(suppliers.len(), 1);
        assert!(suppliers.contains_key("s1"));
    }

    #[test]
    fn test_latest_snapshot_by_payment_date_then_update_time() {
        let mut older = payment("t1", "s1", Role::Supplier, 100, "2026-03-01T10:00:00Z");
        older.materials_snapshot = Some(snapshot_of(1000, 100));
        let mut tie_early = payment("t2", "s1", Role::Supplier, 100, "2026-03-09T10:00:00Z");
        tie_early.materials_snapshot = Some(snapshot_of(1000, 200));
        tie_early.updated_at = Some(at("2026-03-10T10:00:00Z"));
        let mut tie_late = payment("t3", "s1", Role::Supplier, 100, "2026-03-09T10:00:00Z");
        tie_late.materials_snapshot = Some(snapshot_of(1000, 300));
        tie_late.updated_at = Some(at("2026-03-11T10:00:00Z"));
        let no_snapshot = payment("t4", "s1", Role::Supplier, 100, "2026-03-20T10:00:00Z");

        let txs = vec![tie_late, older, no_snapshot, tie_early];
        let aggregate = &aggregate_suppliers(&txs)["s1"];
        let snapshot = aggregate.latest_snapshot.as_ref().unwrap();
        assert_eq!(snapshot.transaction_id, "t3");
        assert_eq!(aggregate.last_payment_date, Some(at("2026-03-20T10:00:00Z")));
    }

    #[test]
    fn test_corrections_count_toward_total_only() {
        let original = payment("t1", "c1", Role::Client, 20000, "2026-03-01T10:00:00Z");
        let mut correction = payment("t2", "c1", Role::Client, -2000, "2026-04-01T10:00:00Z");
        correction.kind = TransactionKind::Correction;
        correction.corrects_id = Some("t1".to_string());
        correction.materials_snapshot = Some(snapshot_of(1, 1));

        let aggregate = &aggregate_by_person(&[original, correction], None)["c1"];
        assert_eq!(aggregate.total_paid, Decimal::new(18000, 0));
        assert_eq!(aggregate.last_payment_date, Some(at("2026-03-01T10:00:00Z")));
        assert!(aggregate.latest_snapshot.is_none());
    }

    #[test]
    fn test_merge_takes_max_and_snapshot_materials() {
        let mut record = Person::new(
            "s1",
            "Cement Co",
            PersonKind::Supplier(SupplierAccount {
                materials: snapshot_of(1000, 0),
                ..SupplierAccount::default()
            }),
        );
        record.total_paid = Decimal::new(100, 0);
        record.last_payment_date = Some(at("2026-02-01T10:00:00Z"));

        let mut tx = payment("t1", "s1", Role::Supplier, 400, "2026-03-01T10:00:00Z");
        tx.materials_snapshot = Some(snapshot_of(1000, 400));
        let aggregates = aggregate_suppliers(&[tx]);

        let merged = merge_supplier_with_aggregate(&record, aggregates.get("s1"));
        assert_eq!(merged.total_paid, Decimal::new(400, 0));
        assert_eq!(merged.last_payment_date, Some(at("2026-03-01T10:00:00Z")));
        assert_eq!(merged.supplier().unwrap().materials[0].paid_amount, Decimal::new(400, 0));
        assert_eq!(merged.due_amount, Decimal::new(600, 0));
    }

    #[test]
    fn test_merge_keeps_larger_record_total() {
        let mut record = Person::new("s1", "Cement Co", PersonKind::Supplier(SupplierAccount::default()));
        record.total_paid = Decimal::new(900, 0);
        let aggregates = aggregate_suppliers(&[payment("t1", "s1", Role::Supplier, 400, "2026-03-01T10:00:00Z")]);

        let merged = merge_supplier_with_aggregate(&record, aggregates.get("s1"));
        assert_eq!(merged.total_paid, Decimal::new(900, 0));
    }

    #[test]
    fn test_merge_without_aggregate_is_unchanged() {
        let record = Person::new("s1", "Cement Co", PersonKind::Supplier(SupplierAccount::default()));
        assert_eq!(merge_supplier_with_aggregate(&record, None), record);
    }
}
