//! Property tests for the ledger's invariants.

use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use proptest::prelude::*;
use rust_decimal::Decimal;

use site_ledger::calculation::{
    AllocationPolicy, DueWeighted, FifoByCreatedAt, ManualAllocation, ProportionalToValue,
    SupplierLedger, aggregate_by_person, aggregate_month, apply_payment, clamp_shift, commit,
    compensate, compute_due, effective_amount,
};
use site_ledger::config::EngineConfig;
use site_ledger::models::{
    AttendanceRecord, ClientTerms, CompensationMode, MaterialLineItem, PayrollTransaction,
    Person, PersonKind, Role, SupplierAccount, Workforce, YearMonth,
};
use site_ledger::store::{MemoryStore, PayrollStore};

fn decimal_strategy() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000, 0u32..4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn money_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000, 0u32..3).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn material_strategy() -> impl Strategy<Value = MaterialLineItem> {
    (
        0usize..3,
        money_strategy(),
        money_strategy(),
        proptest::option::of(0i64..1000),
    )
        .prop_map(|(project, total, paid, created_offset)| {
            let mut item = MaterialLineItem::new(
                "m",
                format!("p{}", project),
                "cement",
                Decimal::ONE,
                total,
            );
            item.paid_amount = paid;
            item.created_at = created_offset.map(|days| {
                DateTime::<Utc>::UNIX_EPOCH + Duration::days(days)
            });
            item
        })
}

fn workforce_strategy() -> impl Strategy<Value = Workforce> {
    (0usize..3, decimal_strategy(), proptest::option::of(decimal_strategy())).prop_map(
        |(mode, rate, accrued)| Workforce {
            compensation_mode: [
                CompensationMode::Monthly,
                CompensationMode::Daily,
                CompensationMode::Contract,
            ][mode],
            rate,
            accrued_to_date: accrued,
        },
    )
}

fn person_strategy() -> impl Strategy<Value = Person> {
    let kind = prop_oneof![
        workforce_strategy().prop_map(PersonKind::Employee),
        workforce_strategy().prop_map(PersonKind::Supervisor),
        decimal_strategy().prop_map(|total| PersonKind::Client(ClientTerms {
            project_total_amount: total
        })),
        (
            proptest::collection::vec(material_strategy(), 0..6),
            proptest::option::of(0usize..4)
        )
            .prop_map(|(materials, scope)| PersonKind::Supplier(SupplierAccount {
                materials,
                total_supply_value: Decimal::ZERO,
                selected_project_id: scope.map(|p| format!("p{}", p)),
            })),
        Just(PersonKind::Unknown),
    ];
    (kind, decimal_strategy(), decimal_strategy()).prop_map(|(kind, paid, due)| {
        let mut person = Person::new("x", "X", kind);
        person.total_paid = paid;
        person.due_amount = due;
        person
    })
}

fn policies() -> [&'static dyn AllocationPolicy; 4] {
    [&ProportionalToValue, &FifoByCreatedAt, &DueWeighted, &ManualAllocation]
}

proptest! {
    #[test]
    fn due_is_never_negative(person in person_strategy()) {
        prop_assert!(compute_due(&person) >= Decimal::ZERO);
    }

    #[test]
    fn reallocation_conserves_material_value(
        materials in proptest::collection::vec(material_strategy(), 0..8),
        total_paid in money_strategy(),
        new_total_paid in money_strategy(),
        scope in proptest::option::of(0usize..3),
    ) {
        let scope = scope.map(|p| format!("p{}", p));
        let ledger = SupplierLedger::new(&materials, total_paid);
        let epsilon = Decimal::new(1, 6);

        for policy in policies() {
            let result = ledger.reallocate(new_total_paid, scope.as_deref(), policy, 2);
            prop_assert_eq!(result.materials.len(), materials.len());
            for (after, before) in result.materials.iter().zip(&materials) {
                if after.in_scope(scope.as_deref()) {
                    let drift = (after.paid_amount + after.due_amount - after.total()).abs();
                    prop_assert!(drift <= epsilon, "{} left drift {}", policy.name(), drift);
                    prop_assert!(after.paid_amount >= Decimal::ZERO);
                } else {
                    prop_assert_eq!(after, before);
                }
            }
            prop_assert!(result.allocated + result.unallocated_credit >= new_total_paid - epsilon);
        }
    }

    #[test]
    fn clamped_shifts_are_quantized_at_any_magnitude(
        mantissa in any::<i64>(),
        high in any::<u32>(),
        scale in 0u32..=28,
    ) {
        let lo = mantissa as u64;
        let x = Decimal::from_parts(lo as u32, (lo >> 32) as u32, high, mantissa < 0, scale);
        let allowed: Vec<Decimal> = (0..=6).map(|halves| Decimal::new(halves * 5, 1)).collect();
        prop_assert!(allowed.contains(&clamp_shift(x)));
    }

    #[test]
    fn repeated_corrections_settle_on_the_corrected_amount(
        amount in money_strategy(),
        targets in proptest::collection::vec(money_strategy(), 1..6),
    ) {
        let now = "2026-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let original = PayrollTransaction::payment("t1", "c1", Role::Client, amount, now);
        let mut log = vec![original.clone()];

        for target in targets {
            if let Some(correction) = compensate(&original, &log, target, now) {
                log.push(correction);
            }
            prop_assert_eq!(effective_amount(&original, &log), target);
            prop_assert!(compensate(&original, &log, target, now).is_none());
        }
    }

    #[test]
    fn clamped_shifts_are_quantized(x in decimal_strategy()) {
        let clamped = clamp_shift(x);
        let allowed: Vec<Decimal> = (0..=6).map(|halves| Decimal::new(halves * 5, 1)).collect();
        prop_assert!(allowed.contains(&clamped), "{} clamped to {}", x, clamped);
    }

    #[test]
    fn monthly_aggregation_is_idempotent(
        marks in proptest::collection::vec(
            (1u32..=31, 0usize..6, proptest::option::of(any::<bool>()), any::<bool>()),
            0..40,
        ),
        today_day in 1u32..=31,
    ) {
        let month = YearMonth::new(2026, 3).unwrap();
        let statuses = ["present", "On Duty", "absent", "OD", "garbage", "P"];
        let records: Vec<AttendanceRecord> = marks
            .iter()
            .map(|(day, status, approved, paid)| AttendanceRecord {
                is_leave_approved: *approved,
                is_leave_paid: *paid,
                ..AttendanceRecord::new(
                    "e1",
                    NaiveDate::from_ymd_opt(2026, 3, *day).unwrap(),
                    statuses[*status],
                )
            })
            .collect();
        let today = NaiveDate::from_ymd_opt(2026, 3, today_day).unwrap();
        let rate = Decimal::new(450, 0);

        let first = aggregate_month("e1", month, &records, rate, today, Weekday::Sun);
        let second = aggregate_month("e1", month, &records, rate, today, Weekday::Sun);
        prop_assert_eq!(&first.counters, &second.counters);
        prop_assert!(first.counters.effective_days <= first.counters.total_working_days);
    }

    #[test]
    fn transactions_sum_to_total_paid(
        increments in proptest::collection::vec(0i64..50_000, 1..8),
        supplier in any::<bool>(),
    ) {
        let store = MemoryStore::new();
        let config = EngineConfig::default();
        let kind = if supplier {
            PersonKind::Supplier(SupplierAccount {
                materials: vec![
                    MaterialLineItem::new("m1", "p1", "cement", Decimal::ONE, Decimal::new(60000, 0)),
                    MaterialLineItem::new("m2", "p2", "steel", Decimal::ONE, Decimal::new(40000, 0)),
                ],
                ..SupplierAccount::default()
            })
        } else {
            PersonKind::Client(ClientTerms { project_total_amount: Decimal::new(100000, 0) })
        };
        let mut person = Person::new("p", "P", kind);
        let mut now = "2026-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();

        for increment in increments {
            let mut edited = person.clone();
            edited.total_paid += Decimal::new(increment, 2);
            let outcome = apply_payment(&person, &edited, now, &config).unwrap();
            prop_assert!(commit(&store, &outcome).is_clean());
            person = outcome.updated_person;
            now += Duration::hours(1);
        }

        let transactions = store.list_transactions(None).unwrap();
        let logged = aggregate_by_person(&transactions, None)
            .get("p")
            .map(|a| a.total_paid)
            .unwrap_or(Decimal::ZERO);
        prop_assert_eq!(logged, person.total_paid);
    }
}
