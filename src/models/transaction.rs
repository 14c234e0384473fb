//! Payroll transactions: the append-only payment log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::{MaterialLineItem, Role};

/// Whether a transaction records a payment or corrects an earlier one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money paid.
    #[default]
    Payment,
    /// Signed adjustment to an earlier payment's amount.
    Correction,
}

/// One entry in the payroll log. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollTransaction {
    /// Unique identifier.
    pub id: String,
    /// The person paid.
    pub person_id: String,
    /// The person's role at the time of payment.
    pub role: Role,
    /// Payment or correction.
    #[serde(default)]
    pub kind: TransactionKind,
    /// Amount paid; negative only for corrections that reduce a payment.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub amount: Decimal,
    /// When the payment was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Supplier materials as they stood when the payment was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_snapshot: Option<Vec<MaterialLineItem>>,
    /// Project the payment was scoped to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_scope: Option<String>,
    /// Supplier's total supply value when the payment was recorded.
    #[serde(
        default,
        deserialize_with = "lenient::optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_supply_value_at_time: Option<Decimal>,
    /// Supplier's due amount right after the payment.
    #[serde(
        default,
        deserialize_with = "lenient::optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_amount_at_time: Option<Decimal>,
    /// For corrections, the transaction being corrected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrects_id: Option<String>,
    /// When the record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last written by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PayrollTransaction {
    /// Creates a plain payment with no supplier snapshot.
    pub fn payment(
        id: impl Into<String>,
        person_id: impl Into<String>,
        role: Role,
        amount: Decimal,
        payment_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            person_id: person_id.into(),
            role,
            kind: TransactionKind::Payment,
            amount,
            payment_date: Some(payment_date),
            notes: None,
            materials_snapshot: None,
            snapshot_scope: None,
            total_supply_value_at_time: None,
            due_amount_at_time: None,
            corrects_id: None,
            created_at: Some(payment_date),
            updated_at: None,
        }
    }

    /// Ordering key for "most recent": payment date, then last write time.
    pub fn recency_key(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.payment_date, self.updated_at.or(self.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_supplier_transaction() {
        let json = r#"{
            "id": "tx_1",
            "personId": "sup_1",
            "role": "supplier",
            "amount": "9000",
            "paymentDate": "2026-03-10T09:30:00Z",
            "materialsSnapshot": [{"id": "m1", "projectId": "p1", "totalAmount": 10000, "paidAmount": 6000, "dueAmount": 4000}],
            "dueAmountAtTime": 6000
        }"#;

        let tx: PayrollTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Payment);
        assert_eq!(tx.role, Role::Supplier);
        assert_eq!(tx.amount, Decimal::new(9000, 0));
        assert_eq!(tx.materials_snapshot.as_ref().unwrap().len(), 1);
        assert_eq!(tx.due_amount_at_time, Some(Decimal::new(6000, 0)));
    }

    #[test]
    fn test_recency_key_falls_back_to_created_at() {
        let paid = "2026-03-10T09:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let tx = PayrollTransaction::payment("t", "p", Role::Client, Decimal::ONE, paid);
        assert_eq!(tx.recency_key(), (Some(paid), Some(paid)));
    }
}
