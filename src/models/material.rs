//! Supplier material line items and projects.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;

/// A project materials can be scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// One material delivery from a supplier, attributed to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLineItem {
    /// Unique identifier.
    pub id: String,
    /// Project the material was delivered to.
    #[serde(default)]
    pub project_id: String,
    /// Project display name, when the source joined it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Kind of material (e.g. "cement").
    #[serde(default)]
    pub material_type: String,
    /// Quantity delivered.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub quantity: Decimal,
    /// Price per unit.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub price_per_unit: Decimal,
    /// Explicit total; `None` means `quantity × pricePerUnit`.
    #[serde(
        default,
        deserialize_with = "lenient::optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_amount: Option<Decimal>,
    /// Amount of this item paid so far.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub paid_amount: Decimal,
    /// Amount of this item still owed.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub due_amount: Decimal,
    /// When the item was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MaterialLineItem {
    /// Creates an unpaid line item priced at `quantity × price_per_unit`.
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        material_type: impl Into<String>,
        quantity: Decimal,
        price_per_unit: Decimal,
    ) -> Self {
        let total = quantity * price_per_unit;
        Self {
            id: id.into(),
            project_id: project_id.into(),
            project_name: None,
            material_type: material_type.into(),
            quantity,
            price_per_unit,
            total_amount: Some(total),
            paid_amount: Decimal::ZERO,
            due_amount: total,
            created_at: None,
        }
    }

    /// Returns the item's total value: the explicit override if present,
    /// otherwise `quantity × pricePerUnit`.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_ledger::models::MaterialLineItem;
    /// use rust_decimal::Decimal;
    ///
    /// let mut item = MaterialLineItem::new("m1", "p1", "steel", Decimal::new(4, 0), Decimal::new(250, 0));
    /// assert_eq!(item.total(), Decimal::new(1000, 0));
    ///
    /// item.total_amount = Some(Decimal::new(950, 0));
    /// assert_eq!(item.total(), Decimal::new(950, 0));
    /// ```
    pub fn total(&self) -> Decimal {
        self.total_amount
            .unwrap_or_else(|| self.quantity.saturating_mul(self.price_per_unit))
    }

    /// Returns true if the item belongs to the given scope (`None` is every project).
    pub fn in_scope(&self, scope: Option<&str>) -> bool {
        scope.is_none_or(|project_id| self.project_id == project_id)
    }

    /// Returns a copy carrying `paid` with due recomputed as `max(0, total − paid)`.
    ///
    /// The explicit total is filled in so the copy is self-describing in snapshots.
    pub fn with_paid(&self, paid: Decimal) -> Self {
        let total = self.total();
        Self {
            total_amount: Some(total),
            paid_amount: paid,
            due_amount: (total - paid).max(Decimal::ZERO),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_defaults_to_quantity_times_price() {
        let json = r#"{"id": "m1", "projectId": "p1", "quantity": "12.5", "pricePerUnit": 80}"#;
        let item: MaterialLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.total_amount, None);
        assert_eq!(item.total(), Decimal::new(1000, 0));
    }

    #[test]
    fn test_explicit_total_overrides_product() {
        let json = r#"{"id": "m1", "quantity": 10, "pricePerUnit": 10, "totalAmount": 90}"#;
        let item: MaterialLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.total(), Decimal::new(90, 0));
    }

    #[test]
    fn test_with_paid_keeps_conservation() {
        let item = MaterialLineItem::new("m1", "p1", "sand", Decimal::new(10, 0), Decimal::new(300, 0));
        let paid = item.with_paid(Decimal::new(1200, 0));
        assert_eq!(paid.paid_amount + paid.due_amount, paid.total());
        assert_eq!(paid.due_amount, Decimal::new(1800, 0));
    }

    #[test]
    fn test_with_paid_floors_due_at_zero() {
        let item = MaterialLineItem::new("m1", "p1", "sand", Decimal::ONE, Decimal::new(100, 0));
        let paid = item.with_paid(Decimal::new(150, 0));
        assert_eq!(paid.due_amount, Decimal::ZERO);
    }

    #[test]
    fn test_scope_membership() {
        let item = MaterialLineItem::new("m1", "p1", "sand", Decimal::ONE, Decimal::ONE);
        assert!(item.in_scope(None));
        assert!(item.in_scope(Some("p1")));
        assert!(!item.in_scope(Some("p2")));
    }
}
