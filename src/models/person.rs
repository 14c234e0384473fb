//! Person records: employees, supervisors, clients and suppliers.
//!
//! A [`Person`] carries the fields every role shares (identity, contact,
//! payment state) plus a role-tagged [`PersonKind`] holding the role's terms.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

use super::lenient;
use super::MaterialLineItem;

/// The role a person plays on the site.
///
/// Deserializes case-insensitively; unrecognized values become [`Role::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Role {
    /// Site employee.
    Employee,
    /// Site supervisor.
    Supervisor,
    /// Client paying for a project.
    Client,
    /// Material supplier.
    Supplier,
    /// Any role this engine has no due-amount rule for.
    Unknown,
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "employee" => Role::Employee,
            "supervisor" => Role::Supervisor,
            "client" => Role::Client,
            "supplier" => Role::Supplier,
            _ => Role::Unknown,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Employee => write!(f, "employee"),
            Role::Supervisor => write!(f, "supervisor"),
            Role::Client => write!(f, "client"),
            Role::Supplier => write!(f, "supplier"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

/// How an employee or supervisor is paid.
///
/// Unrecognized values deserialize as [`CompensationMode::Monthly`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum CompensationMode {
    /// Fixed monthly salary; `rate` is the salary.
    #[default]
    Monthly,
    /// Paid per shift; `rate` is the per-shift rate.
    Daily,
    /// Fixed contract value; `rate` is the contract amount.
    Contract,
}

impl From<String> for CompensationMode {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" | "shift" | "per_shift" => CompensationMode::Daily,
            "contract" => CompensationMode::Contract,
            _ => CompensationMode::Monthly,
        }
    }
}

/// Pay terms for employees and supervisors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workforce {
    /// How the worker is paid.
    #[serde(default)]
    pub compensation_mode: CompensationMode,
    /// Monthly salary, per-shift rate or contract value depending on the mode.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub rate: Decimal,
    /// Accrued earnings to date for daily workers, supplied by the caller.
    #[serde(
        default,
        deserialize_with = "lenient::optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub accrued_to_date: Option<Decimal>,
}

/// Contract terms for a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTerms {
    /// Total value of the client's project.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub project_total_amount: Decimal,
}

/// A supplier's material ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierAccount {
    /// Material line items across all projects.
    #[serde(default)]
    pub materials: Vec<MaterialLineItem>,
    /// Total value supplied, as stored on the record.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_supply_value: Decimal,
    /// Project the caller is currently viewing. Not persisted state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_project_id: Option<String>,
}

/// Role-specific terms, tagged on the wire by `role`.
///
/// Inside a [`Person`] the tag matches case-insensitively, like [`Role`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum PersonKind {
    /// An employee and their pay terms.
    Employee(Workforce),
    /// A supervisor and their pay terms.
    Supervisor(Workforce),
    /// A client and their project value.
    Client(ClientTerms),
    /// A supplier and their materials.
    Supplier(SupplierAccount),
    /// A role with no known terms.
    #[serde(other)]
    Unknown,
}

/// A person the back office pays or collects from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Postal or site address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Free-form status (e.g. "active").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Amount paid to date.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_paid: Decimal,
    /// Outstanding amount as last computed.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub due_amount: Decimal,
    /// When the most recent payment was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<DateTime<Utc>>,
    /// Optimistic-concurrency version, bumped on every applied edit.
    #[serde(default)]
    pub version: u64,
    /// When the record was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Role and role-specific terms.
    #[serde(flatten, deserialize_with = "deserialize_kind")]
    pub kind: PersonKind,
}

/// Lowercases the `role` tag before matching it to a [`PersonKind`] variant.
fn deserialize_kind<'de, D>(deserializer: D) -> Result<PersonKind, D::Error>
where
    D: Deserializer<'de>,
{
    let mut fields = Map::<String, Value>::deserialize(deserializer)?;
    if let Some(Value::String(role)) = fields.get_mut("role") {
        *role = role.trim().to_ascii_lowercase();
    }
    PersonKind::deserialize(Value::Object(fields)).map_err(de::Error::custom)
}

impl Person {
    /// Creates a person with zeroed payment state.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: PersonKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
            email: None,
            address: None,
            status: None,
            total_paid: Decimal::ZERO,
            due_amount: Decimal::ZERO,
            last_payment_date: None,
            version: 0,
            updated_at: None,
            kind,
        }
    }

    /// Returns the person's role.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_ledger::models::{ClientTerms, Person, PersonKind, Role};
    ///
    /// let client = Person::new("c1", "Acme Builders", PersonKind::Client(ClientTerms::default()));
    /// assert_eq!(client.role(), Role::Client);
    /// ```
    pub fn role(&self) -> Role {
        match self.kind {
            PersonKind::Employee(_) => Role::Employee,
            PersonKind::Supervisor(_) => Role::Supervisor,
            PersonKind::Client(_) => Role::Client,
            PersonKind::Supplier(_) => Role::Supplier,
            PersonKind::Unknown => Role::Unknown,
        }
    }

    /// Returns the pay terms for employees and supervisors.
    pub fn workforce(&self) -> Option<&Workforce> {
        match &self.kind {
            PersonKind::Employee(w) | PersonKind::Supervisor(w) => Some(w),
            _ => None,
        }
    }

    /// Returns the supplier account for suppliers.
    pub fn supplier(&self) -> Option<&SupplierAccount> {
        match &self.kind {
            PersonKind::Supplier(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable access to the supplier account.
    pub fn supplier_mut(&mut self) -> Option<&mut SupplierAccount> {
        match &mut self.kind {
            PersonKind::Supplier(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_monthly_employee() {
        let json = r#"{
            "id": "emp_001",
            "name": "Ravi",
            "role": "employee",
            "compensationMode": "monthly",
            "rate": "13500",
            "totalPaid": 5000
        }"#;

        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.role(), Role::Employee);
        let terms = person.workforce().unwrap();
        assert_eq!(terms.compensation_mode, CompensationMode::Monthly);
        assert_eq!(terms.rate, Decimal::new(13500, 0));
        assert_eq!(person.total_paid, Decimal::new(5000, 0));
        assert_eq!(person.version, 0);
    }

    #[test]
    fn test_deserialize_supplier_with_materials() {
        let json = r#"{
            "id": "sup_001",
            "name": "Cement Co",
            "role": "supplier",
            "totalPaid": "",
            "materials": [
                {"id": "m1", "projectId": "p1", "materialType": "cement", "quantity": 100, "pricePerUnit": "350"}
            ]
        }"#;

        let person: Person = serde_json::from_str(json).unwrap();
        let account = person.supplier().unwrap();
        assert_eq!(account.materials.len(), 1);
        assert_eq!(account.materials[0].total(), Decimal::new(35000, 0));
        assert_eq!(person.total_paid, Decimal::ZERO);
    }

    #[test]
    fn test_unrecognized_role_is_unknown() {
        let json = r#"{"id": "x1", "role": "contractor", "dueAmount": 700}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.role(), Role::Unknown);
        assert_eq!(person.due_amount, Decimal::new(700, 0));
    }

    #[test]
    fn test_role_tag_matches_any_case() {
        let json = r#"{"id": "c1", "role": "Client", "projectTotalAmount": 100000, "totalPaid": 60000}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.role(), Role::Client);
        assert_eq!(
            crate::calculation::compute_due(&person),
            Decimal::new(40000, 0)
        );

        let json = r#"{"id": "s1", "role": " SUPPLIER ", "materials": []}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.role(), Role::Supplier);
        assert!(person.supplier().unwrap().materials.is_empty());
    }

    #[test]
    fn test_unrecognized_compensation_mode_defaults_to_monthly() {
        let json = r#"{"id": "e1", "role": "supervisor", "compensationMode": "weekly"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(
            person.workforce().unwrap().compensation_mode,
            CompensationMode::Monthly
        );
    }

    #[test]
    fn test_serialize_uses_camel_case_and_role_tag() {
        let mut client = Person::new(
            "c1",
            "Acme",
            PersonKind::Client(ClientTerms {
                project_total_amount: Decimal::new(100000, 0),
            }),
        );
        client.total_paid = Decimal::new(40000, 0);

        let value = serde_json::to_value(&client).unwrap();
        assert_eq!(value["role"], "client");
        assert_eq!(value["projectTotalAmount"], "100000");
        assert_eq!(value["totalPaid"], "40000");

        let back: Person = serde_json::from_value(value).unwrap();
        assert_eq!(back, client);
    }

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!(Role::from(" Supplier ".to_string()), Role::Supplier);
        assert_eq!(Role::from("vendor".to_string()), Role::Unknown);
        assert_eq!(Role::Supervisor.to_string(), "supervisor");
    }
}
