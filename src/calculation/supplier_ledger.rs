//! Supplier material ledger.
//!
//! A supplier's obligation is the value of the materials they delivered,
//! optionally narrowed to one project. This module computes scoped paid and
//! due figures and reallocates a changed paid total across the scoped items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MaterialLineItem, Person};

use super::allocation_policy::AllocationPolicy;

/// Paid and total figures for one scope of a supplier's materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedTotals {
    /// Value of the materials in scope.
    pub scoped_total: Decimal,
    /// Amount paid against the materials in scope.
    pub scoped_paid: Decimal,
    /// Value of every material, regardless of scope.
    pub all_materials_total: Decimal,
    /// True when `scoped_paid` was derived from the supplier's aggregate
    /// total because no per-item payments were recorded.
    pub proportional_fallback: bool,
}

impl ScopedTotals {
    /// `max(0, scoped_total − scoped_paid)`.
    pub fn due(&self) -> Decimal {
        (self.scoped_total - self.scoped_paid).max(Decimal::ZERO)
    }
}

/// Due figures for one project of a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDue {
    /// The project.
    pub project_id: String,
    /// Project display name, taken from the first item that has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Number of line items delivered to the project.
    pub material_count: u32,
    /// Value delivered to the project.
    pub total: Decimal,
    /// Amount paid against the project.
    pub paid: Decimal,
    /// Amount still owed for the project.
    pub due: Decimal,
}

/// The outcome of spreading a new paid total over a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reallocation {
    /// Name of the policy that decided the split.
    pub policy: String,
    /// The project scope, `None` for all materials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Value of the materials in scope.
    pub scoped_total: Decimal,
    /// The paid total requested for the scope.
    pub new_total_paid: Decimal,
    /// Sum of per-item paid amounts after reallocation.
    pub allocated: Decimal,
    /// Paid amount the scope could not absorb (overpayment or unassigned).
    pub unallocated_credit: Decimal,
    /// Every material; items outside the scope are unchanged.
    pub materials: Vec<MaterialLineItem>,
}

impl Reallocation {
    /// The reallocated items inside the scope.
    pub fn in_scope_materials(&self) -> impl Iterator<Item = &MaterialLineItem> {
        let scope = self.scope.as_deref();
        self.materials.iter().filter(move |m| m.in_scope(scope))
    }
}

/// A read-only view over a supplier's materials and aggregate paid total.
#[derive(Debug, Clone, Copy)]
pub struct SupplierLedger<'a> {
    materials: &'a [MaterialLineItem],
    total_paid: Decimal,
}

impl<'a> SupplierLedger<'a> {
    /// Creates a ledger over `materials` with the supplier's aggregate `total_paid`.
    pub fn new(materials: &'a [MaterialLineItem], total_paid: Decimal) -> Self {
        Self {
            materials,
            total_paid,
        }
    }

    /// Creates the ledger for a supplier, or `None` for other roles.
    pub fn of(person: &'a Person) -> Option<Self> {
        person
            .supplier()
            .map(|account| Self::new(&account.materials, person.total_paid))
    }

    /// Value of every material.
    pub fn all_materials_total(&self) -> Decimal {
        self.materials.iter().map(MaterialLineItem::total).sum()
    }

    /// Computes paid and total figures for `scope` (`None` is every project).
    ///
    /// Explicit per-item payments are used when any exist. Otherwise the
    /// aggregate paid total is apportioned by the scope's share of value.
    pub fn scoped_totals(&self, scope: Option<&str>) -> ScopedTotals {
        let (scoped_total, scoped_paid_explicit) = self
            .materials
            .iter()
            .filter(|m| m.in_scope(scope))
            .fold((Decimal::ZERO, Decimal::ZERO), |(total, paid), m| {
                (total + m.total(), paid + m.paid_amount)
            });
        let all_materials_total = self.all_materials_total();

        let (scoped_paid, proportional_fallback) = if scoped_paid_explicit > Decimal::ZERO {
            (scoped_paid_explicit, false)
        } else if self.total_paid > Decimal::ZERO && all_materials_total > Decimal::ZERO {
            (scoped_total * self.total_paid / all_materials_total, true)
        } else {
            (Decimal::ZERO, false)
        };

        ScopedTotals {
            scoped_total,
            scoped_paid,
            all_materials_total,
            proportional_fallback,
        }
    }

    /// `max(0, scoped total − scoped paid)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_ledger::calculation::SupplierLedger;
    /// use site_ledger::models::MaterialLineItem;
    /// use rust_decimal::Decimal;
    ///
    /// let materials = vec![
    ///     MaterialLineItem::new("m1", "p1", "cement", Decimal::ONE, Decimal::new(10000, 0)),
    ///     MaterialLineItem::new("m2", "p2", "sand", Decimal::ONE, Decimal::new(5000, 0)),
    /// ];
    /// let ledger = SupplierLedger::new(&materials, Decimal::new(6000, 0));
    /// assert_eq!(ledger.compute_due(None), Decimal::new(9000, 0));
    /// assert_eq!(ledger.compute_due(Some("p2")), Decimal::new(3000, 0));
    /// ```
    pub fn compute_due(&self, scope: Option<&str>) -> Decimal {
        self.scoped_totals(scope).due()
    }

    /// Due figures for each project, in order of first appearance.
    pub fn project_breakdown(&self) -> Vec<ProjectDue> {
        let mut projects: Vec<ProjectDue> = Vec::new();
        for item in self.materials {
            match projects.iter_mut().find(|p| p.project_id == item.project_id) {
                Some(project) => {
                    project.material_count += 1;
                    if project.project_name.is_none() {
                        project.project_name = item.project_name.clone();
                    }
                }
                None => projects.push(ProjectDue {
                    project_id: item.project_id.clone(),
                    project_name: item.project_name.clone(),
                    material_count: 1,
                    total: Decimal::ZERO,
                    paid: Decimal::ZERO,
                    due: Decimal::ZERO,
                }),
            }
        }

        for project in &mut projects {
            let totals = self.scoped_totals(Some(&project.project_id));
            project.total = totals.scoped_total;
            project.paid = totals.scoped_paid;
            project.due = totals.due();
        }
        projects
    }

    /// Spreads `new_total_paid` over the materials in `scope` using `policy`.
    ///
    /// Items outside the scope are returned unchanged. Each reallocated item
    /// gets `due = max(0, total − paid)`, and paid never exceeds an item's
    /// value; whatever the scope cannot absorb is reported as
    /// `unallocated_credit`. An empty or zero-value scope allocates nothing.
    pub fn reallocate(
        &self,
        new_total_paid: Decimal,
        scope: Option<&str>,
        policy: &dyn AllocationPolicy,
        scale: u32,
    ) -> Reallocation {
        let in_scope: Vec<&MaterialLineItem> =
            self.materials.iter().filter(|m| m.in_scope(scope)).collect();
        let scoped_total: Decimal = in_scope.iter().map(|m| m.total()).sum();

        let amounts = if scoped_total > Decimal::ZERO {
            policy.allocate(&in_scope, new_total_paid, scale)
        } else {
            vec![Decimal::ZERO; in_scope.len()]
        };

        let mut next = amounts.iter().copied();
        let materials: Vec<MaterialLineItem> = self
            .materials
            .iter()
            .map(|m| {
                if m.in_scope(scope) {
                    m.with_paid(next.next().unwrap_or(Decimal::ZERO))
                } else {
                    m.clone()
                }
            })
            .collect();

        let allocated: Decimal = amounts.iter().copied().sum();
        let unallocated_credit = (new_total_paid - allocated).max(Decimal::ZERO);

        debug!(
            policy = policy.name(),
            scope = ?scope,
            scoped_total = %scoped_total,
            new_total_paid = %new_total_paid,
            allocated = %allocated,
            unallocated_credit = %unallocated_credit,
            "Reallocated supplier payment"
        );

        Reallocation {
            policy: policy.name().to_string(),
            scope: scope.map(str::to_string),
            scoped_total,
            new_total_paid,
            allocated,
            unallocated_credit,
            materials,
        }
    }
}
