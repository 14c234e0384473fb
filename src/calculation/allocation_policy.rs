//! Allocation policies for spreading a supplier payment across materials.
//!
//! A policy decides how much of a scoped paid total each material line item
//! carries. [`SupplierLedger::reallocate`](super::SupplierLedger::reallocate)
//! then applies the amounts and recomputes due figures, so swapping policies
//! never touches due-calculation call sites.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::MaterialLineItem;

/// Decides per-item paid amounts for a new scoped paid total.
///
/// Implementations must return one amount per item, in item order, each
/// within `0..=item.total()`.
pub trait AllocationPolicy: Send + Sync {
    /// Short identifier used in config and audit output.
    fn name(&self) -> &'static str;

    /// Allocates `new_total_paid` over `items`, rounding to `scale` places.
    fn allocate(
        &self,
        items: &[&MaterialLineItem],
        new_total_paid: Decimal,
        scale: u32,
    ) -> Vec<Decimal>;
}

/// Splits in proportion to each item's share of total value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalToValue;

/// Pays the oldest items in full first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoByCreatedAt;

/// Keeps existing payments and spreads only the increase, in proportion to
/// each item's outstanding due.
#[derive(Debug, Clone, Copy, Default)]
pub struct DueWeighted;

/// Leaves per-item paid amounts as entered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualAllocation;

fn round_money(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Distributes `target` by `weights`, rounding each share and giving the
/// rounding residual to the heaviest weight so the shares sum to `target`.
fn distribute(weights: &[Decimal], target: Decimal, scale: u32) -> Vec<Decimal> {
    let weight_total = weights
        .iter()
        .fold(Decimal::ZERO, |acc, w| acc.saturating_add(*w));
    if weight_total <= Decimal::ZERO || target <= Decimal::ZERO {
        return vec![Decimal::ZERO; weights.len()];
    }

    // Multiply before dividing so exact splits stay exact; divide first when
    // the product would overflow.
    let mut shares: Vec<Decimal> = weights
        .iter()
        .map(|w| {
            let share = w
                .checked_mul(target)
                .map(|product| product / weight_total)
                .unwrap_or_else(|| *w / weight_total * target);
            round_money(share, scale)
        })
        .collect();

    let residual = target - shares.iter().copied().sum::<Decimal>();
    if residual != Decimal::ZERO {
        let heaviest = weights
            .iter()
            .enumerate()
            .fold(0, |best, (i, w)| if *w > weights[best] { i } else { best });
        shares[heaviest] += residual;
    }
    shares
}

fn cap(amount: Decimal, item: &MaterialLineItem) -> Decimal {
    amount.clamp(Decimal::ZERO, item.total().max(Decimal::ZERO))
}

impl AllocationPolicy for ProportionalToValue {
    fn name(&self) -> &'static str {
        "proportional"
    }

    fn allocate(
        &self,
        items: &[&MaterialLineItem],
        new_total_paid: Decimal,
        scale: u32,
    ) -> Vec<Decimal> {
        let totals: Vec<Decimal> = items.iter().map(|m| m.total().max(Decimal::ZERO)).collect();
        let scoped_total = totals
            .iter()
            .fold(Decimal::ZERO, |acc, t| acc.saturating_add(*t));
        // Overpayment is not spread past each item's value.
        let target = new_total_paid.min(scoped_total);

        distribute(&totals, target, scale)
            .into_iter()
            .zip(items)
            .map(|(share, item)| cap(share, item))
            .collect()
    }
}

impl AllocationPolicy for FifoByCreatedAt {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn allocate(
        &self,
        items: &[&MaterialLineItem],
        new_total_paid: Decimal,
        scale: u32,
    ) -> Vec<Decimal> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        // Items without a timestamp go last; ties keep input order.
        order.sort_by_key(|&i| (items[i].created_at.is_none(), items[i].created_at, i));

        let mut remaining = round_money(new_total_paid.max(Decimal::ZERO), scale);
        let mut paid = vec![Decimal::ZERO; items.len()];
        for i in order {
            let take = remaining.min(items[i].total().max(Decimal::ZERO));
            paid[i] = take;
            remaining -= take;
        }
        paid
    }
}

impl AllocationPolicy for DueWeighted {
    fn name(&self) -> &'static str {
        "due_weighted"
    }

    fn allocate(
        &self,
        items: &[&MaterialLineItem],
        new_total_paid: Decimal,
        scale: u32,
    ) -> Vec<Decimal> {
        let current: Vec<Decimal> = items.iter().map(|m| cap(m.paid_amount, m)).collect();
        let dues: Vec<Decimal> = items
            .iter()
            .zip(&current)
            .map(|(m, paid)| (m.total() - *paid).max(Decimal::ZERO))
            .collect();
        let due_total: Decimal = dues.iter().copied().sum();
        let increase = new_total_paid - current.iter().copied().sum::<Decimal>();

        // A decrease or a fully paid scope has no due to weight by.
        if increase <= Decimal::ZERO || due_total <= Decimal::ZERO {
            return ProportionalToValue.allocate(items, new_total_paid, scale);
        }

        distribute(&dues, increase.min(due_total), scale)
            .into_iter()
            .zip(current)
            .zip(items)
            .map(|((extra, paid), item)| cap(paid + extra, item))
            .collect()
    }
}

impl AllocationPolicy for ManualAllocation {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn allocate(
        &self,
        items: &[&MaterialLineItem],
        _new_total_paid: Decimal,
        _scale: u32,
    ) -> Vec<Decimal> {
        items.iter().map(|m| cap(m.paid_amount, m)).collect()
    }
}
