//! Shift-based daily wage arithmetic.
//!
//! Shift-paid workers log between zero and three shifts a day in half-shift
//! steps. Any entered count is quantized and clamped into that domain before
//! it is paid, so these functions accept every input.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::ShiftRecord;

/// The most shifts payable for one day.
pub fn max_shifts_per_day() -> Decimal {
    Decimal::new(3, 0)
}

/// Rounds to the nearest half, halves rounding away from zero.
///
/// # Examples
///
/// ```
/// use site_ledger::calculation::round_to_half;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_half(Decimal::from_str("1.3").unwrap()), Decimal::from_str("1.5").unwrap());
/// assert_eq!(round_to_half(Decimal::from_str("1.2").unwrap()), Decimal::ONE);
/// assert_eq!(round_to_half(Decimal::from_str("1.25").unwrap()), Decimal::from_str("1.5").unwrap());
/// ```
pub fn round_to_half(n: Decimal) -> Decimal {
    let two = Decimal::new(2, 0);
    match n.checked_mul(two) {
        Some(doubled) => {
            doubled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) / two
        }
        // Past half the representable range a value has no fractional digits left.
        None => n,
    }
}

/// Quantizes a shift count to `{0, 0.5, 1, ..., 3}`.
///
/// # Examples
///
/// ```
/// use site_ledger::calculation::clamp_shift;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(clamp_shift(Decimal::from_str("3.7").unwrap()), Decimal::new(3, 0));
/// assert_eq!(clamp_shift(Decimal::from_str("-1").unwrap()), Decimal::ZERO);
/// assert_eq!(clamp_shift(Decimal::from_str("1.3").unwrap()), Decimal::from_str("1.5").unwrap());
/// ```
pub fn clamp_shift(n: Decimal) -> Decimal {
    let bounded = n.clamp(Decimal::NEGATIVE_ONE, max_shifts_per_day() + Decimal::ONE);
    round_to_half(bounded).clamp(Decimal::ZERO, max_shifts_per_day())
}

/// Pay for one day: the clamped shift count times the per-shift rate.
///
/// Saturates at the bounds of [`Decimal`] instead of overflowing.
pub fn daily_pay(shift_count: Decimal, per_shift_rate: Decimal) -> Decimal {
    clamp_shift(shift_count).saturating_mul(per_shift_rate)
}

/// Shift earnings accrued over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAccrual {
    /// The person accrued for.
    pub person_id: String,
    /// Days with a non-zero clamped shift count.
    pub shift_days: u32,
    /// Sum of clamped shift counts.
    pub total_shifts: Decimal,
    /// Sum of daily pay.
    pub accrued_amount: Decimal,
}

/// Folds a person's shift records between `from` and `to` (inclusive) into
/// accrued earnings.
///
/// One record counts per day; when a day appears more than once the later
/// record in `records` replaces the earlier one.
pub fn accrue_shifts(
    records: &[ShiftRecord],
    person_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> ShiftAccrual {
    let mut per_day: Vec<(NaiveDate, Decimal, Decimal)> = Vec::new();

    for record in records
        .iter()
        .filter(|r| r.person_id == person_id && r.date >= from && r.date <= to)
    {
        let shifts = clamp_shift(record.shift_count);
        let pay = daily_pay(record.shift_count, record.per_shift_rate);
        match per_day.iter_mut().find(|(d, _, _)| *d == record.date) {
            Some(entry) => *entry = (record.date, shifts, pay),
            None => per_day.push((record.date, shifts, pay)),
        }
    }

    ShiftAccrual {
        person_id: person_id.to_string(),
        shift_days: per_day.iter().filter(|(_, s, _)| *s > Decimal::ZERO).count() as u32,
        total_shifts: per_day.iter().map(|(_, s, _)| *s).sum(),
        accrued_amount: per_day
            .iter()
            .fold(Decimal::ZERO, |acc, (_, _, p)| acc.saturating_add(*p)),
    }
}
