//! Monthly attendance aggregation.
//!
//! Turns one person's daily attendance records into a Sunday-first 6-week
//! calendar grid and the month's counters: days present, on duty, on each
//! kind of leave, working days so far, attendance rate and the salary the
//! effective days earn.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::models::{
    AbsenceClass, AttendanceCounters, AttendanceRecord, AttendanceStatus, CalendarCell, DayMark,
    MonthlyAttendance, Person, YearMonth,
};

use super::attendance_classifier::{classify_absence, record_status};
use super::due_amount::daily_rate;

/// Number of cells in the calendar grid (six weeks).
pub const CALENDAR_CELLS: usize = 42;

/// Counts the days of `month` that are neither the rest day nor after `today`.
///
/// # Examples
///
/// ```
/// use site_ledger::calculation::total_working_days;
/// use site_ledger::models::YearMonth;
/// use chrono::{NaiveDate, Weekday};
///
/// // March 2026 has 31 days, of which 5 are Sundays.
/// let march = YearMonth::new(2026, 3).unwrap();
/// let after = NaiveDate::from_ymd_opt(2026, 4, 15).unwrap();
/// assert_eq!(total_working_days(march, after, Weekday::Sun), 26);
///
/// // Mid-month, days after today are not counted yet.
/// let mid = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
/// assert_eq!(total_working_days(march, mid, Weekday::Sun), 6);
/// ```
pub fn total_working_days(month: YearMonth, today: NaiveDate, rest_day: Weekday) -> u32 {
    month
        .days()
        .filter(|d| d.weekday() != rest_day && *d <= today)
        .count() as u32
}

/// Rounded percentage of working days that were effective, 0 when there are none.
///
/// # Examples
///
/// ```
/// use site_ledger::calculation::attendance_rate;
///
/// assert_eq!(attendance_rate(23, 24), 96);
/// assert_eq!(attendance_rate(1, 8), 13);
/// assert_eq!(attendance_rate(5, 0), 0);
/// ```
pub fn attendance_rate(effective_days: u32, total_working_days: u32) -> u32 {
    if total_working_days == 0 {
        return 0;
    }
    // Half-up rounding in integers: floor((200e + w) / 2w) == round(100e / w).
    let numerator = 200 * u64::from(effective_days) + u64::from(total_working_days);
    (numerator / (2 * u64::from(total_working_days))) as u32
}

/// Aggregates one person's month.
///
/// Only records for `person_id` dated inside `month` are considered, and when
/// a day has several records the last one wins. Records on the rest day or
/// after `today` are shown as those days and do not count.
///
/// # Arguments
///
/// * `person_id` - The person to aggregate
/// * `month` - The month to aggregate
/// * `records` - Attendance records; may include other people and months
/// * `daily_rate` - Pay for one effective day
/// * `today` - Days after this date are future days
/// * `rest_day` - The weekly rest day
pub fn aggregate_month(
    person_id: &str,
    month: YearMonth,
    records: &[AttendanceRecord],
    daily_rate: Decimal,
    today: NaiveDate,
    rest_day: Weekday,
) -> MonthlyAttendance {
    let by_day: HashMap<NaiveDate, &AttendanceRecord> = records
        .iter()
        .filter(|r| r.person_id == person_id && month.contains(r.date))
        .map(|r| (r.date, r))
        .collect();

    let first = month.first_day();
    let grid_start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));

    let calendar: Vec<CalendarCell> = grid_start
        .iter_days()
        .take(CALENDAR_CELLS)
        .map(|date| build_cell(date, month, today, rest_day, by_day.get(&date).copied()))
        .collect();

    let mut counters = AttendanceCounters {
        total_working_days: total_working_days(month, today, rest_day),
        ..AttendanceCounters::default()
    };

    for cell in &calendar {
        match cell.mark {
            DayMark::Present => counters.present += 1,
            DayMark::OnDuty => counters.on_duty += 1,
            DayMark::PaidLeave => counters.paid_leave += 1,
            DayMark::UnpaidLeave => counters.unpaid_leave += 1,
            DayMark::PendingLeave => counters.pending_leave += 1,
            DayMark::Absent => counters.absent += 1,
            DayMark::OutsideMonth | DayMark::RestDay | DayMark::Future | DayMark::Unmarked => {}
        }
    }

    counters.effective_days = counters.present + counters.on_duty + counters.paid_leave;
    counters.attendance_rate = attendance_rate(counters.effective_days, counters.total_working_days);
    counters.monthly_salary = Decimal::from(counters.effective_days) * daily_rate;

    MonthlyAttendance {
        person_id: person_id.to_string(),
        month,
        daily_rate,
        counters,
        calendar,
    }
}

/// Aggregates the month for every employee and supervisor in `people`.
///
/// Each person's daily rate is derived from their pay terms.
pub fn summarize_month(
    people: &[Person],
    records: &[AttendanceRecord],
    month: YearMonth,
    today: NaiveDate,
    config: &EngineConfig,
) -> Vec<MonthlyAttendance> {
    people
        .iter()
        .filter(|p| p.workforce().is_some())
        .map(|p| {
            aggregate_month(
                &p.id,
                month,
                records,
                daily_rate(p, config),
                today,
                config.rest_day,
            )
        })
        .collect()
}

// Precedence: outside month > rest day > future > explicit status > leave class > unmarked.
fn build_cell(
    date: NaiveDate,
    month: YearMonth,
    today: NaiveDate,
    rest_day: Weekday,
    record: Option<&AttendanceRecord>,
) -> CalendarCell {
    let in_month = month.contains(date);
    let status = record.and_then(record_status);

    let mark = if !in_month {
        DayMark::OutsideMonth
    } else if date.weekday() == rest_day {
        DayMark::RestDay
    } else if date > today {
        DayMark::Future
    } else {
        match (status, record) {
            (Some(AttendanceStatus::Present), _) => DayMark::Present,
            (Some(AttendanceStatus::OnDuty), _) => DayMark::OnDuty,
            (Some(AttendanceStatus::Absent), Some(r)) => match classify_absence(r) {
                AbsenceClass::PaidLeave => DayMark::PaidLeave,
                AbsenceClass::UnpaidLeave => DayMark::UnpaidLeave,
                AbsenceClass::PendingLeave => DayMark::PendingLeave,
                AbsenceClass::AbsentNoLeave => DayMark::Absent,
            },
            _ => DayMark::Unmarked,
        }
    };

    let leave = record.filter(|_| in_month && status == Some(AttendanceStatus::Absent));

    CalendarCell {
        date,
        in_month,
        mark,
        leave_reason: leave.and_then(|r| r.leave_reason.clone()),
        leave_approved: leave.and_then(|r| r.is_leave_approved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonKind, Workforce};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march() -> YearMonth {
        YearMonth::new(2026, 3).unwrap()
    }

    fn working_days_of_march() -> Vec<NaiveDate> {
        march().days().filter(|d| d.weekday() != Weekday::Sun).collect()
    }

    #[test]
    fn test_grid_is_six_sunday_first_weeks() {
        // 2026-03-01 is a Sunday, so the grid starts on it.
        let result = aggregate_month("e1", march(), &[], Decimal::ZERO, date(2026, 4, 1), Weekday::Sun);
        assert_eq!(result.calendar.len(), CALENDAR_CELLS);
        assert_eq!(result.calendar[0].date, date(2026, 3, 1));
        assert_eq!(result.calendar[0].date.weekday(), Weekday::Sun);
        assert!(result.calendar[31..].iter().all(|c| !c.in_month));
    }

    #[test]
    fn test_grid_pads_from_previous_month() {
        // 2026-04-01 is a Wednesday: three padding days first.
        let april = YearMonth::new(2026, 4).unwrap();
        let result = aggregate_month("e1", april, &[], Decimal::ZERO, date(2026, 5, 1), Weekday::Sun);
        assert_eq!(result.calendar[0].date, date(2026, 3, 29));
        assert_eq!(result.calendar[0].mark, DayMark::OutsideMonth);
        assert_eq!(result.calendar[3].date, date(2026, 4, 1));
        assert!(result.calendar[3].in_month);
    }

    #[test]
    fn test_unmarked_days_are_not_absences() {
        let result = aggregate_month("e1", march(), &[], Decimal::new(450, 0), date(2026, 4, 1), Weekday::Sun);
        assert_eq!(result.counters.absent, 0);
        assert_eq!(result.counters.total_working_days, 26);
        assert_eq!(result.counters.attendance_rate, 0);
        assert!(result
            .calendar
            .iter()
            .filter(|c| c.in_month && c.date.weekday() != Weekday::Sun)
            .all(|c| c.mark == DayMark::Unmarked));
    }

    #[test]
    fn test_rest_day_record_is_ignored() {
        let records = vec![AttendanceRecord::new("e1", date(2026, 3, 1), "present")];
        let result = aggregate_month("e1", march(), &records, Decimal::new(450, 0), date(2026, 4, 1), Weekday::Sun);
        assert_eq!(result.calendar[0].mark, DayMark::RestDay);
        assert_eq!(result.counters.present, 0);
    }

    #[test]
    fn test_future_days_excluded_mid_month() {
        let today = date(2026, 3, 10);
        let records = vec![
            AttendanceRecord::new("e1", date(2026, 3, 9), "present"),
            AttendanceRecord::new("e1", date(2026, 3, 11), "present"),
        ];
        let result = aggregate_month("e1", march(), &records, Decimal::new(450, 0), today, Weekday::Sun);
        // Mar 2..7 and 9..10 are working days so far.
        assert_eq!(result.counters.total_working_days, 8);
        assert_eq!(result.counters.present, 1);
        let cell = result.calendar.iter().find(|c| c.date == date(2026, 3, 11)).unwrap();
        assert_eq!(cell.mark, DayMark::Future);
    }

    #[test]
    fn test_other_people_and_months_are_ignored() {
        let records = vec![
            AttendanceRecord::new("e2", date(2026, 3, 2), "present"),
            AttendanceRecord::new("e1", date(2026, 2, 27), "present"),
            AttendanceRecord::new("e1", date(2026, 3, 2), "present"),
        ];
        let result = aggregate_month("e1", march(), &records, Decimal::ONE, date(2026, 4, 1), Weekday::Sun);
        assert_eq!(result.counters.present, 1);
    }

    #[test]
    fn test_last_record_for_a_day_wins() {
        let records = vec![
            AttendanceRecord::leave("e1", date(2026, 3, 2), None, true, "sick"),
            AttendanceRecord::leave("e1", date(2026, 3, 2), Some(true), true, "sick"),
        ];
        let result = aggregate_month("e1", march(), &records, Decimal::ONE, date(2026, 4, 1), Weekday::Sun);
        assert_eq!(result.counters.pending_leave, 0);
        assert_eq!(result.counters.paid_leave, 1);
    }

    #[test]
    fn test_leave_cells_carry_tooltip_details() {
        let records = vec![AttendanceRecord::leave("e1", date(2026, 3, 3), None, false, "village visit")];
        let result = aggregate_month("e1", march(), &records, Decimal::ONE, date(2026, 4, 1), Weekday::Sun);
        let cell = result.calendar.iter().find(|c| c.date == date(2026, 3, 3)).unwrap();
        assert_eq!(cell.mark, DayMark::PendingLeave);
        assert_eq!(cell.leave_reason.as_deref(), Some("village visit"));
        assert_eq!(cell.leave_approved, None);
    }

    /// Monthly employee at 450/day over 24 working days:
    /// 20 present, 2 on duty, 1 paid leave, 1 unpaid leave.
    #[test]
    fn test_monthly_salary_and_rate() {
        let days = working_days_of_march();
        let today = days[23];
        let mut records = Vec::new();
        for d in &days[..20] {
            records.push(AttendanceRecord::new("e1", *d, "Present"));
        }
        records.push(AttendanceRecord::new("e1", days[20], "on_duty"));
        records.push(AttendanceRecord::new("e1", days[21], "OD"));
        records.push(AttendanceRecord::leave("e1", days[22], Some(true), true, "fever"));
        records.push(AttendanceRecord::leave("e1", days[23], Some(true), false, "errand"));

        let result = aggregate_month("e1", march(), &records, Decimal::new(450, 0), today, Weekday::Sun);
        let c = &result.counters;
        assert_eq!(c.total_working_days, 24);
        assert_eq!(c.present, 20);
        assert_eq!(c.on_duty, 2);
        assert_eq!(c.paid_leave, 1);
        assert_eq!(c.unpaid_leave, 1);
        assert_eq!(c.effective_days, 23);
        assert_eq!(c.attendance_rate, 96);
        assert_eq!(c.monthly_salary, Decimal::new(10350, 0));
    }

    #[test]
    fn test_pending_leave_lowers_rate_against_paid_leave() {
        let days = working_days_of_march();
        let today = days[3];
        let mut base: Vec<AttendanceRecord> = days[..3]
            .iter()
            .map(|d| AttendanceRecord::new("e1", *d, "present"))
            .collect();

        let mut pending = base.clone();
        pending.push(AttendanceRecord::leave("e1", days[3], None, true, "exam"));
        base.push(AttendanceRecord::leave("e1", days[3], Some(true), true, "exam"));

        let paid = aggregate_month("e1", march(), &base, Decimal::ONE, today, Weekday::Sun);
        let pend = aggregate_month("e1", march(), &pending, Decimal::ONE, today, Weekday::Sun);

        assert_eq!(pend.counters.pending_leave, 1);
        assert_eq!(pend.counters.total_working_days, paid.counters.total_working_days);
        assert_eq!(pend.counters.effective_days, 3);
        assert_eq!(paid.counters.attendance_rate, 100);
        assert_eq!(pend.counters.attendance_rate, 75);
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let records = vec![
            AttendanceRecord::new("e1", date(2026, 3, 2), "present"),
            AttendanceRecord::leave("e1", date(2026, 3, 3), Some(true), true, "x"),
        ];
        let first = aggregate_month("e1", march(), &records, Decimal::new(500, 0), date(2026, 3, 31), Weekday::Sun);
        let second = aggregate_month("e1", march(), &records, Decimal::new(500, 0), date(2026, 3, 31), Weekday::Sun);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summarize_month_skips_non_workforce() {
        let employee = Person::new(
            "e1",
            "Ravi",
            PersonKind::Employee(Workforce {
                rate: Decimal::new(15000, 0),
                ..Workforce::default()
            }),
        );
        let client = Person::new("c1", "Acme", PersonKind::Client(Default::default()));
        let records = vec![AttendanceRecord::new("e1", date(2026, 3, 2), "present")];

        let summaries = summarize_month(
            &[employee, client],
            &records,
            march(),
            date(2026, 4, 1),
            &EngineConfig::default(),
        );
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].daily_rate, Decimal::new(500, 0));
        assert_eq!(summaries[0].counters.monthly_salary, Decimal::new(500, 0));
    }
}
