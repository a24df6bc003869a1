use chrono::{Datelike, Duration, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::types::CreditCard;

/// today's date as seen by the time provider
pub fn reference_date(time_provider: &SafeTimeProvider) -> NaiveDate {
    time_provider.now().date_naive()
}

/// check for leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

/// `day` in the given month, pulled back to the month's last day when it
/// does not exist there
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, days_in_month(year, month)))
}

/// next calendar date falling on day-of-month `day`, counting `reference`
/// itself as upcoming
pub fn next_occurrence(day: u32, reference: NaiveDate) -> NaiveDate {
    let day = day.clamp(1, 31);

    match clamped_date(reference.year(), reference.month(), day) {
        Some(candidate) if candidate >= reference => candidate,
        _ => {
            let (year, month) = if reference.month() == 12 {
                (reference.year() + 1, 1)
            } else {
                (reference.year(), reference.month() + 1)
            };
            clamped_date(year, month, day).unwrap_or(reference)
        }
    }
}

/// `date` moved back by `days`, but never before `floor`
pub fn days_before(date: NaiveDate, days: u32, floor: NaiveDate) -> NaiveDate {
    let shifted = date
        .checked_sub_signed(Duration::days(days as i64))
        .unwrap_or(floor);
    shifted.max(floor)
}

/// whole days from `from` to `to`, negative if `to` is earlier
pub fn days_until(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// resolved statement and due dates for one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycle {
    pub next_statement_date: NaiveDate,
    pub next_due_date: NaiveDate,
}

impl BillingCycle {
    /// resolve both dates independently against `reference`
    pub fn resolve(card: &CreditCard, reference: NaiveDate) -> Self {
        Self {
            next_statement_date: next_occurrence(card.statement_date, reference),
            next_due_date: next_occurrence(card.due_date, reference),
        }
    }

    /// true when the upcoming due date lands before the upcoming statement,
    /// i.e. the due date belongs to the previous cycle
    pub fn due_precedes_statement(&self) -> bool {
        self.next_due_date < self.next_statement_date
    }

    pub fn days_to_statement(&self, reference: NaiveDate) -> i64 {
        days_until(reference, self.next_statement_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_month_when_not_past() {
        assert_eq!(next_occurrence(20, date(2025, 3, 10)), date(2025, 3, 20));
    }

    #[test]
    fn test_today_counts_as_upcoming() {
        assert_eq!(next_occurrence(10, date(2025, 3, 10)), date(2025, 3, 10));
    }

    #[test]
    fn test_rolls_into_next_month() {
        assert_eq!(next_occurrence(5, date(2025, 3, 10)), date(2025, 4, 5));
        assert_eq!(next_occurrence(5, date(2025, 12, 10)), date(2026, 1, 5));
    }

    #[test]
    fn test_clamps_to_month_end() {
        assert_eq!(next_occurrence(31, date(2025, 2, 15)), date(2025, 2, 28));
        assert_eq!(next_occurrence(31, date(2024, 2, 15)), date(2024, 2, 29));
        assert_eq!(next_occurrence(31, date(2025, 4, 1)), date(2025, 4, 30));

        // rolling forward clamps in the following month too
        assert_eq!(next_occurrence(30, date(2025, 1, 31)), date(2025, 2, 28));
    }

    #[test]
    fn test_never_returns_past_date() {
        let mut reference = date(2024, 1, 1);
        while reference < date(2025, 1, 1) {
            for day in 0..=33 {
                let next = next_occurrence(day, reference);
                assert!(next >= reference, "day {} from {}", day, reference);
                assert!(days_until(reference, next) <= 31);
            }
            reference = reference.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_days_before_respects_floor() {
        let floor = date(2025, 3, 18);
        assert_eq!(days_before(date(2025, 3, 25), 3, floor), date(2025, 3, 22));
        assert_eq!(days_before(date(2025, 3, 20), 3, floor), floor);
    }

    #[test]
    fn test_billing_cycle() {
        let card = crate::types::CreditCard::new(
            "Everyday",
            crate::decimal::Money::from_major(5_000),
            crate::decimal::Money::from_major(1_000),
            25,
            5,
        );
        let cycle = BillingCycle::resolve(&card, date(2025, 3, 10));
        assert_eq!(cycle.next_statement_date, date(2025, 3, 25));
        assert_eq!(cycle.next_due_date, date(2025, 4, 5));
        assert!(!cycle.due_precedes_statement());
        assert_eq!(cycle.days_to_statement(date(2025, 3, 10)), 15);

        let early = BillingCycle::resolve(&card, date(2025, 3, 2));
        assert!(early.due_precedes_statement());
    }

    #[test]
    fn test_reference_date_from_provider() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 6, 30, 23, 0, 0).unwrap(),
        ));
        assert_eq!(reference_date(&time), date(2025, 6, 30));

        let control = time.test_control().unwrap();
        control.advance(Duration::hours(2));
        assert_eq!(reference_date(&time), date(2025, 7, 1));
    }
}
