use chrono::{Datelike, NaiveDate, Weekday};

use crate::portfolio::performance::Granularity;

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            // Should not happen for typical date ranges
            break;
        }
    }
    days
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

/// True when `date` closes a period of the given granularity.
pub fn is_period_end(date: NaiveDate, granularity: Granularity) -> bool {
    match granularity {
        Granularity::Daily => true,
        Granularity::Weekly => date.weekday() == Weekday::Sun,
        Granularity::Monthly => is_month_end(date),
        Granularity::Quarterly => date.month() % 3 == 0 && is_month_end(date),
        Granularity::Yearly => date.month() == 12 && date.day() == 31,
    }
}

/// Period-end dates strictly inside `(start, end)`, followed by `end`.
pub fn period_end_dates(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut dates: Vec<NaiveDate> = match start.succ_opt() {
        Some(first) => get_days_between(first, end)
            .into_iter()
            .filter(|d| *d < end && is_period_end(*d, granularity))
            .collect(),
        None => Vec::new(),
    };
    dates.push(end);
    dates
}
