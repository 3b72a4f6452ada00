//! Calendar duration arithmetic and total-tenure aggregation.
//!
//! Per-bond durations use civil semantics: a negative day difference borrows
//! the real length of the month preceding the end date. Totals across bonds
//! use a fixed 30-day month and 12-month year instead, so they will not
//! match a calendar-accurate sum for large aggregates.

use std::borrow::Borrow;

use chrono::{Datelike, Local, NaiveDate};

use crate::types::Duration;

pub const DAYS_PER_MONTH: u32 = 30;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Parse a `DD/MM/YYYY` date. Impossible dates such as `31/02/2020` yield `None`.
pub fn parse_civil_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y").ok()
}

/// Number of days in `month` (1-based) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(DAYS_PER_MONTH)
}

/// Civil difference between two dates; zero if `end` predates `start`.
pub fn civil_diff(start: NaiveDate, end: NaiveDate) -> Duration {
    let mut years = end.year() - start.year();
    let mut months = end.month() as i32 - start.month() as i32;
    let mut days = end.day() as i32 - start.day() as i32;

    if days < 0 {
        months -= 1;
        let (year, month) = if end.month() == 1 {
            (end.year() - 1, 12)
        } else {
            (end.year(), end.month() - 1)
        };
        days += days_in_month(year, month) as i32;
    }

    if months < 0 {
        years -= 1;
        months += 12;
    }

    if years < 0 {
        return Duration::ZERO;
    }

    Duration::new(years as u32, months as u32, days.max(0) as u32)
}

/// Duration from `start` to `end`, or to the current local date when `end` is absent.
pub fn calculate_date_diff(start: &str, end: Option<&str>) -> Duration {
    calculate_date_diff_at(start, end, Local::now().date_naive())
}

/// Like [`calculate_date_diff`], with an explicit "today".
pub fn calculate_date_diff_at(start: &str, end: Option<&str>, today: NaiveDate) -> Duration {
    let start = match parse_civil_date(start) {
        Some(d) => d,
        None => return Duration::ZERO,
    };
    let end = match end {
        Some(s) => match parse_civil_date(s) {
            Some(d) => d,
            None => return Duration::ZERO,
        },
        None => today,
    };
    civil_diff(start, end)
}

/// Render a duration as e.g. `"2 anos, 1 mês, 5 dias"`; all-zero renders `"0 dias"`.
pub fn format_duration(d: &Duration) -> String {
    if d.is_zero() {
        return "0 dias".to_string();
    }
    let mut parts = Vec::new();
    if d.years > 0 {
        parts.push(format!("{} {}", d.years, if d.years == 1 { "ano" } else { "anos" }));
    }
    if d.months > 0 {
        parts.push(format!("{} {}", d.months, if d.months == 1 { "mês" } else { "meses" }));
    }
    if d.days > 0 {
        parts.push(format!("{} {}", d.days, if d.days == 1 { "dia" } else { "dias" }));
    }
    parts.join(", ")
}

/// Sum durations with the default 30-day month / 12-month year normalization.
pub fn sum_durations<D: Borrow<Duration>>(durations: impl IntoIterator<Item = D>) -> Duration {
    sum_durations_with(durations, DAYS_PER_MONTH, MONTHS_PER_YEAR)
}

/// Sum each component independently, then carry whole blocks upwards.
pub fn sum_durations_with<D: Borrow<Duration>>(
    durations: impl IntoIterator<Item = D>,
    days_per_month: u32,
    months_per_year: u32,
) -> Duration {
    let (mut years, mut months, mut days) = (0u32, 0u32, 0u32);
    for d in durations {
        let d = d.borrow();
        years = years.saturating_add(d.years);
        months = months.saturating_add(d.months);
        days = days.saturating_add(d.days);
    }

    let days_per_month = days_per_month.max(1);
    let months_per_year = months_per_year.max(1);

    months = months.saturating_add(days / days_per_month);
    days %= days_per_month;
    years = years.saturating_add(months / months_per_year);
    months %= months_per_year;

    Duration::new(years, months, days)
}
