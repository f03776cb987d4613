//! Payment date normalization.
//!
//! Numeric dates are read day-first (`31/01/2024`), falling back to
//! month-first only when the day-first reading is not a real date. ISO dates,
//! month-name forms and spreadsheet serial numbers are accepted as well.

use chrono::{Datelike, Duration, NaiveDate};

use crate::data::CellValue;

/// Month-name layouts, tried in order after ordinal suffixes are removed.
const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d-%B-%Y",
    "%d %B, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%A %d %B %Y",
    "%A, %d %B %Y",
];

/// Two-digit years below this pivot are read as 20xx.
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

const MIN_NAMED_YEAR: i32 = 1000;

/// Largest serial accepted as an Excel day number (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Text(text) => parse_date_str(text),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Empty => None,
    }
}

pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let leading = leading_date_token(trimmed);
    parse_numeric_date(leading)
        .or_else(|| parse_compact_iso(leading))
        .or_else(|| parse_named_month(strip_time_of_day(trimmed)))
}

/// Converts an Excel day number (epoch 1899-12-30) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Drops a trailing time component (`2024-01-31T09:00:00`, `31/01/2024 00:00`).
fn leading_date_token(value: &str) -> &str {
    let token = value.split_whitespace().next().unwrap_or(value);
    if token.starts_with(|ch: char| ch.is_ascii_digit()) {
        if let Some((date, _)) = token.split_once('T') {
            return date;
        }
    }
    token
}

/// `31 January 2024 10:00:00 AM` -> `31 January 2024`.
fn strip_time_of_day(value: &str) -> &str {
    let mut rest = value.trim_end();
    while let Some((head, last)) = rest.rsplit_once(char::is_whitespace) {
        let is_time = last.contains(':')
            || last.eq_ignore_ascii_case("am")
            || last.eq_ignore_ascii_case("pm");
        if !is_time {
            break;
        }
        rest = head.trim_end();
    }
    rest
}

fn parse_numeric_date(token: &str) -> Option<NaiveDate> {
    let separator = token.chars().find(|ch| matches!(ch, '/' | '-' | '.'))?;
    let parts = token.split(separator).collect::<Vec<_>>();
    if parts.len() != 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.chars().all(|ch| ch.is_ascii_digit()))
    {
        return None;
    }

    if parts[0].len() == 4 {
        let year = parts[0].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, parts[1].parse().ok()?, parts[2].parse().ok()?);
    }

    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year = expand_year(parts[2])?;
    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

fn parse_compact_iso(token: &str) -> Option<NaiveDate> {
    if token.len() != 8 || !token.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(token, "%Y%m%d").ok()
}

fn parse_named_month(value: &str) -> Option<NaiveDate> {
    let cleaned = strip_ordinals(value);
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    parse_short_named_month(&cleaned).or_else(|| {
        NAMED_MONTH_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
            // `%Y` happily reads `24` as the year 24.
            .filter(|date| date.year() >= MIN_NAMED_YEAR)
    })
}

/// `31-Jan-24`, `31 Jan 24`: day, month name, two- or four-digit year.
fn parse_short_named_month(value: &str) -> Option<NaiveDate> {
    let parts = value
        .split(|ch: char| ch == '-' || ch == ' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();
    if parts.len() != 3 || !parts[2].chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let year = expand_year(parts[2])?;
    let rebuilt = format!("{} {} {year}", parts[0], parts[1]);
    NaiveDate::parse_from_str(&rebuilt, "%d %B %Y").ok()
}

fn expand_year(raw: &str) -> Option<i32> {
    let value: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if value < TWO_DIGIT_YEAR_PIVOT => Some(2000 + value),
        2 => Some(1900 + value),
        4 => Some(value),
        _ => None,
    }
}

/// `1st`, `22nd`, `3rd`, `4th` -> bare day numbers.
fn strip_ordinals(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let lowered = word.to_ascii_lowercase();
            let digits = word.trim_end_matches(|ch: char| ch.is_ascii_alphabetic());
            let suffix = &lowered[digits.len()..];
            if !digits.is_empty()
                && digits.chars().all(|ch| ch.is_ascii_digit())
                && matches!(suffix, "st" | "nd" | "rd" | "th")
            {
                digits.to_string()
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
