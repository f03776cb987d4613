//! Currency cell parsing.
//!
//! Published spreadsheets mix `£1,234.50`, accounting negatives `(1,234.50)`,
//! trailing minus `1234-`, unicode dashes and non-breaking spaces. Every
//! cleanup step below is applied in order; whatever remains is searched for
//! the first signed decimal token. Anything without a token is absent, never
//! zero and never an error.

use std::{borrow::Cow, str::FromStr, sync::OnceLock};

use regex::Regex;
use rust_decimal::{Decimal, prelude::FromPrimitive};

use crate::data::CellValue;

const UNICODE_DASHES: [char; 3] = ['\u{2012}', '\u{2013}', '\u{2014}'];
const STRIPPED_CHARS: [char; 3] = ['£', ',', '\u{00A0}'];

static TRAILING_MINUS: OnceLock<Regex> = OnceLock::new();
static NUMERIC_TOKEN: OnceLock<Regex> = OnceLock::new();

fn trailing_minus() -> &'static Regex {
    TRAILING_MINUS.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)?)-$").expect("trailing minus pattern compiles")
    })
}

fn numeric_token() -> &'static Regex {
    NUMERIC_TOKEN.get_or_init(|| {
        Regex::new(r"-?\d+(?:\.\d+)?").expect("numeric token pattern compiles")
    })
}

pub fn parse_amount(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(number) => Decimal::from_f64(*number),
        CellValue::Text(text) => parse_amount_str(text),
        CellValue::Empty => None,
    }
}

pub fn parse_amount_str(raw: &str) -> Option<Decimal> {
    let cleaned = clean_amount_text(raw);
    let token = numeric_token().find(&cleaned)?;
    Decimal::from_str(token.as_str()).ok()
}

/// Applies the dash, symbol, parenthesis and trailing-minus rewrites.
pub fn clean_amount_text(raw: &str) -> String {
    let dashed: String = raw
        .chars()
        .map(|ch| if UNICODE_DASHES.contains(&ch) { '-' } else { ch })
        .filter(|ch| !STRIPPED_CHARS.contains(ch))
        .collect();
    let trimmed = dashed.trim();

    let signed: Cow<'_, str> = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => Cow::Owned(format!("-{inner}")),
        None => Cow::Borrowed(trimmed),
    };

    trailing_minus().replace(&signed, "-$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn parse(value: &str) -> Option<Decimal> {
        parse_amount(&CellValue::text(value))
    }

    #[test]
    fn strips_currency_symbol_and_separators() {
        assert_eq!(parse("£1,234.50"), Some(dec("1234.50")));
        assert_eq!(parse("1234.50"), Some(dec("1234.50")));
        assert_eq!(parse("1,234.50 "), Some(dec("1234.50")));
        assert_eq!(parse("\u{00A0}£12,500.00\u{00A0}"), Some(dec("12500.00")));
    }

    #[test]
    fn accounting_negative_becomes_leading_minus() {
        assert_eq!(parse("(1234.56)"), Some(dec("-1234.56")));
        assert_eq!(parse("(£1,234.56)"), Some(dec("-1234.56")));
    }

    #[test]
    fn trailing_minus_becomes_leading_minus() {
        assert_eq!(parse("1234-"), Some(dec("-1234")));
        assert_eq!(parse("1,234.5-"), Some(dec("-1234.5")));
    }

    #[test]
    fn unicode_dashes_are_minus_signs() {
        assert_eq!(parse("\u{2013}500"), Some(dec("-500")));
        assert_eq!(parse("\u{2014}£75.25"), Some(dec("-75.25")));
        assert_eq!(parse("\u{2012}1"), Some(dec("-1")));
    }

    #[test]
    fn first_token_wins_over_surrounding_text() {
        assert_eq!(parse("GBP 250.00 inc VAT"), Some(dec("250.00")));
        assert_eq!(parse("approx. 99 (estimate)"), Some(dec("99")));
    }

    #[test]
    fn values_without_digits_are_absent() {
        assert_eq!(parse("n/a"), None);
        assert_eq!(parse("-"), None);
        assert_eq!(parse("()"), None);
        assert_eq!(parse_amount(&CellValue::Empty), None);
    }

    #[test]
    fn numeric_cells_skip_the_string_path() {
        assert_eq!(
            parse_amount(&CellValue::Number(-42.5)),
            Some(dec("-42.5"))
        );
        assert_eq!(parse_amount(&CellValue::Number(f64::NAN)), None);
    }

    #[test]
    fn oversized_tokens_degrade_to_absent() {
        assert_eq!(parse("1234567890123456789012345678901234567890"), None);
    }
}
