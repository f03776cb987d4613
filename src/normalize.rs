//! Schema normalization: headers -> mapping -> projection -> parsing -> filtering.
//!
//! [`normalize`] is a pure transform over one [`RawTable`] and one
//! [`AliasTable`]. The header mapping is computed once per call and never
//! shared, so independent tables can be normalized concurrently.

use log::{debug, warn};
use serde::Serialize;

use crate::{
    aliases::AliasTable,
    amount::parse_amount,
    data::{CanonicalRecord, CellValue, FieldValue},
    date::parse_date,
    error::NormalizeError,
    fields::{CanonicalField, DEFAULT_KEY_FIELDS},
    filter::{active_key_fields, keep},
    mapping::HeaderMapping,
    raw::RawTable,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub key_fields: Vec<CanonicalField>,
    /// Retain the pre-parse amount cell alongside `amount_gbp`.
    pub keep_amount_raw: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            key_fields: DEFAULT_KEY_FIELDS.to_vec(),
            keep_amount_raw: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    /// Non-blank amount cells that yielded no numeric token.
    pub unparseable_amounts: usize,
    /// Non-blank date cells that yielded no date.
    pub unparseable_dates: usize,
    pub date_pass_skipped: bool,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<CanonicalRecord>,
    pub mapping: HeaderMapping,
    pub report: NormalizeReport,
}

/// Normalizes `table` with default options.
pub fn normalize(table: &RawTable, aliases: &AliasTable) -> Normalized {
    normalize_with(table, aliases, &NormalizeOptions::default())
}

/// Validates and normalizes raw headers/rows in one step.
///
/// Fails atomically with a malformed-table error; no records are produced in
/// that case.
pub fn normalize_rows(
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    aliases: &AliasTable,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    let table = RawTable::new(headers, rows)?;
    Ok(normalize_with(&table, aliases, options))
}

pub fn normalize_with(
    table: &RawTable,
    aliases: &AliasTable,
    options: &NormalizeOptions,
) -> Normalized {
    let mapping = HeaderMapping::build(table.headers(), aliases);
    for overlap in mapping.overlaps() {
        let names = overlap
            .fields
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        warn!("Header '{}' is mapped by several fields: {names}", overlap.header);
    }

    let mut report = NormalizeReport {
        rows_read: table.row_count(),
        ..NormalizeReport::default()
    };

    let date_column = mapping.get(CanonicalField::Date).map(|column| column.index);
    let parse_dates = match date_column {
        Some(index) => table.column(index).any(|cell| !cell.is_blank()),
        None => false,
    };
    if date_column.is_some() && !parse_dates {
        debug!("Date column is entirely blank; skipping date parsing");
        report.date_pass_skipped = true;
    }

    let key_fields = active_key_fields(&options.key_fields, &mapping);
    if key_fields.is_empty() {
        debug!("No key field is mapped; row filter disabled");
    }

    let mut records = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        let record = project_row(row, &mapping, parse_dates, options, &mut report);
        if keep(&record, &key_fields) {
            records.push(record);
        } else {
            report.rows_dropped += 1;
        }
    }
    report.rows_kept = records.len();

    debug!(
        "Normalized {} row(s): kept {}, dropped {}",
        report.rows_read, report.rows_kept, report.rows_dropped
    );
    Normalized {
        records,
        mapping,
        report,
    }
}

fn project_row(
    row: &[CellValue],
    mapping: &HeaderMapping,
    parse_dates: bool,
    options: &NormalizeOptions,
    report: &mut NormalizeReport,
) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();
    for (field, column) in mapping.mapped_fields() {
        let cell = &row[column.index];
        let value = match field {
            CanonicalField::AmountGbp => {
                if options.keep_amount_raw {
                    record.set_amount_raw(Some(cell.clone()));
                }
                let amount = parse_amount(cell);
                if amount.is_none() && !cell.is_blank() {
                    report.unparseable_amounts += 1;
                }
                amount.map(FieldValue::Amount)
            }
            CanonicalField::Date if parse_dates => {
                let date = parse_date(cell);
                if date.is_none() && !cell.is_blank() {
                    report.unparseable_dates += 1;
                }
                date.map(FieldValue::Date)
            }
            CanonicalField::Date => None,
            _ => FieldValue::from_cell(cell),
        };
        record.set(field, value);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn end_to_end_single_row() {
        let table = RawTable::from_strings(
            &["Department Family", "Entity", "Payment Date", "Supplier", "Amount (GBP)"],
            &[vec!["HM Treasury", "HMT", "31/01/2024", "Acme Ltd", "£12,500.00"]],
        )
        .expect("table");
        let normalized = normalize(&table, &AliasTable::default());
        assert_eq!(normalized.records.len(), 1);
        let record = &normalized.records[0];
        assert_eq!(
            record
                .get(CanonicalField::DepartmentFamily)
                .and_then(FieldValue::as_text),
            Some("HM Treasury")
        );
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(record.amount_gbp(), Some(Decimal::from_str("12500.00").unwrap()));
        assert!(record.is_absent(CanonicalField::Description));
        assert!(record.is_absent(CanonicalField::ItemText));
    }

    #[test]
    fn blank_date_column_skips_date_pass() {
        let table = RawTable::from_strings(
            &["Date", "Supplier"],
            &[vec!["", "Acme"], vec!["  ", "Beta"]],
        )
        .expect("table");
        let normalized = normalize(&table, &AliasTable::default());
        assert!(normalized.report.date_pass_skipped);
        assert_eq!(normalized.records.len(), 2);
        assert!(normalized.records.iter().all(|r| r.date().is_none()));
    }

    #[test]
    fn unparseable_values_are_counted_not_fatal() {
        let table = RawTable::from_strings(
            &["Date", "Supplier", "Amount"],
            &[vec!["soon", "Acme", "n/a"], vec!["01/02/2024", "Beta", "10"]],
        )
        .expect("table");
        let normalized = normalize(&table, &AliasTable::default());
        assert_eq!(normalized.report.unparseable_amounts, 1);
        assert_eq!(normalized.report.unparseable_dates, 1);
        assert_eq!(normalized.records.len(), 2);
        assert!(normalized.records[0].amount_gbp().is_none());
        assert_eq!(
            normalized.records[0]
                .get(CanonicalField::Supplier)
                .and_then(FieldValue::as_text),
            Some("Acme")
        );
    }

    #[test]
    fn amount_raw_can_be_disabled() {
        let table = RawTable::from_strings(&["Amount"], &[vec!["£5"]]).expect("table");
        let options = NormalizeOptions {
            keep_amount_raw: false,
            ..NormalizeOptions::default()
        };
        let normalized = normalize_with(&table, &AliasTable::default(), &options);
        assert!(normalized.records[0].amount_raw().is_none());

        let normalized = normalize(&table, &AliasTable::default());
        assert_eq!(
            normalized.records[0].amount_raw(),
            Some(&CellValue::Text("£5".into()))
        );
    }

    #[test]
    fn malformed_rows_fail_atomically() {
        let result = normalize_rows(
            vec!["Supplier".into(), "Amount".into()],
            vec![vec![CellValue::text("Acme")]],
            &AliasTable::default(),
            &NormalizeOptions::default(),
        );
        assert!(matches!(result, Err(NormalizeError::RowWidth { .. })));
    }
}
