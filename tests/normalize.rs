mod common;

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spend_normalizer::{
    AliasTable, CanonicalField, CellValue, FieldValue, NormalizeError, NormalizeOptions, RawTable,
    normalize, normalize::normalize_rows, normalize_with, sheet::parse_delimited,
};

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal literal")
}

fn text(record: &spend_normalizer::CanonicalRecord, field: CanonicalField) -> Option<&str> {
    record.get(field).and_then(FieldValue::as_text)
}

#[test]
fn sample_extract_normalizes_and_drops_keyless_rows() {
    let table = parse_delimited(common::HMT_SAMPLE.as_bytes(), b',', None).expect("parse sample");
    let normalized = normalize(&table, &AliasTable::default());

    assert_eq!(normalized.report.rows_read, 4);
    assert_eq!(normalized.report.rows_kept, 3);
    assert_eq!(normalized.report.rows_dropped, 1);

    let first = &normalized.records[0];
    assert_eq!(text(first, CanonicalField::Supplier), Some("Acme Ltd"));
    assert_eq!(text(first, CanonicalField::TransactionNumber), Some("TX-1"));
    assert_eq!(first.amount_gbp(), Some(dec("12500.00")));
    assert_eq!(first.date(), NaiveDate::from_ymd_opt(2024, 1, 31));
    assert_eq!(
        first.amount_raw(),
        Some(&CellValue::Text("£12,500.00".to_string()))
    );

    let credit = &normalized.records[1];
    assert_eq!(credit.amount_gbp(), Some(dec("-250.00")));
    assert_eq!(credit.date(), NaiveDate::from_ymd_opt(2024, 1, 15));

    let description_only = &normalized.records[2];
    assert_eq!(
        text(description_only, CanonicalField::Description),
        Some("Accrual reversal")
    );
    assert!(description_only.is_absent(CanonicalField::Supplier));
    assert!(description_only.is_absent(CanonicalField::AmountGbp));
}

#[test]
fn rows_with_only_a_description_are_kept_in_order() {
    let table = RawTable::from_strings(
        &["Entity", "Supplier", "Amount", "Payment Date", "Description"],
        &[
            vec!["HMT", "", "", "", "Accrual reversal"],
            vec!["HMT", "", "", "", ""],
            vec!["HMT", "", "", "", "Year-end adjustment"],
            vec!["HMT", "", "", "", "Journal correction"],
        ],
    )
    .expect("table");
    let normalized = normalize(&table, &AliasTable::default());

    assert_eq!(normalized.report.rows_dropped, 1);
    let descriptions = normalized
        .records
        .iter()
        .map(|record| text(record, CanonicalField::Description))
        .collect::<Vec<_>>();
    assert_eq!(
        descriptions,
        [
            Some("Accrual reversal"),
            Some("Year-end adjustment"),
            Some("Journal correction")
        ]
    );
    for record in &normalized.records {
        assert!(record.is_absent(CanonicalField::Supplier));
        assert!(record.is_absent(CanonicalField::AmountGbp));
        assert!(record.is_absent(CanonicalField::Date));
    }
}

#[test]
fn unmapped_fields_are_absent_on_every_record() {
    let table = parse_delimited(common::HMT_SAMPLE.as_bytes(), b',', None).expect("parse sample");
    let normalized = normalize(&table, &AliasTable::default());
    for field in [
        CanonicalField::SupplierPostcode,
        CanonicalField::SupplierType,
        CanonicalField::ContractNumber,
        CanonicalField::ProjectCode,
        CanonicalField::ItemText,
    ] {
        assert!(!normalized.mapping.is_mapped(field), "{field} should be unmapped");
        assert!(normalized.records.iter().all(|record| record.is_absent(field)));
    }
}

#[test]
fn canonical_headers_normalize_to_the_same_records() {
    let table = parse_delimited(common::HMT_SAMPLE.as_bytes(), b',', None).expect("parse sample");
    let first = normalize(&table, &AliasTable::default());

    let headers = CanonicalField::ALL
        .iter()
        .map(|field| field.as_str().to_string())
        .collect::<Vec<_>>();
    let rows = first
        .records
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|(_, value)| match value {
                    Some(value) => CellValue::text(value.as_display()),
                    None => CellValue::Empty,
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let options = NormalizeOptions {
        keep_amount_raw: false,
        ..NormalizeOptions::default()
    };
    let second = normalize_rows(headers, rows, &AliasTable::default(), &options).expect("table");

    assert_eq!(second.records.len(), first.records.len());
    for (before, after) in first.records.iter().zip(&second.records) {
        for field in CanonicalField::ALL {
            assert_eq!(
                before.get(field).map(FieldValue::as_display),
                after.get(field).map(FieldValue::as_display),
                "field {field} changed on second pass"
            );
        }
    }
}

#[test]
fn alias_override_remaps_a_field() {
    let table = RawTable::from_strings(
        &["Merchant", "Total"],
        &[vec!["Acme Ltd", "99.50"]],
    )
    .expect("table");
    let aliases = AliasTable::default()
        .with_aliases(CanonicalField::Supplier, ["merchant"])
        .expect("aliases")
        .with_aliases(CanonicalField::AmountGbp, ["total"])
        .expect("aliases");

    // Nothing maps under the defaults, so no key field is active and the row survives empty.
    let default_run = normalize(&table, &AliasTable::default());
    assert_eq!(default_run.records.len(), 1);
    assert!(default_run.records[0].is_absent(CanonicalField::Supplier));

    let normalized = normalize(&table, &aliases);
    assert_eq!(normalized.records.len(), 1);
    assert_eq!(
        text(&normalized.records[0], CanonicalField::Supplier),
        Some("Acme Ltd")
    );
    assert_eq!(normalized.records[0].amount_gbp(), Some(dec("99.50")));
}

#[test]
fn custom_key_fields_change_what_is_dropped() {
    let table = RawTable::from_strings(
        &["Supplier", "Amount", "Expense Type"],
        &[vec!["Acme", "", "IT"], vec!["", "10", "IT"]],
    )
    .expect("table");
    let options = NormalizeOptions {
        key_fields: vec![CanonicalField::AmountGbp],
        ..NormalizeOptions::default()
    };
    let normalized = normalize_with(&table, &AliasTable::default(), &options);
    assert_eq!(normalized.records.len(), 1);
    assert_eq!(normalized.records[0].amount_gbp(), Some(dec("10")));
}

#[test]
fn ragged_rows_fail_without_producing_records() {
    let err = normalize_rows(
        vec!["Supplier".into(), "Amount".into()],
        vec![
            vec![CellValue::from("Acme"), CellValue::from("1")],
            vec![CellValue::from("Beta")],
        ],
        &AliasTable::default(),
        &NormalizeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        NormalizeError::RowWidth {
            row: 2,
            expected: 2,
            found: 1
        }
    );
    assert!(err.is_malformed_table());
}

#[test]
fn empty_header_row_is_malformed() {
    let err = normalize_rows(
        Vec::new(),
        Vec::new(),
        &AliasTable::default(),
        &NormalizeOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, NormalizeError::NoHeaders);
}

#[test]
fn windows_1252_input_decodes_pound_sign() {
    let bytes = b"Supplier,Amount\nAcme,\"\xA31,234.50\"\n";
    let table = parse_delimited(bytes, b',', None).expect("decode");
    let normalized = normalize(&table, &AliasTable::default());
    assert_eq!(normalized.records[0].amount_gbp(), Some(dec("1234.50")));
}
