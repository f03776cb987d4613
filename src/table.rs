//! Plain-text rendering of header resolution diagnostics.

use std::fmt::Write as _;

use crate::{fields::CanonicalField, mapping::HeaderMapping};

const UNMAPPED: &str = "-";

/// One line per canonical field: field, raw header, match kind, alias.
pub fn mapping_rows(mapping: &HeaderMapping) -> Vec<Vec<String>> {
    CanonicalField::ALL
        .iter()
        .map(|field| match mapping.get(*field) {
            Some(column) => vec![
                field.to_string(),
                column.header.clone(),
                column.kind.to_string(),
                column.alias.clone(),
            ],
            None => vec![
                field.to_string(),
                UNMAPPED.to_string(),
                "unmapped".to_string(),
                String::new(),
            ],
        })
        .collect()
}

pub fn render_mapping(mapping: &HeaderMapping) -> String {
    let headers = ["field", "header", "match", "alias"].map(String::from);
    let mut output = render_table(&headers, &mapping_rows(mapping));
    for overlap in mapping.overlaps() {
        let fields = overlap
            .fields
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(output, "shared header '{}': {fields}", overlap.header);
    }
    output
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = value.replace(['\n', '\r', '\t'], " ");
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}
