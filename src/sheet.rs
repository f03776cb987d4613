//! Turns a disclosure file into a [`RawTable`].
//!
//! CSV/TSV files are decoded with encoding fallback; workbooks (`xlsx`, `xls`,
//! `xlsm`, `ods`) are read from their first sheet when the `xlsx` feature is
//! enabled. The first non-blank row is the header row.

use std::path::Path;

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{data::CellValue, io_utils, raw::RawTable};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    pub delimiter: Option<u8>,
    pub encoding: Option<&'static Encoding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Delimited,
    Workbook,
}

impl SourceKind {
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => SourceKind::Workbook,
            _ => SourceKind::Delimited,
        }
    }
}

pub fn read_table(path: &Path, options: &ReadOptions) -> Result<RawTable> {
    let table = match SourceKind::detect(path) {
        SourceKind::Delimited => {
            let bytes = io_utils::read_input_bytes(path)?;
            let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
            info!(
                "Reading '{}' with delimiter '{}'",
                path.display(),
                io_utils::printable_delimiter(delimiter)
            );
            parse_delimited(&bytes, delimiter, options.encoding)
        }
        SourceKind::Workbook => read_workbook(path),
    }
    .with_context(|| format!("Reading table from {path:?}"))?;
    debug!(
        "Read {} header(s) and {} row(s)",
        table.headers().len(),
        table.row_count()
    );
    Ok(table)
}

/// Parses delimited text already held in memory.
pub fn parse_delimited(
    bytes: &[u8],
    delimiter: u8,
    encoding: Option<&'static Encoding>,
) -> Result<RawTable> {
    let (text, used) = io_utils::decode_text(bytes, encoding);
    debug!("Decoding delimited input as {}", used.name());
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), delimiter);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading line {}", idx + 1))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match headers {
            None => headers = Some(record.iter().map(str::to_string).collect()),
            Some(_) => rows.push(record.iter().map(CellValue::text).collect()),
        }
    }
    let Some(headers) = headers else {
        bail!("Input contains no header row");
    };
    Ok(RawTable::new(headers, rows)?)
}

#[cfg(feature = "xlsx")]
fn read_workbook(path: &Path) -> Result<RawTable> {
    use calamine::{Reader, open_workbook_auto};

    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        bail!("Workbook {path:?} has no sheets");
    };
    info!("Reading sheet '{sheet}' of '{}'", path.display());
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Reading sheet '{sheet}'"))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(workbook_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_blank));
    let Some(header_row) = rows.next() else {
        bail!("Sheet '{sheet}' contains no header row");
    };
    let headers = header_row
        .iter()
        .map(CellValue::as_display)
        .collect();

    Ok(RawTable::new(headers, rows.collect())?)
}

#[cfg(feature = "xlsx")]
fn workbook_cell(cell: &calamine::Data) -> CellValue {
    use calamine::Data;

    match cell {
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(value) => CellValue::text(value.as_str()),
        Data::Bool(value) => CellValue::Text(value.to_string()),
        // Serial day number; the date parser converts it.
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
        Data::DateTimeIso(value) | Data::DurationIso(value) => CellValue::text(value.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook(path: &Path) -> Result<RawTable> {
    bail!("Workbook input {path:?} requires the 'xlsx' feature")
}
