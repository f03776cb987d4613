//! Raw tabular input: the row set produced by a table decoder.

use crate::{data::CellValue, error::NormalizeError};

/// Ordered headers plus positionally aligned rows.
///
/// Construction checks the input contract (non-empty headers, every row as
/// wide as the header row); the normalizer never guesses column alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, NormalizeError> {
        if headers.is_empty() {
            return Err(NormalizeError::NoHeaders);
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(NormalizeError::RowWidth {
                row: idx + 1,
                expected: headers.len(),
                found: row.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Convenience constructor for string-only tables.
    pub fn from_strings<H, R, C>(headers: &[H], rows: &[R]) -> Result<Self, NormalizeError>
    where
        H: AsRef<str>,
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        let headers = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .iter()
                    .map(|cell| CellValue::text(cell.as_ref()))
                    .collect()
            })
            .collect();
        RawTable::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |row| &row[index])
    }
}
