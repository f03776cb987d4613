use thiserror::Error;

use crate::fields::CanonicalField;

/// Failures surfaced by the normalization engine.
///
/// Unparseable amounts and dates, and fields with no matching header, are not
/// errors; they degrade to absent values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("malformed table: no headers")]
    NoHeaders,
    #[error("malformed table: row {row} has {found} value(s) but {expected} header(s)")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("alias list for '{field}' is empty")]
    EmptyAliasList { field: CanonicalField },
    #[error("unknown canonical field '{name}' (expected one of: {})", crate::fields::CanonicalField::variants().join(", "))]
    UnknownField { name: String },
}

impl NormalizeError {
    /// True when the input table itself violated the row/header contract.
    pub fn is_malformed_table(&self) -> bool {
        matches!(
            self,
            NormalizeError::NoHeaders | NormalizeError::RowWidth { .. }
        )
    }
}
