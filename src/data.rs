use std::fmt;

use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::fields::CanonicalField;

/// One raw cell as handed over by the table decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Builds a text cell, mapping empty strings to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    /// True for the empty marker, whitespace-only text, and NaN.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(number) => number.is_nan(),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            CellValue::Number(number) => format_number(*number),
            CellValue::Text(text) => text.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        (number as i64).to_string()
    } else {
        number.to_string()
    }
}

/// A parsed canonical value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Amount(Decimal),
    Date(NaiveDate),
}

impl FieldValue {
    /// Projects a raw cell for a plain (unparsed) field.
    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        if cell.is_blank() {
            return None;
        }
        match cell {
            CellValue::Number(number) => Some(FieldValue::Number(*number)),
            CellValue::Text(text) => Some(FieldValue::Text(text.clone())),
            CellValue::Empty => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => format_number(*number),
            FieldValue::Amount(amount) => amount.to_string(),
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(amount) => Some(*amount),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_display())
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Text(text) => serializer.serialize_str(text),
            // Whole numbers print without a fractional part, like `format_number`.
            FieldValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                serializer.serialize_i64(*number as i64)
            }
            FieldValue::Number(number) => serializer.serialize_f64(*number),
            // JSON consumers expect a number; fall back to text past f64 range.
            FieldValue::Amount(amount) => match amount.to_f64() {
                Some(value) => serializer.serialize_f64(value),
                None => serializer.serialize_str(&amount.to_string()),
            },
            FieldValue::Date(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
        }
    }
}

/// One normalized output row. Every canonical field is present; unmapped or
/// unparseable fields hold `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    values: [Option<FieldValue>; CanonicalField::COUNT],
    amount_raw: Option<CellValue>,
}

impl Default for CanonicalRecord {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| None),
            amount_raw: None,
        }
    }
}

impl CanonicalRecord {
    pub fn get(&self, field: CanonicalField) -> Option<&FieldValue> {
        self.values[field.index()].as_ref()
    }

    pub fn set(&mut self, field: CanonicalField, value: Option<FieldValue>) {
        self.values[field.index()] = value;
    }

    pub fn is_absent(&self, field: CanonicalField) -> bool {
        self.get(field).is_none()
    }

    pub fn amount_gbp(&self) -> Option<Decimal> {
        self.get(CanonicalField::AmountGbp)
            .and_then(FieldValue::as_amount)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.get(CanonicalField::Date).and_then(FieldValue::as_date)
    }

    /// Pre-parse amount cell kept for traceability, if retained.
    pub fn amount_raw(&self) -> Option<&CellValue> {
        self.amount_raw.as_ref()
    }

    pub fn set_amount_raw(&mut self, raw: Option<CellValue>) {
        self.amount_raw = raw;
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, Option<&FieldValue>)> {
        CanonicalField::ALL
            .iter()
            .map(move |field| (*field, self.get(*field)))
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let extra = usize::from(self.amount_raw.is_some());
        let mut map = serializer.serialize_map(Some(CanonicalField::COUNT + extra))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), &value)?;
        }
        if let Some(raw) = &self.amount_raw {
            match raw {
                CellValue::Number(number) => map.serialize_entry("amount_raw", number)?,
                CellValue::Text(text) => map.serialize_entry("amount_raw", text)?,
                CellValue::Empty => map.serialize_entry("amount_raw", &Option::<()>::None)?,
            }
        }
        map.end()
    }
}
