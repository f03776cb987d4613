//! Row filtering on key fields.

use crate::{data::CanonicalRecord, fields::CanonicalField, mapping::HeaderMapping};

/// True unless every key field is absent in `record`.
///
/// An empty key-field set keeps everything.
pub fn keep(record: &CanonicalRecord, key_fields: &[CanonicalField]) -> bool {
    key_fields.is_empty() || key_fields.iter().any(|field| !record.is_absent(*field))
}

/// Narrows `key_fields` to those the table actually maps.
///
/// When none of them is mapped the result is empty, and [`keep`] retains
/// every row.
pub fn active_key_fields(key_fields: &[CanonicalField], mapping: &HeaderMapping) -> Vec<CanonicalField> {
    key_fields
        .iter()
        .copied()
        .filter(|field| mapping.is_mapped(*field))
        .collect()
}
