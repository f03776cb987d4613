//! Per-table mapping from canonical fields to raw headers.

use itertools::Itertools;
use log::debug;

use crate::{
    aliases::AliasTable,
    fields::CanonicalField,
    header::{CanonicalHeaders, MatchKind, Resolution},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    /// Raw header text as it appeared in the source table.
    pub header: String,
    /// Column position in the source table.
    pub index: usize,
    pub kind: MatchKind,
    pub alias: String,
}

/// Two canonical fields that resolved to the same raw header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOverlap {
    pub header: String,
    pub fields: Vec<CanonicalField>,
}

/// Partial mapping canonical field -> raw header, computed once per table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMapping {
    columns: Vec<Option<MappedColumn>>,
}

impl HeaderMapping {
    pub fn build<S: AsRef<str>>(raw_headers: &[S], aliases: &AliasTable) -> Self {
        let canonical = CanonicalHeaders::new(raw_headers);
        let columns = aliases
            .iter()
            .map(|(field, field_aliases)| {
                let mapped = canonical.resolve(field_aliases).map(
                    |Resolution { index, kind, alias }| MappedColumn {
                        header: raw_headers[index].as_ref().to_string(),
                        index,
                        kind,
                        alias,
                    },
                );
                match &mapped {
                    Some(column) => debug!(
                        "Field '{field}' -> '{}' ({} match on alias '{}')",
                        column.header, column.kind, column.alias
                    ),
                    None => debug!("Field '{field}' has no matching header"),
                }
                mapped
            })
            .collect();
        Self { columns }
    }

    pub fn get(&self, field: CanonicalField) -> Option<&MappedColumn> {
        self.columns[field.index()].as_ref()
    }

    pub fn header(&self, field: CanonicalField) -> Option<&str> {
        self.get(field).map(|column| column.header.as_str())
    }

    pub fn is_mapped(&self, field: CanonicalField) -> bool {
        self.get(field).is_some()
    }

    pub fn mapped_fields(&self) -> impl Iterator<Item = (CanonicalField, &MappedColumn)> {
        CanonicalField::ALL
            .iter()
            .filter_map(move |field| self.get(*field).map(|column| (*field, column)))
    }

    pub fn unmapped_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .filter(|field| !self.is_mapped(*field))
            .collect()
    }

    /// Raw headers claimed by more than one canonical field.
    ///
    /// Overlap is permitted (e.g. `description` and `item_text` both reading an
    /// `Item Text` column); this only reports it.
    pub fn overlaps(&self) -> Vec<HeaderOverlap> {
        self.mapped_fields()
            .into_group_map_by(|(_, column)| column.index)
            .into_iter()
            .filter(|(_, fields)| fields.len() > 1)
            .sorted_by_key(|(index, _)| *index)
            .map(|(_, fields)| HeaderOverlap {
                header: fields[0].1.header.clone(),
                fields: fields.iter().map(|(field, _)| *field).collect(),
            })
            .collect()
    }
}
