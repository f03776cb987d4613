//! Alias configuration: for each canonical field, the ordered list of header
//! spellings that may carry it.
//!
//! The table is an immutable value. Build it once (from the built-in defaults,
//! optionally overlaid with a YAML file) and pass it by reference into every
//! normalization call.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::NormalizeError, fields::CanonicalField};

const DEFAULT_ALIASES: [(CanonicalField, &[&str]); CanonicalField::COUNT] = [
    (
        CanonicalField::DepartmentFamily,
        &["department family", "department", "departmentfamily"],
    ),
    (CanonicalField::Entity, &["entity", "body", "entity name"]),
    (CanonicalField::Date, &["payment date", "date"]),
    (
        CanonicalField::ExpenseType,
        &["expense type", "expenditure type", "type"],
    ),
    (
        CanonicalField::ExpenseArea,
        &["expense area", "cost centre", "expensearea"],
    ),
    (
        CanonicalField::Supplier,
        &["supplier", "vendor", "supplier name"],
    ),
    (
        CanonicalField::TransactionNumber,
        &[
            "voucher number",
            "transaction number",
            "transaction no",
            "transaction id",
            "voucher",
            "doc no",
        ],
    ),
    (
        CanonicalField::AmountGbp,
        &[
            "amount",
            "amount gbp",
            "amount (gbp)",
            "amount£",
            "amount £",
            "£",
            "gbp",
            "net amount",
            "net amount gbp",
            "value",
            "net value",
            "line amount",
            "gross amount",
            "transaction amount",
            "amount (net)",
        ],
    ),
    (
        CanonicalField::Description,
        &[
            "publication description",
            "description",
            "item text",
            "narrative",
            "details",
        ],
    ),
    (
        CanonicalField::SupplierPostcode,
        &["supplier postcode", "postal code", "post code", "postcode"],
    ),
    (
        CanonicalField::SupplierType,
        &["supplier type", "supplier category"],
    ),
    (
        CanonicalField::ContractNumber,
        &[
            "contract number",
            "contract no",
            "po number",
            "purchase order",
            "order no",
            "order number",
        ],
    ),
    (
        CanonicalField::ProjectCode,
        &["project code", "project", "cost code", "cost centre code"],
    ),
    (CanonicalField::ItemText, &["item text"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<Vec<String>>,
}

/// On-disk form of an alias file: canonical field name -> alias list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasFile {
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrideMode {
    /// Listed fields replace the built-in aliases; others keep them.
    #[default]
    Merge,
    /// Only the file's aliases are used.
    Replace,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ALIASES
                .iter()
                .map(|(_, aliases)| aliases.iter().map(|alias| alias.to_string()).collect())
                .collect(),
        }
    }
}

impl AliasTable {
    /// A table where every field has no aliases (and therefore never maps).
    pub fn empty() -> Self {
        Self {
            entries: vec![Vec::new(); CanonicalField::COUNT],
        }
    }

    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        &self.entries[field.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &[String])> {
        CanonicalField::ALL
            .iter()
            .map(move |field| (*field, self.aliases(*field)))
    }

    /// Returns a new table with `field`'s aliases replaced.
    pub fn with_aliases<I, S>(&self, field: CanonicalField, aliases: I) -> Result<Self, NormalizeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases = aliases.into_iter().map(Into::into).collect::<Vec<String>>();
        if aliases.iter().all(|alias| alias.trim().is_empty()) {
            return Err(NormalizeError::EmptyAliasList { field });
        }
        let mut entries = self.entries.clone();
        entries[field.index()] = aliases;
        Ok(Self { entries })
    }

    pub fn from_file(file: &AliasFile, mode: OverrideMode) -> Result<Self, NormalizeError> {
        let mut table = match mode {
            OverrideMode::Merge => AliasTable::default(),
            OverrideMode::Replace => AliasTable::empty(),
        };
        for (name, aliases) in &file.aliases {
            let field = name.parse::<CanonicalField>()?;
            table = table.with_aliases(field, aliases.iter().cloned())?;
        }
        Ok(table)
    }

    pub fn to_file(&self) -> AliasFile {
        AliasFile {
            aliases: self
                .iter()
                .filter(|(_, aliases)| !aliases.is_empty())
                .map(|(field, aliases)| (field.as_str().to_string(), aliases.to_vec()))
                .collect(),
        }
    }

    pub fn load(path: &Path, mode: OverrideMode) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening alias file {path:?}"))?;
        let parsed: AliasFile = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing alias YAML {path:?}"))?;
        let table = AliasTable::from_file(&parsed, mode)
            .with_context(|| format!("Validating alias file {path:?}"))?;
        Ok(table)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.to_file()).context("Serializing alias table")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml_string()?;
        let mut file =
            File::create(path).with_context(|| format!("Creating alias file {path:?}"))?;
        file.write_all(yaml.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
