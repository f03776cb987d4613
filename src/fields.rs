//! The closed set of canonical output fields.
//!
//! Every normalized record exposes all of these, in declaration order,
//! regardless of which of them could be mapped from a given table.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    DepartmentFamily,
    Entity,
    Date,
    ExpenseType,
    ExpenseArea,
    Supplier,
    TransactionNumber,
    AmountGbp,
    Description,
    SupplierPostcode,
    SupplierType,
    ContractNumber,
    ProjectCode,
    ItemText,
}

/// Fields whose joint absence causes a row to be dropped.
pub const DEFAULT_KEY_FIELDS: &[CanonicalField] = &[
    CanonicalField::Supplier,
    CanonicalField::AmountGbp,
    CanonicalField::Date,
    CanonicalField::Description,
];

impl CanonicalField {
    pub const ALL: [CanonicalField; 14] = [
        CanonicalField::DepartmentFamily,
        CanonicalField::Entity,
        CanonicalField::Date,
        CanonicalField::ExpenseType,
        CanonicalField::ExpenseArea,
        CanonicalField::Supplier,
        CanonicalField::TransactionNumber,
        CanonicalField::AmountGbp,
        CanonicalField::Description,
        CanonicalField::SupplierPostcode,
        CanonicalField::SupplierType,
        CanonicalField::ContractNumber,
        CanonicalField::ProjectCode,
        CanonicalField::ItemText,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::DepartmentFamily => "department_family",
            CanonicalField::Entity => "entity",
            CanonicalField::Date => "date",
            CanonicalField::ExpenseType => "expense_type",
            CanonicalField::ExpenseArea => "expense_area",
            CanonicalField::Supplier => "supplier",
            CanonicalField::TransactionNumber => "transaction_number",
            CanonicalField::AmountGbp => "amount_gbp",
            CanonicalField::Description => "description",
            CanonicalField::SupplierPostcode => "supplier_postcode",
            CanonicalField::SupplierType => "supplier_type",
            CanonicalField::ContractNumber => "contract_number",
            CanonicalField::ProjectCode => "project_code",
            CanonicalField::ItemText => "item_text",
        }
    }

    /// Position of the field within [`CanonicalField::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "department_family",
            "entity",
            "date",
            "expense_type",
            "expense_area",
            "supplier",
            "transaction_number",
            "amount_gbp",
            "description",
            "supplier_postcode",
            "supplier_type",
            "contract_number",
            "project_code",
            "item_text",
        ]
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = NormalizeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        CanonicalField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| NormalizeError::UnknownField {
                name: trimmed.to_string(),
            })
    }
}
