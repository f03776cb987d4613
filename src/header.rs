//! Header canonicalization and alias resolution.
//!
//! Raw spreadsheet headers drift in case, spacing and punctuation from one
//! month to the next (`Amount (GBP)`, `amount gbp`, `AMOUNT-GBP`). Comparison
//! happens on a canonical key that keeps only lowercase ASCII letters and
//! digits.
//!
//! Resolution is two-phase: an exact canonical match against *any* alias wins
//! over substring containment, so a short alias such as `amount` cannot
//! pre-empt a more specific exact alias later in the list.

use std::fmt;

use serde::Serialize;

/// Reduces a header to its comparison key.
pub fn canonicalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .filter(|ch| matches!(ch, 'a'..='z' | '0'..='9'))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Canonical alias equals the canonical header.
    Exact,
    /// Canonical alias is a substring of the canonical header.
    Contains,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact => f.write_str("exact"),
            MatchKind::Contains => f.write_str("contains"),
        }
    }
}

/// Outcome of resolving one alias list against a table's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Position of the chosen header in table order.
    pub index: usize,
    pub kind: MatchKind,
    /// Alias (as configured) that produced the match.
    pub alias: String,
}

/// Pre-canonicalized header row, built once per table.
#[derive(Debug, Clone)]
pub struct CanonicalHeaders {
    keys: Vec<String>,
}

impl CanonicalHeaders {
    pub fn new<S: AsRef<str>>(raw_headers: &[S]) -> Self {
        Self {
            keys: raw_headers
                .iter()
                .map(|header| canonicalize(header.as_ref()))
                .collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn resolve<S: AsRef<str>>(&self, aliases: &[S]) -> Option<Resolution> {
        let canonical_aliases = aliases
            .iter()
            .map(|alias| (alias.as_ref(), canonicalize(alias.as_ref())))
            .filter(|(_, key)| !key.is_empty())
            .collect::<Vec<_>>();

        for (alias, key) in &canonical_aliases {
            if let Some(index) = self.keys.iter().position(|header| header == key) {
                return Some(Resolution {
                    index,
                    kind: MatchKind::Exact,
                    alias: (*alias).to_string(),
                });
            }
        }

        for (alias, key) in &canonical_aliases {
            if let Some(index) = self
                .keys
                .iter()
                .position(|header| header.contains(key.as_str()))
            {
                return Some(Resolution {
                    index,
                    kind: MatchKind::Contains,
                    alias: (*alias).to_string(),
                });
            }
        }

        None
    }
}

/// Picks the raw header that best matches `aliases`, or `None`.
pub fn resolve<'h, H, A>(raw_headers: &'h [H], aliases: &[A]) -> Option<&'h str>
where
    H: AsRef<str>,
    A: AsRef<str>,
{
    CanonicalHeaders::new(raw_headers)
        .resolve(aliases)
        .map(|resolution| raw_headers[resolution.index].as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_ignores_case_spacing_and_punctuation() {
        assert_eq!(canonicalize("Amount (GBP)"), "amountgbp");
        assert_eq!(canonicalize("  amount   gbp "), "amountgbp");
        assert_eq!(canonicalize("AMOUNT-GBP"), "amountgbp");
        assert_eq!(canonicalize("Amount £"), "amount");
        assert_eq!(canonicalize("£"), "");
    }

    #[test]
    fn exact_match_outranks_earlier_containment() {
        let headers = ["Net Amount GBP", "Amount"];
        assert_eq!(resolve(&headers, &["amount", "net amount gbp"]), Some("Amount"));
        let headers = ["Net Amount GBP", "VAT"];
        assert_eq!(
            resolve(&headers, &["amount", "net amount gbp"]),
            Some("Net Amount GBP")
        );
    }

    #[test]
    fn alias_order_outranks_header_order() {
        let headers = ["Payment Date", "Date"];
        assert_eq!(resolve(&headers, &["date", "payment date"]), Some("Date"));
        assert_eq!(
            resolve(&headers, &["payment date", "date"]),
            Some("Payment Date")
        );
    }

    #[test]
    fn containment_scans_headers_in_table_order() {
        let headers = ["Gross Amount Inc VAT", "Amount Net"];
        let resolution = CanonicalHeaders::new(&headers)
            .resolve(&["amount"])
            .expect("containment match");
        assert_eq!(resolution.index, 0);
        assert_eq!(resolution.kind, MatchKind::Contains);
    }

    #[test]
    fn empty_aliases_never_match() {
        let headers = ["Anything", ""];
        assert_eq!(resolve(&headers, &["", "£", "  "]), None);
    }

    #[test]
    fn no_match_returns_none() {
        let headers = ["Supplier", "Amount"];
        assert_eq!(resolve(&headers, &["postcode", "post code"]), None);
    }
}
