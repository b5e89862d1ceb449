use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the key field that identifies the taxon of a specimen row
pub const SPECIES: &str = "species";

/// Name used for single-field keys produced by readers and by index merging
pub const SEQID: &str = "seqid";

/// Composite identifier of one specimen row.
///
/// Values are positional; their meaning comes from the key schema
/// (`GeneSeries::fields`) of the gene that holds the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonKey(Vec<String>);

impl TaxonKey {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn values_mut(&mut self) -> &mut [String] {
        &mut self.0
    }

    pub fn into_values(self) -> Vec<String> {
        self.0
    }

    /// Leading component, the taxon itself
    pub fn primary(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joins the non-empty components into one flat identifier
    pub fn joined(&self, separator: &str) -> String {
        self.0
            .iter()
            .filter(|value| !value.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for TaxonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

impl From<&str> for TaxonKey {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for TaxonKey {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for TaxonKey {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[&str; N]> for TaxonKey {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}
