use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::key::{TaxonKey, SEQID};
use crate::codes::GeneticCode;
use crate::frame::ReadingFrame;

pub const DEFAULT_MISSING: &str = "?N";
pub const DEFAULT_GAP: &str = "-";

/// Placeholder substituted by the gene name in codon-position labels
pub const CODON_NAME_PLACEHOLDER: &str = "**";

pub fn default_codon_names() -> [String; 3] {
    ["**_1st".to_string(), "**_2nd".to_string(), "**_3rd".to_string()]
}

/// Sequence of one specimen within a gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: TaxonKey,
    pub sequence: String,
}

impl Record {
    pub fn new<K: Into<TaxonKey>, S: Into<String>>(key: K, sequence: S) -> Self {
        Self {
            key: key.into(),
            sequence: sequence.into(),
        }
    }
}

/// One gene or marker: per-specimen sequences plus biological metadata.
///
/// Operators take a `GeneSeries` by value and hand back a new one, so a
/// gene is never changed behind the back of another consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSeries {
    pub name: String,
    /// Key schema: names of the components of every record key
    pub fields: Vec<String>,
    pub records: Vec<Record>,
    /// Characters meaning "no data"
    pub missing: String,
    /// Characters meaning "alignment gap"
    pub gap: String,
    pub genetic_code: GeneticCode,
    pub reading_frame: ReadingFrame,
    /// Label templates for the 1st, 2nd and 3rd codon-position subsets
    pub codon_names: [String; 3],
}

impl GeneSeries {
    pub fn new<S: Into<String>>(name: S, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            fields,
            records: Vec::new(),
            missing: DEFAULT_MISSING.to_string(),
            gap: DEFAULT_GAP.to_string(),
            genetic_code: GeneticCode::UNKNOWN,
            reading_frame: ReadingFrame::Unknown,
            codon_names: default_codon_names(),
        }
    }

    /// Gene keyed by a single `seqid` field
    pub fn from_pairs<S, K, Q, I>(name: S, pairs: I) -> Self
    where
        S: Into<String>,
        K: Into<String>,
        Q: Into<String>,
        I: IntoIterator<Item = (K, Q)>,
    {
        let mut gene = Self::new(name, vec![SEQID.to_string()]);
        gene.records = pairs
            .into_iter()
            .map(|(key, sequence)| Record::new(TaxonKey::from(key.into()), sequence))
            .collect();
        gene
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn with_missing<S: Into<String>>(mut self, missing: S) -> Self {
        self.missing = missing.into();
        self
    }

    pub fn with_gap<S: Into<String>>(mut self, gap: S) -> Self {
        self.gap = gap.into();
        self
    }

    pub fn with_genetic_code(mut self, code: GeneticCode) -> Self {
        self.genetic_code = code;
        self
    }

    pub fn with_reading_frame(mut self, frame: ReadingFrame) -> Self {
        self.reading_frame = frame;
        self
    }

    pub fn with_codon_names(mut self, names: [String; 3]) -> Self {
        self.codon_names = names;
        self
    }

    pub fn push<K: Into<TaxonKey>, S: Into<String>>(&mut self, key: K, sequence: S) {
        self.records.push(Record::new(key, sequence));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sequences(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.sequence.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &TaxonKey> {
        self.records.iter().map(|r| &r.key)
    }

    pub fn get(&self, key: &TaxonKey) -> Option<&str> {
        self.records
            .iter()
            .find(|r| &r.key == key)
            .map(|r| r.sequence.as_str())
    }

    /// Looks up a record by the leading key component
    pub fn get_primary(&self, primary: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.key.primary() == primary)
            .map(|r| r.sequence.as_str())
    }

    /// Copy of the metadata without any records
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            records: Vec::new(),
            missing: self.missing.clone(),
            gap: self.gap.clone(),
            genetic_code: self.genetic_code,
            reading_frame: self.reading_frame,
            codon_names: self.codon_names.clone(),
        }
    }

    /// Whether every metadata field except the name and key schema agrees
    pub fn same_metadata(&self, other: &GeneSeries) -> bool {
        self.missing == other.missing
            && self.gap == other.gap
            && self.genetic_code == other.genetic_code
            && self.reading_frame == other.reading_frame
            && self.codon_names == other.codon_names
    }

    pub fn max_length(&self) -> usize {
        self.sequences().map(|s| s.chars().count()).max().unwrap_or(0)
    }

    pub fn has_uniform_length(&self) -> bool {
        let mut lengths = self.sequences().map(|s| s.chars().count());
        match lengths.next() {
            Some(first) => lengths.all(|len| len == first),
            None => true,
        }
    }

    /// Whether `sequence` holds nothing but missing and gap characters
    pub fn is_void(&self, sequence: &str) -> bool {
        sequence
            .chars()
            .all(|c| self.missing.contains(c) || self.gap.contains(c))
    }

    /// Keys that occur more than once
    pub fn duplicate_keys(&self) -> Vec<&TaxonKey> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for key in self.keys() {
            if !seen.insert(key) && !duplicates.contains(&key) {
                duplicates.push(key);
            }
        }
        duplicates
    }

    /// Applies `f` to every sequence, consuming the gene
    pub fn map_sequences<F: FnMut(String) -> String>(mut self, mut f: F) -> Self {
        for record in &mut self.records {
            let sequence = std::mem::take(&mut record.sequence);
            record.sequence = f(sequence);
        }
        self
    }

    /// Label for codon position `index` (0-based) with the gene name filled in
    pub fn codon_label(&self, index: usize) -> String {
        self.codon_names[index % 3].replace(CODON_NAME_PLACEHOLDER, &self.name)
    }
}
