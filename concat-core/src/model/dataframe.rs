use std::collections::HashMap;

use super::gene::{GeneSeries, Record};
use super::key::{TaxonKey, SPECIES};
use super::stream::GeneStream;
use crate::join::KeyField;

/// One specimen of the joined table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinedRow {
    /// Values of the key fields this row is known by
    pub key: HashMap<KeyField, String>,
    /// One cell per gene column, `None` when the gene lacks this specimen
    pub cells: Vec<Option<String>>,
}

impl JoinedRow {
    pub fn value(&self, field: &KeyField) -> Option<&str> {
        self.key.get(field).map(String::as_str)
    }
}

/// Wide table of genes: one row per unified specimen, one column per gene.
///
/// Built by folding genes through [`GeneDataFrame::add`]; see the `join`
/// module for the merge rules.
#[derive(Debug, Clone, Default)]
pub struct GeneDataFrame {
    /// Union of key fields, in order of first appearance
    pub(crate) key_fields: Vec<KeyField>,
    /// Metadata of each gene column, without records
    pub(crate) columns: Vec<GeneSeries>,
    pub(crate) rows: Vec<JoinedRow>,
}

impl GeneDataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of specimen rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn gene_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Key fields of the composite key, the species field first when present
    pub fn key_fields(&self) -> Vec<&KeyField> {
        let mut fields: Vec<&KeyField> = self.key_fields.iter().collect();
        if let Some(index) = fields.iter().position(|f| f.name() == SPECIES) {
            let species = fields.remove(index);
            fields.insert(0, species);
        }
        fields
    }

    pub fn key_field_names(&self) -> Vec<String> {
        self.key_fields().iter().map(|f| f.name().to_string()).collect()
    }

    fn row_key(&self, fields: &[&KeyField], row: &JoinedRow) -> TaxonKey {
        TaxonKey::new(
            fields
                .iter()
                .map(|field| row.value(field).unwrap_or_default().to_string())
                .collect(),
        )
    }

    /// Composite key of every row; fields a row lacks are empty strings
    pub fn keys(&self) -> Vec<TaxonKey> {
        let fields = self.key_fields();
        self.rows.iter().map(|row| self.row_key(&fields, row)).collect()
    }

    /// Rows with their composite key and one cell per gene column
    pub fn rows(&self) -> impl Iterator<Item = (TaxonKey, &[Option<String>])> {
        let fields = self.key_fields();
        self.rows
            .iter()
            .map(move |row| (self.row_key(&fields, row), row.cells.as_slice()))
    }

    /// Longest sequence held in a column
    pub fn column_length(&self, index: usize) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row.cells.get(index)?.as_deref())
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Gene column re-keyed by the unified composite key.
    ///
    /// Absent cells are skipped, or filled with `filler` repeated to the
    /// column length when one is given.
    pub fn gene_at(&self, index: usize, filler: Option<char>) -> Option<GeneSeries> {
        let column = self.columns.get(index)?;
        let fields = self.key_fields();
        let length = self.column_length(index);
        let mut gene = column.empty_like();
        gene.fields = fields.iter().map(|f| f.name().to_string()).collect();
        gene.records = self
            .rows
            .iter()
            .filter_map(|row| {
                let sequence = match (row.cells.get(index).cloned().flatten(), filler) {
                    (Some(sequence), _) => sequence,
                    (None, Some(filler)) => std::iter::repeat(filler).take(length).collect(),
                    (None, None) => return None,
                };
                Some(Record::new(self.row_key(&fields, row), sequence))
            })
            .collect();
        Some(gene)
    }

    pub fn gene(&self, name: &str) -> Option<GeneSeries> {
        self.gene_at(self.column_index(name)?, None)
    }

    /// Every column as a gene, in column order
    pub fn to_stream(&self, filler: Option<char>) -> GeneStream<'static> {
        let genes: Vec<GeneSeries> = (0..self.columns.len())
            .filter_map(|index| self.gene_at(index, filler))
            .collect();
        GeneStream::from_genes(genes)
    }

    /// Joins every row into a single sequence, columns in order.
    ///
    /// Absent cells become `filler` repeated to the column length. The
    /// result carries the union of the missing and gap characters and no
    /// reading frame.
    pub fn concatenate<S: Into<String>>(&self, name: S, filler: char) -> GeneSeries {
        let fields = self.key_fields();
        let lengths: Vec<usize> = (0..self.columns.len()).map(|i| self.column_length(i)).collect();
        let mut gene = GeneSeries::new(name, fields.iter().map(|f| f.name().to_string()).collect());
        gene.missing = union_chars(self.columns.iter().map(|c| c.missing.as_str()), &gene.missing);
        gene.gap = union_chars(self.columns.iter().map(|c| c.gap.as_str()), &gene.gap);
        for row in &self.rows {
            let mut sequence = String::with_capacity(lengths.iter().sum());
            for (index, length) in lengths.iter().enumerate() {
                match row.cells.get(index).and_then(Option::as_deref) {
                    Some(cell) => sequence.push_str(cell),
                    None => sequence.extend(std::iter::repeat(filler).take(*length)),
                }
            }
            gene.push(self.row_key(&fields, row), sequence);
        }
        gene
    }
}

fn union_chars<'a, I: Iterator<Item = &'a str>>(sets: I, fallback: &str) -> String {
    let mut union = String::new();
    for c in sets.flat_map(str::chars) {
        if !union.contains(c) {
            union.push(c);
        }
    }
    if union.is_empty() {
        fallback.to_string()
    } else {
        union
    }
}
