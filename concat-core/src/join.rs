//! Structural join of genes keyed by heterogeneous composite keys
//!
//! Each gene brings its own key schema. Rows merge on the key fields that
//! both the table and the incoming gene know about, and only when all of
//! them match exactly. A row that lacks one of those fields never matches,
//! so specimens that merely share a species name are kept apart unless the
//! schemas say otherwise.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ConcatError, Result};
use crate::model::dataframe::JoinedRow;
use crate::model::{GeneDataFrame, GeneSeries, GeneStream, Record};

/// Name of a structural key field.
///
/// Key fields live apart from gene columns, so a gene called `species`
/// can never be confused with the `species` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyField(String);

impl KeyField {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn record_key(fields: &[KeyField], record: &Record) -> HashMap<KeyField, String> {
    fields
        .iter()
        .cloned()
        .zip(record.key.values().iter().cloned())
        .collect()
}

/// Values of the shared fields, or `None` when one of them is missing
fn shared_values<'a>(shared: &[KeyField], key: &'a HashMap<KeyField, String>) -> Option<Vec<&'a str>> {
    if shared.is_empty() {
        return None;
    }
    shared.iter().map(|field| key.get(field).map(String::as_str)).collect()
}

/// Incoming records grouped by their shared-field values, in arrival order
fn index_records<'a>(
    shared: &[KeyField],
    incoming: &'a [HashMap<KeyField, String>],
) -> HashMap<Vec<&'a str>, Vec<usize>> {
    let mut index: HashMap<Vec<&str>, Vec<usize>> = HashMap::new();
    for (position, key) in incoming.iter().enumerate() {
        if let Some(values) = shared_values(shared, key) {
            index.entry(values).or_default().push(position);
        }
    }
    index
}

fn widened(row: &JoinedRow, width: usize) -> JoinedRow {
    let mut row = row.clone();
    row.cells.resize(width, None);
    row
}

impl GeneDataFrame {
    /// Joins all genes of a stream, in arrival order
    pub fn from_stream(stream: GeneStream<'_>) -> Result<Self> {
        join_any(stream)
    }

    /// Outer-merges one gene into the table.
    ///
    /// A gene whose name is already a column is concatenated into it; its
    /// metadata must agree and it may not fill a cell twice.
    pub fn add(&mut self, gene: GeneSeries) -> Result<()> {
        let fields: Vec<KeyField> = gene.fields.iter().map(KeyField::new).collect();
        let shared: Vec<KeyField> = fields
            .iter()
            .filter(|field| self.key_fields.contains(field))
            .cloned()
            .collect();

        let (column, width) = match self.column_index(&gene.name) {
            Some(index) => {
                if !self.columns[index].same_metadata(&gene) {
                    return Err(ConcatError::bad_join(
                        self.columns[index].clone(),
                        gene,
                        "metadata differs from the gene already joined under this name",
                    ));
                }
                (index, self.columns.len())
            }
            None => (self.columns.len(), self.columns.len() + 1),
        };

        // nothing is committed until every row has merged
        let incoming: Vec<HashMap<KeyField, String>> =
            gene.records.iter().map(|record| record_key(&fields, record)).collect();
        let index = index_records(&shared, &incoming);
        let mut used = vec![false; incoming.len()];
        let mut rows = Vec::with_capacity(self.rows.len() + incoming.len());

        for row in &self.rows {
            let matches = match shared_values(&shared, &row.key).and_then(|values| index.get(&values)) {
                Some(matches) => matches,
                None => {
                    rows.push(widened(row, width));
                    continue;
                }
            };
            if row.cells.get(column).map_or(false, Option::is_some) {
                let existing = self.columns[column].clone();
                let key = gene_key(&incoming[matches[0]]);
                return Err(ConcatError::bad_join(
                    existing,
                    gene,
                    format!("specimen {} is already present", key),
                ));
            }
            for &position in matches {
                let mut merged = widened(row, width);
                for (field, value) in &incoming[position] {
                    merged.key.entry(field.clone()).or_insert_with(|| value.clone());
                }
                merged.cells[column] = Some(gene.records[position].sequence.clone());
                rows.push(merged);
                used[position] = true;
            }
        }

        for (position, key) in incoming.into_iter().enumerate() {
            if used[position] {
                continue;
            }
            let mut cells = vec![None; width];
            cells[column] = Some(gene.records[position].sequence.clone());
            rows.push(JoinedRow { key, cells });
        }

        log::debug!(
            "Joined gene {} on [{}], {} rows",
            gene.name,
            shared.iter().map(KeyField::name).collect::<Vec<_>>().join(", "),
            rows.len()
        );
        if column == self.columns.len() {
            self.columns.push(gene.empty_like());
        }
        for field in fields {
            if !self.key_fields.contains(&field) {
                self.key_fields.push(field);
            }
        }
        self.rows = rows;
        Ok(())
    }
}

fn gene_key(key: &HashMap<KeyField, String>) -> String {
    let mut pairs: Vec<String> = key.iter().map(|(field, value)| format!("{}={}", field, value)).collect();
    pairs.sort();
    format!("({})", pairs.join(", "))
}

/// Folds a stream of genes into one table, stopping at the first error
pub fn join_any(stream: GeneStream<'_>) -> Result<GeneDataFrame> {
    let mut frame = GeneDataFrame::new();
    for gene in stream {
        frame.add(gene?)?;
    }
    log::debug!(
        "Joined {} genes into {} rows",
        frame.column_count(),
        frame.len()
    );
    Ok(frame)
}
