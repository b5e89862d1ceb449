//! Charsets of a concatenated alignment
//!
//! A charset attributes a contiguous, 1-based column range to one gene.
//! Genes with a known reading frame split further into one interleaved
//! subset per codon position.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::frame::ReadingFrame;
use crate::model::gene::CODON_NAME_PLACEHOLDER;
use crate::model::GeneSeries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charset {
    pub name: String,
    /// First column, 1-based
    pub position: usize,
    pub length: usize,
    pub frame: ReadingFrame,
    pub codon_names: [String; 3],
}

/// Columns of one codon position within a charset, every third from `start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodonSet {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl Charset {
    pub fn new<S: Into<String>>(name: S, position: usize, length: usize) -> Self {
        Self {
            name: name.into(),
            position,
            length,
            frame: ReadingFrame::Unknown,
            codon_names: crate::model::gene::default_codon_names(),
        }
    }

    /// Charset of `gene` placed at `position`
    pub fn for_gene(gene: &GeneSeries, position: usize) -> Self {
        Self {
            name: gene.name.clone(),
            position,
            length: gene.max_length(),
            frame: gene.reading_frame,
            codon_names: gene.codon_names.clone(),
        }
    }

    pub fn with_frame(mut self, frame: ReadingFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Last column, inclusive
    pub fn position_end(&self) -> usize {
        self.position + self.length - 1
    }

    pub fn has_codons(&self) -> bool {
        self.frame.is_known()
    }

    fn codon_label(&self, index: usize) -> String {
        self.codon_names[index].replace(CODON_NAME_PLACEHOLDER, &self.name)
    }

    /// Codon position (0-based) of the column at `column` (0-based within the charset)
    fn codon_index(&self, column: usize) -> usize {
        let offset = self.frame.offset() as i64;
        let column = if self.frame.is_reverse() {
            self.length as i64 - 1 - column as i64
        } else {
            column as i64
        };
        (column - offset).rem_euclid(3) as usize
    }

    /// One subset per codon position, ordered 1st, 2nd, 3rd.
    ///
    /// Empty for an unknown frame. Negative frames are counted on the
    /// complementary strand, from the end of the charset.
    pub fn codon_sets(&self) -> Vec<CodonSet> {
        if !self.has_codons() {
            return Vec::new();
        }
        let end = self.position_end();
        let mut sets: Vec<(usize, CodonSet)> = (0..3)
            .filter(|column| *column < self.length)
            .map(|column| {
                let index = self.codon_index(column);
                let set = CodonSet {
                    name: self.codon_label(index),
                    start: self.position + column,
                    end,
                };
                (index, set)
            })
            .collect();
        sets.sort_by_key(|(index, _)| *index);
        sets.into_iter().map(|(_, set)| set).collect()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}-{};", self.name, self.position, self.position_end())
    }
}

impl fmt::Display for CodonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}-{}\\3;", self.name, self.start, self.end)
    }
}
