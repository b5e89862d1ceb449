use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::GeneSeries;

use super::Operator;

/// Replaces every missing character with the given one, which becomes the only missing character
#[derive(Debug, Clone, Copy)]
pub struct OpTranslateMissing(pub char);

impl Operator for OpTranslateMissing {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        let target = self.0;
        let from = gene.missing.clone();
        let mut gene = gene.map_sequences(|s| translate_chars(&s, &from, target));
        gene.missing = target.to_string();
        Ok(Some(gene))
    }
}

/// Replaces every gap character with the given one, which becomes the only gap character
#[derive(Debug, Clone, Copy)]
pub struct OpTranslateGap(pub char);

impl Operator for OpTranslateGap {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        let target = self.0;
        let from = gene.gap.clone();
        let mut gene = gene.map_sequences(|s| translate_chars(&s, &from, target));
        gene.gap = target.to_string();
        Ok(Some(gene))
    }
}

fn translate_chars(sequence: &str, from: &str, to: char) -> String {
    sequence
        .chars()
        .map(|c| if from.contains(c) { to } else { c })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    #[default]
    Unchanged,
    Upper,
    Lower,
}

impl TextCase {
    pub fn description(self) -> &'static str {
        match self {
            Self::Unchanged => "Unchanged",
            Self::Upper => "Uppercase",
            Self::Lower => "Lowercase",
        }
    }
}

/// Nucleotide case normalization
#[derive(Debug, Clone, Copy, Default)]
pub struct OpSequenceCase(pub TextCase);

impl Operator for OpSequenceCase {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        Ok(Some(match self.0 {
            TextCase::Unchanged => gene,
            TextCase::Upper => gene.map_sequences(|s| s.to_uppercase()),
            TextCase::Lower => gene.map_sequences(|s| s.to_lowercase()),
        }))
    }
}

/// Sequences starting with `-` start with `N` instead, so that
/// spreadsheets do not read them as formulas
#[derive(Debug, Clone, Copy, Default)]
pub struct OpSpreadsheetCompatibility;

impl Operator for OpSpreadsheetCompatibility {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        Ok(Some(gene.map_sequences(|s| match s.strip_prefix('-') {
            Some(rest) => format!("N{}", rest),
            None => s,
        })))
    }
}
