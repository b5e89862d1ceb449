use crate::error::{ConcatError, Result};
use crate::model::GeneSeries;

use super::Operator;

/// Rejects structurally unsound genes; never drops them
#[derive(Debug, Clone, Copy, Default)]
pub struct OpCheckValid;

impl OpCheckValid {
    pub fn check(gene: &GeneSeries) -> Result<()> {
        if gene.name.is_empty() {
            return Err(ConcatError::invalid(&gene.name, "Missing series name"));
        }
        if gene.fields.is_empty() {
            return Err(ConcatError::invalid(&gene.name, "Missing index fields"));
        }
        if gene.missing.is_empty() {
            return Err(ConcatError::invalid(&gene.name, "Missing characters not defined"));
        }
        if gene.gap.is_empty() {
            return Err(ConcatError::invalid(&gene.name, "Gap characters not defined"));
        }
        if let Some(record) = gene.records.iter().find(|r| r.key.len() != gene.fields.len()) {
            return Err(ConcatError::invalid(
                &gene.name,
                format!(
                    "Key {} does not match index fields ({})",
                    record.key,
                    gene.fields.join(", ")
                ),
            ));
        }
        if let Some(key) = gene.duplicate_keys().first() {
            return Err(ConcatError::invalid(&gene.name, format!("Duplicate key {}", key)));
        }
        Ok(())
    }
}

impl Operator for OpCheckValid {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        Self::check(&gene)?;
        Ok(Some(gene))
    }
}

/// Fails when a gene name was already seen earlier in the stream
#[derive(Debug, Clone, Default)]
pub struct OpCheckUniqueNames {
    seen: std::collections::HashSet<String>,
}

impl OpCheckUniqueNames {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operator for OpCheckUniqueNames {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        if !self.seen.insert(gene.name.clone()) {
            return Err(ConcatError::invalid(&gene.name, "Duplicate gene name in stream"));
        }
        Ok(Some(gene))
    }
}
