use crate::error::Result;
use crate::model::{GeneSeries, TaxonKey, SEQID};

use super::Operator;

/// Right-pads every sequence to the longest one in the gene.
///
/// Without an explicit padding character the last missing character of the
/// gene is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpMakeUniform(pub Option<char>);

impl Operator for OpMakeUniform {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        if gene.has_uniform_length() {
            return Ok(Some(gene));
        }
        let padding = self.0.or_else(|| gene.missing.chars().last()).unwrap_or('-');
        let length = gene.max_length();
        log::debug!("Padding gene {} to {} characters", gene.name, length);
        Ok(Some(gene.map_sequences(|mut s| {
            let short = length - s.chars().count();
            s.extend(std::iter::repeat(padding).take(short));
            s
        })))
    }
}

/// Collapses a composite key into a single `seqid` field
#[derive(Debug, Clone)]
pub struct OpIndexMerge {
    separator: String,
}

impl OpIndexMerge {
    pub fn new<S: Into<String>>(separator: S) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for OpIndexMerge {
    fn default() -> Self {
        Self::new("_")
    }
}

impl Operator for OpIndexMerge {
    fn apply(&mut self, mut gene: GeneSeries) -> Result<Option<GeneSeries>> {
        if gene.fields.len() <= 1 {
            return Ok(Some(gene));
        }
        for record in &mut gene.records {
            record.key = TaxonKey::from(record.key.joined(&self.separator));
        }
        gene.fields = vec![SEQID.to_string()];
        Ok(Some(gene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_uniform() {
        let gene = GeneSeries::from_pairs("g", [("a", "ACGT"), ("b", "AC")]).with_missing("?N");
        let gene = OpMakeUniform(None).apply(gene).unwrap().unwrap();
        assert_eq!(gene.get_primary("b"), Some("ACNN"));
        let gene = GeneSeries::from_pairs("g", [("a", "A"), ("b", "")]);
        let gene = OpMakeUniform(Some('-')).apply(gene).unwrap().unwrap();
        assert_eq!(gene.get_primary("b"), Some("-"));
    }

    #[test]
    fn test_index_merge() {
        let mut gene = GeneSeries::new("g", vec!["species".into(), "voucher".into(), "locality".into()]);
        gene.push(TaxonKey::from(["Boophis", "V1", "Ranomafana"]), "ACGT");
        gene.push(TaxonKey::from(["Mantella", "", "Andasibe"]), "ACGA");
        let gene = OpIndexMerge::new("|").apply(gene).unwrap().unwrap();
        assert_eq!(gene.fields, vec!["seqid".to_string()]);
        assert_eq!(gene.get_primary("Boophis|V1|Ranomafana"), Some("ACGT"));
        assert_eq!(gene.get_primary("Mantella|Andasibe"), Some("ACGA"));
    }

    #[test]
    fn test_index_merge_keeps_flat_keys() {
        let gene = GeneSeries::from_pairs("g", [("a b", "A")]);
        let merged = OpIndexMerge::default().apply(gene.clone()).unwrap().unwrap();
        assert_eq!(merged, gene);
    }
}
