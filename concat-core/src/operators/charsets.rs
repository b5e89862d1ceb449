use crate::charset::Charset;
use crate::error::{ConcatError, Result};
use crate::model::GeneSeries;

use super::Operator;

/// Records where each gene lands in the concatenated alignment.
///
/// Genes pass through unchanged. The operator is stateful: pipe it as
/// `&mut op` and read the charsets once the stream has been drained.
/// A gene repeating an earlier name shares that gene's charset, the way
/// the join concatenates it into the same column, and must have the same
/// length.
#[derive(Debug, Clone)]
pub struct OpExtractCharsets {
    cursor: usize,
    charsets: Vec<Charset>,
}

impl OpExtractCharsets {
    pub fn new() -> Self {
        Self {
            cursor: 1,
            charsets: Vec::new(),
        }
    }

    /// Next free column, 1-based
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn charsets(&self) -> &[Charset] {
        &self.charsets
    }

    pub fn into_charsets(self) -> Vec<Charset> {
        self.charsets
    }
}

impl Default for OpExtractCharsets {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for OpExtractCharsets {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        if !gene.has_uniform_length() {
            return Err(ConcatError::invalid(&gene.name, "Sequences must have equal length"));
        }
        let length = gene.max_length();
        if length == 0 {
            log::debug!("No columns for gene {}, skipping charset", gene.name);
            return Ok(Some(gene));
        }
        if let Some(existing) = self.charsets.iter().find(|c| c.name == gene.name) {
            if existing.length != length {
                return Err(ConcatError::invalid(
                    &gene.name,
                    format!(
                        "Length {} differs from the {} columns already placed under this name",
                        length, existing.length
                    ),
                ));
            }
            log::debug!("Gene {} continues charset {}", gene.name, existing);
            return Ok(Some(gene));
        }
        let charset = Charset::for_gene(&gene, self.cursor);
        log::debug!("Charset {}", charset);
        self.cursor += length;
        self.charsets.push(charset);
        Ok(Some(gene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ReadingFrame;
    use crate::model::GeneStream;

    #[test]
    fn test_positions_accumulate() {
        let genes = vec![
            GeneSeries::from_pairs("gene1", [("seq1", "ATCGCCTAA")]),
            GeneSeries::from_pairs("gene2", [("seq1", "GCCTAA")]).with_reading_frame(ReadingFrame::N2),
            GeneSeries::from_pairs("gene3", [("seq1", "TAA")]).with_reading_frame(ReadingFrame::P3),
        ];
        let mut op = OpExtractCharsets::new();
        let out = GeneStream::from_genes(genes.clone()).pipe(&mut op).collect_genes().unwrap();
        assert_eq!(out, genes);

        let summary: Vec<(&str, usize, usize, ReadingFrame)> = op
            .charsets()
            .iter()
            .map(|c| (c.name.as_str(), c.position, c.length, c.frame))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("gene1", 1, 9, ReadingFrame::Unknown),
                ("gene2", 10, 6, ReadingFrame::N2),
                ("gene3", 16, 3, ReadingFrame::P3),
            ]
        );
        assert_eq!(op.cursor(), 19);
    }

    #[test]
    fn test_unequal_lengths_fail() {
        let gene = GeneSeries::from_pairs("gene", [("a", "ACGT"), ("b", "AC")]);
        assert!(OpExtractCharsets::new().apply(gene).is_err());
    }

    #[test]
    fn test_repeated_name_shares_its_charset() {
        let genes = vec![
            GeneSeries::from_pairs("cox1", [("a", "ACGT")]),
            GeneSeries::from_pairs("cytb", [("a", "GG")]),
            GeneSeries::from_pairs("cox1", [("b", "TTTT")]),
        ];
        let mut op = OpExtractCharsets::new();
        let out = GeneStream::from_genes(genes).pipe(&mut op).collect_genes().unwrap();
        assert_eq!(out.len(), 3);

        let bounds: Vec<String> = op.charsets().iter().map(ToString::to_string).collect();
        assert_eq!(bounds, vec!["cox1 = 1-4;", "cytb = 5-6;"]);
        assert_eq!(op.cursor(), 7);
    }

    #[test]
    fn test_repeated_name_with_other_length_fails() {
        let mut op = OpExtractCharsets::new();
        op.apply(GeneSeries::from_pairs("cox1", [("a", "ACGT")])).unwrap();
        let err = op.apply(GeneSeries::from_pairs("cox1", [("b", "TT")])).unwrap_err();
        assert!(matches!(err, ConcatError::InvalidGeneSeries { .. }));
        assert_eq!(op.charsets().len(), 1);
        assert_eq!(op.cursor(), 5);
    }

    #[test]
    fn test_genes_without_columns_are_skipped() {
        let mut op = OpExtractCharsets::new();
        let empty = GeneSeries::new("empty", vec!["seqid".into()]);
        assert!(op.apply(empty).unwrap().is_some());
        assert!(op.charsets().is_empty());
        assert_eq!(op.cursor(), 1);
    }
}
