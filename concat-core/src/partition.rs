//! Partition files for phylogenetics tools
//!
//! IQ-TREE reads a NEXUS file made of a single `sets` block;
//! PartitionFinder reads a `.cfg` file whose data blocks are charsets.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::charset::Charset;
use crate::error::Result;

/// Writes `#NEXUS` with one `sets` block.
///
/// Unless `include_full_markers_with_codons` is set, genes with a known
/// frame are only listed by codon position.
pub fn write_nexus_sets<W: Write + ?Sized>(
    out: &mut W,
    charsets: &[Charset],
    include_full_markers_with_codons: bool,
) -> Result<()> {
    writeln!(out, "#NEXUS")?;
    writeln!(out)?;
    writeln!(out, "BEGIN SETS;")?;
    writeln!(out)?;

    let full: Vec<&Charset> = charsets
        .iter()
        .filter(|charset| include_full_markers_with_codons || !charset.has_codons())
        .collect();
    if include_full_markers_with_codons || !full.is_empty() {
        for charset in &full {
            writeln!(out, "charset {}", charset)?;
        }
        writeln!(out)?;
    }
    for charset in charsets.iter().filter(|charset| charset.has_codons()) {
        for codon_set in charset.codon_sets() {
            writeln!(out, "charset {}", codon_set)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "END;")?;
    Ok(())
}

/// Settings of a PartitionFinder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionFinderConfig {
    pub alignment: String,
    pub branchlengths: String,
    pub models: String,
    pub model_selection: String,
    pub search: String,
}

impl Default for PartitionFinderConfig {
    fn default() -> Self {
        Self {
            alignment: "alignment.phy".to_string(),
            branchlengths: "linked".to_string(),
            models: "mrbayes".to_string(),
            model_selection: "aicc".to_string(),
            search: "greedy".to_string(),
        }
    }
}

impl PartitionFinderConfig {
    pub fn with_alignment<S: Into<String>>(mut self, alignment: S) -> Self {
        self.alignment = alignment.into();
        self
    }

    /// Writes the `.cfg` file; framed charsets become one data block per codon position
    pub fn write_cfg<W: Write + ?Sized>(&self, out: &mut W, charsets: &[Charset]) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "## ALIGNMENT FILE ##")?;
        writeln!(out, "alignment = {};", self.alignment)?;
        writeln!(out)?;
        writeln!(out, "## BRANCHLENGTHS: linked | unlinked ##")?;
        writeln!(out, "branchlengths = {};", self.branchlengths)?;
        writeln!(out)?;
        writeln!(out, "## MODELS OF EVOLUTION: all | allx | mrbayes | beast | gamma | gammai | <list> ##")?;
        writeln!(out, "models = {};", self.models)?;
        writeln!(out)?;
        writeln!(out, "# MODEL SELECTION: AIC | AICc | BIC #")?;
        writeln!(out, "model_selection = {};", self.model_selection)?;
        writeln!(out)?;
        writeln!(out, "## DATA BLOCKS: see manual for how to define ##")?;
        writeln!(out, "[data_blocks]")?;
        writeln!(out)?;
        for charset in charsets {
            if charset.has_codons() {
                for codon_set in charset.codon_sets() {
                    writeln!(out, "{}", codon_set)?;
                }
            } else {
                writeln!(out, "{}", charset)?;
            }
        }
        writeln!(out)?;
        writeln!(out, "## SCHEMES, search: all | user | greedy | rcluster | rclusterf | kmeans ##")?;
        writeln!(out, "[schemes]")?;
        writeln!(out, "search = {};", self.search)?;
        Ok(())
    }
}
