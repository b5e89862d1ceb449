//! Writer configuration
//!
//! Options shared by every writer pipeline, loadable from TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConcatError;
use crate::io::FileFormat;
use crate::operators::TextCase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Nucleotide case of written sequences
    #[serde(default)]
    pub case: TextCase,

    /// Used when making sequence length uniform or filling absent genes; empty means unpadded
    #[serde(default = "default_padding")]
    pub padding: String,

    /// Character enforced for missing nucleotides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate_missing: Option<char>,

    /// Character enforced for gaps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate_gap: Option<char>,

    /// Replace unusual characters in species and gene names
    #[serde(default = "default_true")]
    pub sanitize: bool,

    /// Exclude taxa made only of gaps and missing data
    #[serde(default = "default_true")]
    pub drop_empty: bool,

    /// Reverse-complement negative frames and pad to the first codon position
    #[serde(default = "default_true")]
    pub adjust_frames: bool,

    /// List framed markers in full as well as by codon position
    #[serde(default)]
    pub include_full_markers_with_codons: bool,

    /// Joins the components of composite keys
    #[serde(default = "default_index_separator")]
    pub index_separator: String,

    /// Marks gene columns of tab files
    #[serde(default = "default_sequence_prefix")]
    pub sequence_prefix: String,

    /// Sequences starting with `-` start with `N` instead
    #[serde(default)]
    pub spreadsheet: bool,

    /// Name of the alignment inside partition containers
    #[serde(default = "default_alignment")]
    pub alignment: String,

    /// Name of the PartitionFinder configuration file
    #[serde(default = "default_cfg_file")]
    pub cfg_file: String,
}

fn default_padding() -> String { "-".to_string() }
fn default_true() -> bool { true }
fn default_index_separator() -> String { "_".to_string() }
fn default_sequence_prefix() -> String { "sequence_".to_string() }
fn default_alignment() -> String { "alignment.phy".to_string() }
fn default_cfg_file() -> String { "partition_finder.cfg".to_string() }

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            case: TextCase::default(),
            padding: default_padding(),
            translate_missing: None,
            translate_gap: None,
            sanitize: true,
            drop_empty: true,
            adjust_frames: true,
            include_full_markers_with_codons: false,
            index_separator: default_index_separator(),
            sequence_prefix: default_sequence_prefix(),
            spreadsheet: false,
            alignment: default_alignment(),
            cfg_file: default_cfg_file(),
        }
    }
}

impl WriterConfig {
    /// Defaults tuned for one output format
    pub fn for_format(format: FileFormat) -> Self {
        let mut config = Self::default();
        match format {
            FileFormat::Ali => {
                config.translate_missing = Some('?');
                config.translate_gap = Some('*');
                config.padding = "*".to_string();
            }
            FileFormat::Fasta
            | FileFormat::Phylip
            | FileFormat::PartitionFinder
            | FileFormat::IQTree => {
                config.translate_missing = Some('?');
                config.translate_gap = Some('-');
            }
            FileFormat::Tab | FileFormat::Nexus => {
                config.translate_missing = Some('?');
                config.translate_gap = Some('-');
            }
        }
        config
    }

    pub fn padding_char(&self) -> Option<char> {
        self.padding.chars().next()
    }

    /// Character used for genes a specimen lacks
    pub fn filler(&self) -> char {
        self.padding_char().or(self.translate_missing).unwrap_or('-')
    }

    /// Character used to pad reading frames
    pub fn frame_padding(&self) -> Option<char> {
        self.translate_missing.or_else(|| self.padding_char())
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.padding.chars().count() > 1 {
            return Err(ConcatError::Config(format!(
                "padding must be a single character, got {:?}",
                self.padding
            )));
        }
        if self.sequence_prefix.is_empty() {
            return Err(ConcatError::Config("sequence prefix cannot be empty".to_string()));
        }
        if self.alignment.is_empty() || self.cfg_file.is_empty() {
            return Err(ConcatError::Config("output file names cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: WriterConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        log::info!("Loaded writer configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = WriterConfig::default();
        assert_eq!(config.padding_char(), Some('-'));
        assert_eq!(config.filler(), '-');
        assert!(config.drop_empty && config.sanitize && config.adjust_frames);
        assert_eq!(config.alignment, "alignment.phy");
    }

    #[test]
    fn test_format_presets() {
        let ali = WriterConfig::for_format(FileFormat::Ali);
        assert_eq!(ali.translate_gap, Some('*'));
        assert_eq!(ali.padding_char(), Some('*'));
        let fasta = WriterConfig::for_format(FileFormat::Fasta);
        assert_eq!(fasta.translate_missing, Some('?'));
        assert_eq!(fasta.frame_padding(), Some('?'));
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = WriterConfig::for_format(FileFormat::Phylip);
        config.case = TextCase::Upper;
        config.padding = String::new();
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = WriterConfig::load_from_file(temp_file.path())?;

        assert_eq!(loaded, config);
        assert_eq!(loaded.padding_char(), None);
        assert_eq!(loaded.filler(), '?');
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), "case = \"lower\"\ncfg_file = \"pf.cfg\"\n")?;
        let loaded = WriterConfig::load_from_file(temp_file.path())?;
        assert_eq!(loaded.case, TextCase::Lower);
        assert_eq!(loaded.cfg_file, "pf.cfg");
        assert_eq!(loaded.index_separator, "_");
        Ok(())
    }

    #[test]
    fn test_invalid_padding_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "padding = \"ab\"\n").unwrap();
        assert!(WriterConfig::load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_example_toml_generation() {
        let example = WriterConfig::example_toml();
        assert!(example.contains("padding = \"-\""));
        assert!(example.contains("sequence_prefix = \"sequence_\""));
    }
}
