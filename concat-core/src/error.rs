//! Error taxonomy for the concatenation engine

use std::collections::BTreeSet;
use thiserror::Error;

use crate::frame::ReadingFrame;
use crate::io::{FileFormat, FileType};
use crate::model::GeneSeries;

/// Main error type for gene transformation and concatenation
#[derive(Error, Debug)]
pub enum ConcatError {
    #[error("Invalid gene series {gene:?}: {reason}")]
    InvalidGeneSeries { gene: String, reason: String },

    #[error("No possible reading frames exist for gene {gene:?}")]
    NoReadingFrames { gene: String },

    #[error("Bad reading frame for gene {gene:?}: stop codons detected for {frame}")]
    BadReadingFrame { gene: String, frame: ReadingFrame },

    #[error("Ambiguous reading frame for gene {gene:?}: possible values: {}", format_frames(.candidates))]
    AmbiguousReadingFrame {
        gene: String,
        candidates: BTreeSet<ReadingFrame>,
    },

    #[error("Cannot join gene {:?}: {reason}", incoming_name(.incoming))]
    BadGeneJoin {
        existing: Box<GeneSeries>,
        incoming: Box<GeneSeries>,
        reason: String,
    },

    #[error("Genetic code data error: {0}")]
    GeneticCodeData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No handler for {file_type} and {format}")]
    RouteNotFound {
        file_type: FileType,
        format: FileFormat,
    },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ConcatError {
    pub fn invalid<S: Into<String>, R: Into<String>>(gene: S, reason: R) -> Self {
        Self::InvalidGeneSeries {
            gene: gene.into(),
            reason: reason.into(),
        }
    }

    pub fn bad_join<S: Into<String>>(existing: GeneSeries, incoming: GeneSeries, reason: S) -> Self {
        Self::BadGeneJoin {
            existing: Box::new(existing),
            incoming: Box::new(incoming),
            reason: reason.into(),
        }
    }

    pub fn parse<S: Into<String>, M: Into<String>>(file: S, message: M) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Name of the gene this error concerns, if any
    pub fn gene_name(&self) -> Option<&str> {
        match self {
            Self::InvalidGeneSeries { gene, .. }
            | Self::NoReadingFrames { gene }
            | Self::BadReadingFrame { gene, .. }
            | Self::AmbiguousReadingFrame { gene, .. } => Some(gene),
            Self::BadGeneJoin { incoming, .. } => Some(&incoming.name),
            _ => None,
        }
    }
}

fn incoming_name(gene: &GeneSeries) -> &str {
    &gene.name
}

fn format_frames(frames: &BTreeSet<ReadingFrame>) -> String {
    let labels: Vec<String> = frames.iter().map(|frame| frame.label()).collect();
    format!("{{{}}}", labels.join(", "))
}

/// Result type for concatenation operations
pub type Result<T> = std::result::Result<T, ConcatError>;
