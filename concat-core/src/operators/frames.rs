use crate::detect::ReadingFrameDetector;
use crate::error::Result;
use crate::frame::ReadingFrame;
use crate::model::GeneSeries;

use super::Operator;

/// Complement of a nucleotide symbol, IUPAC ambiguity codes included.
/// Case is preserved and unknown symbols map to themselves.
pub fn complement_nucleotide(nucleotide: char) -> char {
    let complement = match nucleotide.to_ascii_uppercase() {
        'A' => 'T',
        'T' | 'U' => 'A',
        'C' => 'G',
        'G' => 'C',
        'R' => 'Y',
        'Y' => 'R',
        'K' => 'M',
        'M' => 'K',
        'B' => 'V',
        'V' => 'B',
        'D' => 'H',
        'H' => 'D',
        _ => return nucleotide,
    };
    if nucleotide.is_ascii_lowercase() {
        complement.to_ascii_lowercase()
    } else {
        complement
    }
}

/// Generate reverse complement of a sequence
pub fn reverse_complement(sequence: &str) -> String {
    sequence.chars().rev().map(complement_nucleotide).collect()
}

/// Turns negative-frame genes into forward ones of the same magnitude
#[derive(Debug, Clone, Copy, Default)]
pub struct OpReverseNegativeFrames;

impl Operator for OpReverseNegativeFrames {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        if !gene.reading_frame.is_reverse() {
            return Ok(Some(gene));
        }
        log::debug!("Reverse-complementing gene {} ({})", gene.name, gene.reading_frame.label());
        let mut gene = gene.map_sequences(|s| reverse_complement(&s));
        gene.reading_frame = gene.reading_frame.to_forward();
        Ok(Some(gene))
    }
}

/// Pads frames ±2 and ±3 so that the first full codon starts the sequence.
///
/// Forward genes are padded at the start and reverse genes at the end,
/// with the given character or else the last missing character of the gene.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpPadToFirstCodon {
    pub padding: Option<char>,
}

impl OpPadToFirstCodon {
    pub fn new(padding: Option<char>) -> Self {
        Self { padding }
    }
}

impl Operator for OpPadToFirstCodon {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        let frame = gene.reading_frame;
        if frame.magnitude() < 2 {
            return Ok(Some(gene));
        }
        let Some(padding) = self.padding.or_else(|| gene.missing.chars().last()) else {
            return Ok(Some(gene));
        };
        let count = 3 - frame.offset();
        let pad: String = std::iter::repeat(padding).take(count).collect();
        log::debug!("Padding gene {} with {:?} for frame {}", gene.name, pad, frame.label());
        let mut gene = if frame.is_reverse() {
            gene.map_sequences(|s| s + &pad)
        } else {
            gene.map_sequences(|s| format!("{}{}", pad, s))
        };
        gene.reading_frame = if frame.is_reverse() {
            ReadingFrame::N1
        } else {
            ReadingFrame::P1
        };
        Ok(Some(gene))
    }
}

/// Assigns the detected reading frame to every gene.
///
/// Frames already set are verified instead of replaced.
#[derive(Debug, Clone, Copy)]
pub struct OpDetectReadingFrame<'c> {
    detector: ReadingFrameDetector<'c>,
}

impl<'c> OpDetectReadingFrame<'c> {
    pub fn new(detector: ReadingFrameDetector<'c>) -> Self {
        Self { detector }
    }
}

impl Default for OpDetectReadingFrame<'static> {
    fn default() -> Self {
        Self::new(ReadingFrameDetector::default())
    }
}

impl Operator for OpDetectReadingFrame<'_> {
    fn apply(&mut self, mut gene: GeneSeries) -> Result<Option<GeneSeries>> {
        let frame = self.detector.reading_frame(&gene)?;
        log::debug!("Gene {} reads in frame {}", gene.name, frame.label());
        gene.reading_frame = frame;
        Ok(Some(gene))
    }
}
