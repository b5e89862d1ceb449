//! Reading-frame and genetic-code detection
//!
//! Every sequence is scanned for stop codons in all six frames. A stop found
//! in the middle of a sequence rules out, for that frame, every genetic code
//! in which the triplet terminates translation. Stops close to the end of
//! the coding strand are expected and carry no evidence.

use std::collections::{BTreeMap, BTreeSet};

use crate::codes::{Codon, GeneticCode, GeneticCodes};
use crate::error::{ConcatError, Result};
use crate::frame::ReadingFrame;
use crate::model::GeneSeries;
use crate::operators::reverse_complement;

/// A genetic code and a reading frame that are consistent with the data
pub type ReadingCombination = (GeneticCode, ReadingFrame);

/// Stop codon found at a frame, as read on the coding strand
pub type StopMatch = (Codon, ReadingFrame);

/// Forward stops starting this close to the end are ignored
const FORWARD_TAIL: usize = 6;
/// Reverse stops starting this close to the beginning are ignored
const REVERSE_HEAD: usize = 3;

/// Uppercase bytes, one per character; non-ASCII characters never match a codon
fn bases(sequence: &str) -> Vec<u8> {
    sequence
        .chars()
        .map(|c| if c.is_ascii() { c.to_ascii_uppercase() as u8 } else { b'?' })
        .collect()
}

fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// Forward-strand stop codons of `sequence`, at every offset
pub fn detect_stop_codons(sequence: &str, stops: &BTreeSet<Codon>) -> Vec<StopMatch> {
    let bases = bases(sequence);
    let length = bases.len();
    bases
        .windows(3)
        .enumerate()
        .filter(|(start, _)| length - start >= FORWARD_TAIL)
        .filter_map(|(start, window)| {
            let codon = [window[0], window[1], window[2]];
            stops
                .contains(&codon)
                .then(|| (codon, ReadingFrame::forward(start)))
        })
        .collect()
}

/// Stop codons of the complementary strand, reported as read on that strand
pub fn detect_reverse_stop_codons(sequence: &str, stops: &BTreeSet<Codon>) -> Vec<StopMatch> {
    let bases = bases(sequence);
    let length = bases.len();
    bases
        .windows(3)
        .enumerate()
        .filter(|(start, _)| *start >= REVERSE_HEAD)
        .filter_map(|(start, window)| {
            let codon = [complement(window[2]), complement(window[1]), complement(window[0])];
            let end = start + 3;
            stops
                .contains(&codon)
                .then(|| (codon, ReadingFrame::reverse(length - end)))
        })
        .collect()
}

/// Genetic codes that survive in each of the six frames
pub fn allowed_translations<'m, I>(
    matches: I,
    codes: &GeneticCodes,
) -> BTreeMap<ReadingFrame, BTreeSet<GeneticCode>>
where
    I: IntoIterator<Item = &'m StopMatch>,
{
    let all: BTreeSet<GeneticCode> = codes.codes().collect();
    let mut allowed: BTreeMap<_, _> = ReadingFrame::ALL
        .iter()
        .map(|frame| (*frame, all.clone()))
        .collect();
    for (codon, frame) in matches {
        if let (Some(tables), Some(surviving)) =
            (codes.tables_stopping_at(codon), allowed.get_mut(frame))
        {
            surviving.retain(|code| !tables.contains(code));
        }
    }
    allowed
}

/// Combinations consistent with a single sequence.
///
/// A known `code` restricts the result to that code.
pub fn detect_reading_combinations(
    sequence: &str,
    code: GeneticCode,
    codes: &GeneticCodes,
) -> BTreeSet<ReadingCombination> {
    let stops = codes.stops(code);
    let matches: BTreeSet<StopMatch> = detect_stop_codons(sequence, &stops)
        .into_iter()
        .chain(detect_reverse_stop_codons(sequence, &stops))
        .collect();
    allowed_translations(&matches, codes)
        .into_iter()
        .flat_map(|(frame, tables)| tables.into_iter().map(move |table| (table, frame)))
        .filter(|(table, _)| !code.is_known() || *table == code)
        .collect()
}

/// Combinations consistent with every sequence of the gene
pub fn column_reading_combinations(gene: &GeneSeries, codes: &GeneticCodes) -> BTreeSet<ReadingCombination> {
    let mut sequences = gene.sequences();
    let Some(first) = sequences.next() else {
        return BTreeSet::new();
    };
    let mut combinations = detect_reading_combinations(first, gene.genetic_code, codes);
    for sequence in sequences {
        if combinations.is_empty() {
            break;
        }
        let other = detect_reading_combinations(sequence, gene.genetic_code, codes);
        combinations.retain(|combination| other.contains(combination));
    }
    combinations
}

/// Last full codon of `sequence` read in `frame`.
///
/// Negative frames are read on the reverse complement.
pub fn last_codon(sequence: &str, frame: ReadingFrame) -> Option<Codon> {
    let bases = if frame.is_reverse() {
        self::bases(&reverse_complement(sequence))
    } else {
        self::bases(sequence)
    };
    let offset = frame.offset();
    if bases.len() < offset + 3 {
        return None;
    }
    let end = bases.len() - (bases.len() - offset) % 3;
    Some([bases[end - 3], bases[end - 2], bases[end - 1]])
}

/// Keeps only combinations under which every sequence ends on a stop codon
pub fn filter_by_last_codons<'s, I>(
    sequences: I,
    combinations: &mut BTreeSet<ReadingCombination>,
    codes: &GeneticCodes,
) where
    I: IntoIterator<Item = &'s str>,
{
    for sequence in sequences {
        combinations.retain(|(code, frame)| {
            let table = codes.get(*code);
            match (last_codon(sequence, *frame), table) {
                (Some(codon), Some(table)) => table.is_stop(&codon),
                _ => false,
            }
        });
    }
}

pub fn extract_frames(combinations: &BTreeSet<ReadingCombination>) -> BTreeSet<ReadingFrame> {
    combinations.iter().map(|(_, frame)| *frame).collect()
}

/// Settles the reading frame of a whole gene.
///
/// The gene's own `genetic_code` and `reading_frame` act as assumptions: a
/// known code restricts detection to that table, and a known frame must
/// survive detection or the gene is rejected.
pub fn final_column_reading_frame(gene: &GeneSeries, codes: &GeneticCodes) -> Result<ReadingFrame> {
    if gene.is_empty() {
        return Err(ConcatError::AmbiguousReadingFrame {
            gene: gene.name.clone(),
            candidates: BTreeSet::new(),
        });
    }
    if codes.is_empty() {
        log::warn!("No genetic code tables, keeping reading frame of {}", gene.name);
        return Ok(gene.reading_frame);
    }
    if gene.genetic_code.is_known() && codes.get(gene.genetic_code).is_none() {
        return Err(ConcatError::GeneticCodeData(format!(
            "gene {:?} uses unknown genetic code {}",
            gene.name,
            gene.genetic_code.id()
        )));
    }

    let mut combinations = column_reading_combinations(gene, codes);
    let frames = extract_frames(&combinations);
    if frames.is_empty() {
        return Err(ConcatError::NoReadingFrames {
            gene: gene.name.clone(),
        });
    }
    if gene.reading_frame.is_known() {
        if !frames.contains(&gene.reading_frame) {
            return Err(ConcatError::BadReadingFrame {
                gene: gene.name.clone(),
                frame: gene.reading_frame,
            });
        }
        return Ok(gene.reading_frame);
    }
    if frames.len() == 1 {
        return Ok(frames.into_iter().next().unwrap_or_default());
    }

    filter_by_last_codons(gene.sequences(), &mut combinations, codes);
    let frames = extract_frames(&combinations);
    let mut remaining = frames.iter();
    match (remaining.next(), remaining.next()) {
        (None, _) => Err(ConcatError::NoReadingFrames {
            gene: gene.name.clone(),
        }),
        (Some(frame), None) => Ok(*frame),
        (Some(_), Some(_)) => Err(ConcatError::AmbiguousReadingFrame {
            gene: gene.name.clone(),
            candidates: frames,
        }),
    }
}

/// Detection bound to one collection of genetic code tables
#[derive(Debug, Clone, Copy)]
pub struct ReadingFrameDetector<'c> {
    codes: &'c GeneticCodes,
}

impl<'c> ReadingFrameDetector<'c> {
    pub fn new(codes: &'c GeneticCodes) -> Self {
        Self { codes }
    }

    pub fn codes(&self) -> &'c GeneticCodes {
        self.codes
    }

    pub fn sequence_combinations(&self, sequence: &str, code: GeneticCode) -> BTreeSet<ReadingCombination> {
        detect_reading_combinations(sequence, code, self.codes)
    }

    pub fn gene_combinations(&self, gene: &GeneSeries) -> BTreeSet<ReadingCombination> {
        column_reading_combinations(gene, self.codes)
    }

    pub fn reading_frame(&self, gene: &GeneSeries) -> Result<ReadingFrame> {
        final_column_reading_frame(gene, self.codes)
    }
}

impl Default for ReadingFrameDetector<'static> {
    fn default() -> Self {
        Self::new(GeneticCodes::bundled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn standard_stops() -> BTreeSet<Codon> {
        GeneticCodes::bundled().stops(GeneticCode::STANDARD)
    }

    #[test]
    fn test_forward_scan_ignores_tail() {
        let matches = detect_stop_codons("ATGTAGCCCTAA", &standard_stops());
        assert_eq!(matches, vec![(*b"TAG", ReadingFrame::P1)]);
        assert!(detect_stop_codons("TAACC", &standard_stops()).is_empty());
    }

    #[test]
    fn test_forward_scan_any_offset_and_case() {
        let matches = detect_stop_codons("cctaactgaccccc", &standard_stops());
        assert_eq!(
            matches,
            vec![(*b"TAA", ReadingFrame::P3), (*b"TGA", ReadingFrame::P1)]
        );
        let all_stops = GeneticCodes::bundled().stops(GeneticCode::UNKNOWN);
        let overlapping = detect_stop_codons("cctagaccccccc", &all_stops);
        assert_eq!(
            overlapping,
            vec![(*b"TAG", ReadingFrame::P3), (*b"AGA", ReadingFrame::P1)]
        );
    }

    #[test]
    fn test_reverse_scan() {
        // TTA on the given strand reads TAA on the complementary one
        let matches = detect_reverse_stop_codons("GGGCTTAGG", &standard_stops());
        assert_eq!(matches, vec![(*b"TAA", ReadingFrame::N3)]);
        assert!(detect_reverse_stop_codons("TTAGGGGGG", &standard_stops()).is_empty());
    }

    #[test]
    fn test_allowed_translations() {
        let codes = GeneticCodes::bundled();
        let matches = [(*b"TGA", ReadingFrame::P2)];
        let allowed = allowed_translations(&matches, codes);
        assert_eq!(allowed.len(), 6);
        assert!(!allowed[&ReadingFrame::P2].contains(&GeneticCode::STANDARD));
        assert!(allowed[&ReadingFrame::P2].contains(&GeneticCode::new(2)));
        assert_eq!(allowed[&ReadingFrame::P1].len(), codes.len());
    }

    #[test]
    fn test_fixed_code_restricts_combinations() {
        let codes = GeneticCodes::bundled();
        let combinations = detect_reading_combinations("ATGAGACCCCCCTAA", GeneticCode::STANDARD, codes);
        assert!(combinations.iter().all(|(code, _)| *code == GeneticCode::STANDARD));
        assert!(combinations.contains(&(GeneticCode::STANDARD, ReadingFrame::P1)));
        let mito = detect_reading_combinations("ATGAGACCCCCCTAA", GeneticCode::new(2), codes);
        assert!(!mito.contains(&(GeneticCode::new(2), ReadingFrame::P1)));
    }

    #[test]
    fn test_last_codon() {
        assert_eq!(last_codon("ATCGCCTAA", ReadingFrame::P1), Some(*b"TAA"));
        assert_eq!(last_codon("ATCGCCTAA", ReadingFrame::P2), Some(*b"CCT"));
        assert_eq!(last_codon("GCCTAA", ReadingFrame::N2), Some(*b"TAG"));
        assert_eq!(last_codon("TTAGGC", ReadingFrame::N1), Some(*b"TAA"));
        assert_eq!(last_codon("AC", ReadingFrame::P1), None);
    }

    #[test]
    fn test_final_frame_by_last_codon() {
        let gene = GeneSeries::from_pairs("gene1", [("seq1", "ATCGCCTAA")]);
        let frame = final_column_reading_frame(&gene, GeneticCodes::bundled()).unwrap();
        assert_eq!(frame, ReadingFrame::P1);
    }

    #[test]
    fn test_final_frame_errors() {
        let detector = ReadingFrameDetector::default();
        let empty = GeneSeries::new("empty", vec!["seqid".into()]);
        match detector.reading_frame(&empty) {
            Err(ConcatError::AmbiguousReadingFrame { candidates, .. }) => assert!(candidates.is_empty()),
            other => panic!("unexpected {:?}", other),
        }

        // stops in all six frames
        let stops = GeneSeries::from_pairs("stops", [("seq1", "CCCTAACTAACCTAATTAGTTAGGTTACCCCCC")]);
        assert!(matches!(
            detector.reading_frame(&stops),
            Err(ConcatError::NoReadingFrames { .. })
        ));

        // no frame ends on a stop
        let short = GeneSeries::from_pairs("short", [("seq1", "ACG")]);
        assert!(matches!(
            detector.reading_frame(&short),
            Err(ConcatError::NoReadingFrames { .. })
        ));

        let stop_only = GeneSeries::from_pairs("stop", [("seq1", "TAA")]);
        match detector.reading_frame(&stop_only) {
            Err(ConcatError::AmbiguousReadingFrame { candidates, .. }) => {
                assert_eq!(candidates.into_iter().collect::<Vec<_>>(), vec![ReadingFrame::N1, ReadingFrame::P1])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_supplied_frame_must_survive() {
        let detector = ReadingFrameDetector::default();
        let gene = GeneSeries::from_pairs("gene", [("seq1", "ATGTAACCCCCCTAA")])
            .with_genetic_code(GeneticCode::STANDARD);
        let bad = gene.clone().with_reading_frame(ReadingFrame::P1);
        assert!(matches!(
            detector.reading_frame(&bad),
            Err(ConcatError::BadReadingFrame { frame: ReadingFrame::P1, .. })
        ));
        let good = gene.with_reading_frame(ReadingFrame::P3);
        assert_eq!(detector.reading_frame(&good).unwrap(), ReadingFrame::P3);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let gene = GeneSeries::from_pairs("gene", [("seq1", "ATGCCCTAA")]).with_genetic_code(GeneticCode::new(7));
        assert!(matches!(
            final_column_reading_frame(&gene, GeneticCodes::bundled()),
            Err(ConcatError::GeneticCodeData(_))
        ));
    }

    #[test]
    fn test_no_tables_keeps_frame() {
        let codes = GeneticCodes::default();
        let gene = GeneSeries::from_pairs("gene", [("seq1", "ATGCCCTAA")]).with_reading_frame(ReadingFrame::N2);
        assert_eq!(final_column_reading_frame(&gene, &codes).unwrap(), ReadingFrame::N2);
    }

    fn non_stop_codon() -> impl Strategy<Value = String> {
        (0usize..64)
            .prop_map(crate::codes::codon_at)
            .prop_filter("stop codon", |codon| !standard_stops().contains(codon))
            .prop_map(|codon| String::from_utf8_lossy(&codon).into_owned())
    }

    proptest! {
        #[test]
        fn prop_stop_free_frame_survives(
            prefix in "[ACGT]{0,2}",
            codons in prop::collection::vec(non_stop_codon(), 1..40),
        ) {
            let shift = prefix.len();
            let forward = [ReadingFrame::P1, ReadingFrame::P2, ReadingFrame::P3][shift];
            let reverse = [ReadingFrame::N1, ReadingFrame::N2, ReadingFrame::N3][shift];
            let sequence = format!("{}{}", prefix, codons.concat());

            let combinations = detect_reading_combinations(&sequence, GeneticCode::UNKNOWN, GeneticCodes::bundled());
            prop_assert!(combinations.contains(&(GeneticCode::STANDARD, forward)), "{}", forward.label());
            let reversed = reverse_complement(&sequence);
            let combinations = detect_reading_combinations(&reversed, GeneticCode::STANDARD, GeneticCodes::bundled());
            prop_assert!(combinations.contains(&(GeneticCode::STANDARD, reverse)), "{}", reverse.label());
        }

        #[test]
        fn prop_reverse_agrees_with_reverse_complement(sequence in "[ACGTNacgt]{0,60}") {
            let stops = GeneticCodes::bundled().stops(GeneticCode::UNKNOWN);
            let reverse: BTreeSet<StopMatch> = detect_reverse_stop_codons(&sequence, &stops).into_iter().collect();
            let forward: BTreeSet<StopMatch> = detect_stop_codons(&reverse_complement(&sequence), &stops)
                .into_iter()
                .map(|(codon, frame)| (codon, frame.flipped()))
                .collect();
            prop_assert_eq!(reverse, forward);
        }
    }
}
