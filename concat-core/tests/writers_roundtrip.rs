use concat_core::frame::ReadingFrame;
use concat_core::io::{read_directory, read_zip_archive};
use concat_core::writers::{PartitionKind, PartitionWriter};
use concat_core::{FileFormat, FileType, FileWriter, GeneIO, GeneSeries, GeneStream, Result, Routes, WriterConfig};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tempfile::tempdir;

/// Minimal FASTA codec keyed by `seqid`
struct PlainFasta;

impl GeneIO for PlainFasta {
    fn read_gene(&self, name: &str, input: &mut dyn BufRead) -> Result<GeneSeries> {
        let mut gene = GeneSeries::new(name, vec!["seqid".to_string()]);
        let mut key: Option<String> = None;
        for line in input.lines() {
            let line = line?;
            match line.strip_prefix('>') {
                Some(header) => key = Some(header.to_string()),
                None => {
                    if let Some(key) = key.take() {
                        gene.push(key, line);
                    }
                }
            }
        }
        Ok(gene)
    }

    fn write_gene(&self, gene: &GeneSeries, output: &mut dyn Write) -> Result<()> {
        for record in &gene.records {
            writeln!(output, ">{}", record.key.joined("_"))?;
            writeln!(output, "{}", record.sequence)?;
        }
        Ok(())
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn markers() -> Vec<GeneSeries> {
    vec![
        GeneSeries::from_pairs("cox1", [("Boophis", "ACGT"), ("Mantella", "AC")]),
        GeneSeries::from_pairs("cytb", [("Mantella", "GGG")]),
        GeneSeries::from_pairs("void", [("Boophis", "??--")]),
    ]
}

fn coding_genes() -> Vec<GeneSeries> {
    vec![
        GeneSeries::from_pairs("gene1", [("seq1", "ATCGCCTAA")]).with_reading_frame(ReadingFrame::P1),
        GeneSeries::from_pairs("gene2", [("seq1", "GCCTAA")])
            .with_reading_frame(ReadingFrame::N2)
            .with_missing("n"),
        GeneSeries::from_pairs("gene3", [("seq1", "TAA")])
            .with_reading_frame(ReadingFrame::P3)
            .with_missing("Nn?"),
    ]
}

fn routes(config: &WriterConfig) -> Routes {
    let io: Arc<dyn GeneIO> = Arc::new(PlainFasta);
    Routes::new()
        .with_gene_io(FileFormat::Fasta, Arc::clone(&io), config)
        .with_tab(config)
        .with_partitions(io, config)
}

#[test]
fn concatenated_file_fills_absent_genes() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("concat.fas");
    let config = WriterConfig::default();

    routes(&config)
        .write(FileType::File, FileFormat::Fasta, GeneStream::from_genes(markers()), &path)
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, ">Boophis\nACGT---\n>Mantella\nAC--GGG\n");
}

#[test]
fn zip_archive_round_trip() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("markers.zip");
    let config = WriterConfig::for_format(FileFormat::Fasta);
    let routes = routes(&config);

    routes
        .write(FileType::ZipArchive, FileFormat::Fasta, GeneStream::from_genes(markers()), &path)
        .unwrap();
    let names: Vec<String> = read_zip_archive(&path).unwrap().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["cox1", "cytb"]);

    let genes = routes
        .read(FileType::ZipArchive, FileFormat::Fasta, &path)
        .unwrap()
        .collect_genes()
        .unwrap();
    assert_eq!(genes[0].name, "cox1");
    assert_eq!(genes[0].get_primary("Mantella"), Some("AC--"));
    assert_eq!(genes[1].get_primary("Mantella"), Some("GGG"));
}

#[test]
fn directory_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("markers");
    let config = WriterConfig::default();
    let routes = routes(&config);

    routes
        .write(FileType::Directory, FileFormat::Fasta, GeneStream::from_genes(markers()), &path)
        .unwrap();
    assert!(path.join("cox1.fas").is_file());
    assert!(!path.join("void.fas").exists());

    let genes = routes
        .read(FileType::Directory, FileFormat::Fasta, &path)
        .unwrap()
        .collect_genes()
        .unwrap();
    let names: Vec<&str> = genes.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["cox1", "cytb"]);
}

#[test]
fn iqtree_directory_lists_codon_sets() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("iqtree");
    let config = WriterConfig::default();

    routes(&config)
        .write(FileType::Directory, FileFormat::IQTree, GeneStream::from_genes(coding_genes()), &path)
        .unwrap();

    let entries = read_directory(&path).unwrap();
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["alignment", "alignment"]);

    let alignment = std::fs::read_to_string(path.join("alignment.phy")).unwrap();
    assert_eq!(alignment, ">seq1\nATCGCCTAA--TTAGGC-TAA\n");

    let sets = std::fs::read_to_string(path.join("alignment.nex")).unwrap();
    let expected = "#NEXUS\n\nBEGIN SETS;\n\n\
                    charset gene1_1st = 1-9\\3;\n\
                    charset gene1_2nd = 2-9\\3;\n\
                    charset gene1_3rd = 3-9\\3;\n\n\
                    charset gene2_1st = 10-17\\3;\n\
                    charset gene2_2nd = 11-17\\3;\n\
                    charset gene2_3rd = 12-17\\3;\n\n\
                    charset gene3_1st = 18-21\\3;\n\
                    charset gene3_2nd = 19-21\\3;\n\
                    charset gene3_3rd = 20-21\\3;\n\n\
                    END;\n";
    assert_eq!(sets, expected);
}

#[test]
fn partition_finder_archive_keeps_frames_when_not_adjusted() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("pf.zip");
    let mut config = WriterConfig::default();
    config.adjust_frames = false;
    config.alignment = "concat.phy".to_string();

    let writer = PartitionWriter::new(
        PartitionKind::PartitionFinder,
        FileType::ZipArchive,
        Arc::new(PlainFasta),
        config,
    );
    writer.write(GeneStream::from_genes(coding_genes()), &path).unwrap();

    let entries = read_zip_archive(&path).unwrap();
    assert_eq!(entries.len(), 2);
    let (name, alignment) = &entries[0];
    assert_eq!(name, "concat");
    assert_eq!(String::from_utf8_lossy(alignment), ">seq1\nATCGCCTAAGCCTAATAA\n");

    let cfg = String::from_utf8(entries[1].1.clone()).unwrap();
    assert!(cfg.contains("alignment = concat.phy;\n"));
    assert!(cfg.contains("gene2_1st = 11-15\\3;\ngene2_2nd = 10-15\\3;\ngene2_3rd = 12-15\\3;\n"));
    assert!(cfg.contains("gene3_1st = 18-18\\3;\ngene3_2nd = 16-18\\3;\ngene3_3rd = 17-18\\3;\n"));
}

#[test]
fn repeated_gene_keeps_one_charset() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("split.zip");
    let mut config = WriterConfig::default();
    config.alignment = "concat.phy".to_string();
    let genes = vec![
        GeneSeries::from_pairs("cox1", [("Boophis", "ACGT")]),
        GeneSeries::from_pairs("cytb", [("Boophis", "GG"), ("Mantella", "TT")]),
        GeneSeries::from_pairs("cox1", [("Mantella", "TTTT")]),
    ];

    let writer = PartitionWriter::new(
        PartitionKind::PartitionFinder,
        FileType::ZipArchive,
        Arc::new(PlainFasta),
        config,
    );
    writer.write(GeneStream::from_genes(genes), &path).unwrap();

    let entries = read_zip_archive(&path).unwrap();
    assert_eq!(String::from_utf8_lossy(&entries[0].1), ">Boophis\nACGTGG\n>Mantella\nTTTTTT\n");
    let cfg = String::from_utf8(entries[1].1.clone()).unwrap();
    assert!(cfg.contains("[data_blocks]\n\ncox1 = 1-4;\ncytb = 5-6;\n\n"), "{}", cfg);
}

#[test]
fn unsupported_route_is_reported() {
    let routes = routes(&WriterConfig::default());
    let result = routes.write(
        FileType::File,
        FileFormat::IQTree,
        GeneStream::from_genes(coding_genes()),
        std::path::Path::new("unused"),
    );
    assert!(result.is_err());
}
