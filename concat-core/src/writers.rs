//! Writer and reader pipelines
//!
//! Each writer is an operator pipeline ending in a codec. Pipelines are
//! registered by `(FileType, FileFormat)` in a [`Routes`] table built
//! explicitly by the caller.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::config::WriterConfig;
use crate::error::{ConcatError, Result};
use crate::io::{gene_name_from_path, read_directory, read_zip_archive, Container, FileFormat, FileType, GeneIO, StreamIO, TabFile};
use crate::join::join_any;
use crate::model::GeneStream;
use crate::operators::{
    OpCheckValid, OpDropEmpty, OpExtractCharsets, OpIndexMerge, OpMakeUniform, OpPadToFirstCodon,
    OpReverseNegativeFrames, OpSanitizeGeneNames, OpSanitizeSpeciesNames, OpSequenceCase,
    OpSpreadsheetCompatibility, OpTranslateGap, OpTranslateMissing,
};
use crate::partition::{write_nexus_sets, PartitionFinderConfig};

pub trait FileWriter: Send + Sync {
    fn write(&self, stream: GeneStream<'_>, path: &Path) -> Result<()>;
}

pub trait FileReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<GeneStream<'static>>;
}

/// Validation and normalization shared by every writer
fn base_filter<'a>(stream: GeneStream<'a>, config: &WriterConfig) -> GeneStream<'a> {
    let mut stream = stream.pipe(OpCheckValid);
    if let Some(missing) = config.translate_missing {
        stream = stream.pipe(OpTranslateMissing(missing));
    }
    if let Some(gap) = config.translate_gap {
        stream = stream.pipe(OpTranslateGap(gap));
    }
    stream = stream.pipe(OpSequenceCase(config.case));
    if config.sanitize {
        stream = stream.pipe(OpSanitizeGeneNames).pipe(OpSanitizeSpeciesNames);
    }
    stream
}

/// Base filter, empty-row removal, single-field keys and uniform lengths
fn aligned_filter<'a>(stream: GeneStream<'a>, config: &WriterConfig) -> GeneStream<'a> {
    let mut stream = base_filter(stream, config);
    if config.drop_empty {
        stream = stream.pipe(OpDropEmpty);
    }
    stream
        .pipe(OpIndexMerge::new(config.index_separator.as_str()))
        .pipe(OpMakeUniform(config.padding_char()))
}

/// Joins every gene into one and writes it as a single file named after it
pub struct ConcatenatedWriter {
    io: Arc<dyn GeneIO>,
    config: WriterConfig,
}

impl ConcatenatedWriter {
    pub fn new(io: Arc<dyn GeneIO>, config: WriterConfig) -> Self {
        Self { io, config }
    }
}

impl FileWriter for ConcatenatedWriter {
    fn write(&self, stream: GeneStream<'_>, path: &Path) -> Result<()> {
        let frame = join_any(aligned_filter(stream, &self.config))?;
        let gene = frame.concatenate(gene_name_from_path(path), self.config.filler());
        log::info!(
            "Writing {} genes concatenated over {} specimens to {}",
            frame.column_count(),
            gene.len(),
            path.display()
        );
        self.io.gene_to_path(&gene, path)
    }
}

/// One file per gene inside a directory or a zip archive
pub struct MultiFileWriter {
    file_type: FileType,
    format: FileFormat,
    io: Arc<dyn GeneIO>,
    config: WriterConfig,
}

impl MultiFileWriter {
    pub fn new(file_type: FileType, format: FileFormat, io: Arc<dyn GeneIO>, config: WriterConfig) -> Self {
        Self {
            file_type,
            format,
            io,
            config,
        }
    }
}

impl FileWriter for MultiFileWriter {
    fn write(&self, stream: GeneStream<'_>, path: &Path) -> Result<()> {
        let mut container = Container::create(self.file_type, path)?;
        let mut count = 0;
        for gene in aligned_filter(stream, &self.config) {
            let gene = gene?;
            let entry = format!("{}{}", gene.name, self.format.extension());
            container.write_entry(&entry, |out| self.io.write_gene(&gene, out))?;
            count += 1;
        }
        container.finish()?;
        log::info!("Wrote {} {} files to {}", count, self.format, path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    PartitionFinder,
    IQTree,
}

impl PartitionKind {
    pub fn format(self) -> FileFormat {
        match self {
            Self::PartitionFinder => FileFormat::PartitionFinder,
            Self::IQTree => FileFormat::IQTree,
        }
    }
}

/// Concatenated alignment plus the matching partition file, in a container.
///
/// With `adjust_frames` set, coding genes are turned to the forward strand
/// and padded so that every charset starts on a first codon position.
pub struct PartitionWriter {
    kind: PartitionKind,
    file_type: FileType,
    io: Arc<dyn GeneIO>,
    config: WriterConfig,
}

impl PartitionWriter {
    pub fn new(kind: PartitionKind, file_type: FileType, io: Arc<dyn GeneIO>, config: WriterConfig) -> Self {
        Self {
            kind,
            file_type,
            io,
            config,
        }
    }
}

impl FileWriter for PartitionWriter {
    fn write(&self, stream: GeneStream<'_>, path: &Path) -> Result<()> {
        let config = &self.config;
        let mut stream = base_filter(stream, config)
            .pipe(OpIndexMerge::new(config.index_separator.as_str()))
            .pipe(OpMakeUniform(config.padding_char()));
        if config.adjust_frames {
            stream = stream
                .pipe(OpReverseNegativeFrames)
                .pipe(OpPadToFirstCodon::new(config.frame_padding()));
        }

        let mut extractor = OpExtractCharsets::new();
        let frame = join_any(stream.pipe(&mut extractor))?;
        let charsets = extractor.into_charsets();

        let alignment = Path::new(&config.alignment);
        let gene = frame.concatenate(gene_name_from_path(alignment), config.filler());
        log::info!(
            "Writing {} alignment with {} charsets to {}",
            self.kind.format(),
            charsets.len(),
            path.display()
        );

        let mut container = Container::create(self.file_type, path)?;
        container.write_entry(&config.alignment, |out| self.io.write_gene(&gene, out))?;
        match self.kind {
            PartitionKind::PartitionFinder => {
                let cfg = PartitionFinderConfig::default().with_alignment(config.alignment.as_str());
                container.write_entry(&config.cfg_file, |out| cfg.write_cfg(out, &charsets))?;
            }
            PartitionKind::IQTree => {
                let sets = format!("{}.nex", gene_name_from_path(alignment));
                container.write_entry(&sets, |out| {
                    write_nexus_sets(out, &charsets, config.include_full_markers_with_codons)
                })?;
            }
        }
        container.finish()
    }
}

/// All genes side by side in one tab-separated file
pub struct TabWriter {
    config: WriterConfig,
}

impl TabWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }
}

impl FileWriter for TabWriter {
    fn write(&self, stream: GeneStream<'_>, path: &Path) -> Result<()> {
        let mut stream = base_filter(stream, &self.config);
        if self.config.spreadsheet {
            stream = stream.pipe(OpSpreadsheetCompatibility);
        }
        TabFile::new(self.config.sequence_prefix.as_str()).stream_to_path(stream, path)
    }
}

pub struct SingleFileReader {
    io: Arc<dyn GeneIO>,
}

impl SingleFileReader {
    pub fn new(io: Arc<dyn GeneIO>) -> Self {
        Self { io }
    }
}

impl FileReader for SingleFileReader {
    fn read(&self, path: &Path) -> Result<GeneStream<'static>> {
        let gene = self.io.gene_from_path(path);
        Ok(GeneStream::new(std::iter::once(gene)).pipe(OpCheckValid))
    }
}

/// Reads every file of a directory or a zip archive as one gene
pub struct MultiFileReader {
    file_type: FileType,
    io: Arc<dyn GeneIO>,
}

impl MultiFileReader {
    pub fn new(file_type: FileType, io: Arc<dyn GeneIO>) -> Self {
        Self { file_type, io }
    }
}

impl FileReader for MultiFileReader {
    fn read(&self, path: &Path) -> Result<GeneStream<'static>> {
        let entries = match self.file_type {
            FileType::Directory => read_directory(path)?,
            FileType::ZipArchive => read_zip_archive(path)?,
            FileType::File => {
                return Err(ConcatError::Config(format!(
                    "{} is not a container type",
                    self.file_type
                )))
            }
        };
        log::debug!("Reading {} genes from {}", entries.len(), path.display());
        let io = Arc::clone(&self.io);
        let genes = entries
            .into_iter()
            .map(move |(name, content)| io.read_gene(&name, &mut Cursor::new(content)));
        Ok(GeneStream::new(genes).pipe(OpCheckValid))
    }
}

pub struct TabReader {
    tab: TabFile,
}

impl TabReader {
    pub fn new(config: &WriterConfig) -> Self {
        Self {
            tab: TabFile::new(config.sequence_prefix.as_str()),
        }
    }
}

impl FileReader for TabReader {
    fn read(&self, path: &Path) -> Result<GeneStream<'static>> {
        Ok(self.tab.stream_from_path(path)?.pipe(OpCheckValid))
    }
}

type RouteKey = (FileType, FileFormat);

/// Writers and readers by location kind and format
#[derive(Default)]
pub struct Routes {
    writers: HashMap<RouteKey, Box<dyn FileWriter>>,
    readers: HashMap<RouteKey, Box<dyn FileReader>>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writer<W: FileWriter + 'static>(mut self, file_type: FileType, format: FileFormat, writer: W) -> Self {
        self.writers.insert((file_type, format), Box::new(writer));
        self
    }

    pub fn reader<R: FileReader + 'static>(mut self, file_type: FileType, format: FileFormat, reader: R) -> Self {
        self.readers.insert((file_type, format), Box::new(reader));
        self
    }

    /// Concatenated file, directory and zip routes for a single-gene codec
    pub fn with_gene_io(self, format: FileFormat, io: Arc<dyn GeneIO>, config: &WriterConfig) -> Self {
        self.writer(FileType::File, format, ConcatenatedWriter::new(Arc::clone(&io), config.clone()))
            .writer(
                FileType::Directory,
                format,
                MultiFileWriter::new(FileType::Directory, format, Arc::clone(&io), config.clone()),
            )
            .writer(
                FileType::ZipArchive,
                format,
                MultiFileWriter::new(FileType::ZipArchive, format, Arc::clone(&io), config.clone()),
            )
            .reader(FileType::File, format, SingleFileReader::new(Arc::clone(&io)))
            .reader(FileType::Directory, format, MultiFileReader::new(FileType::Directory, Arc::clone(&io)))
            .reader(FileType::ZipArchive, format, MultiFileReader::new(FileType::ZipArchive, io))
    }

    pub fn with_tab(self, config: &WriterConfig) -> Self {
        self.writer(FileType::File, FileFormat::Tab, TabWriter::new(config.clone()))
            .reader(FileType::File, FileFormat::Tab, TabReader::new(config))
    }

    /// PartitionFinder and IQ-TREE containers, alignments written through `io`
    pub fn with_partitions(mut self, io: Arc<dyn GeneIO>, config: &WriterConfig) -> Self {
        for kind in [PartitionKind::PartitionFinder, PartitionKind::IQTree] {
            for file_type in [FileType::Directory, FileType::ZipArchive] {
                let writer = PartitionWriter::new(kind, file_type, Arc::clone(&io), config.clone());
                self = self.writer(file_type, kind.format(), writer);
            }
        }
        self
    }

    pub fn get_writer(&self, file_type: FileType, format: FileFormat) -> Result<&dyn FileWriter> {
        self.writers
            .get(&(file_type, format))
            .map(|writer| writer.as_ref())
            .ok_or(ConcatError::RouteNotFound { file_type, format })
    }

    pub fn get_reader(&self, file_type: FileType, format: FileFormat) -> Result<&dyn FileReader> {
        self.readers
            .get(&(file_type, format))
            .map(|reader| reader.as_ref())
            .ok_or(ConcatError::RouteNotFound { file_type, format })
    }

    pub fn write(&self, file_type: FileType, format: FileFormat, stream: GeneStream<'_>, path: &Path) -> Result<()> {
        self.get_writer(file_type, format)?.write(stream, path)
    }

    pub fn read(&self, file_type: FileType, format: FileFormat, path: &Path) -> Result<GeneStream<'static>> {
        self.get_reader(file_type, format)?.read(path)
    }
}
