//! File I/O contracts
//!
//! Format codecs plug in through two traits: [`GeneIO`] for formats that
//! hold one gene per file and [`StreamIO`] for formats that hold many.
//! Multi-file outputs go through a [`Container`], either a directory or a
//! zip archive.

pub mod tab;

pub use tab::TabFile;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{ConcatError, Result};
use crate::model::{GeneSeries, GeneStream};

/// Kind of location a reader or writer works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    File,
    Directory,
    ZipArchive,
}

impl FileType {
    pub fn description(self) -> &'static str {
        match self {
            Self::File => "Single File",
            Self::Directory => "Directory",
            Self::ZipArchive => "Zip Archive",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    Tab,
    Nexus,
    Fasta,
    Phylip,
    Ali,
    PartitionFinder,
    IQTree,
}

impl FileFormat {
    pub fn description(self) -> &'static str {
        match self {
            Self::Tab => "Tab-separated",
            Self::Nexus => "NEXUS",
            Self::Fasta => "FASTA",
            Self::Phylip => "Phylip",
            Self::Ali => "Ali",
            Self::PartitionFinder => "PartitionFinder",
            Self::IQTree => "IQ-TREE",
        }
    }

    /// Extension of a single file in this format, empty for container-only formats
    pub fn extension(self) -> &'static str {
        match self {
            Self::Tab => ".tab",
            Self::Nexus => ".nex",
            Self::Fasta => ".fas",
            Self::Phylip => ".phy",
            Self::Ali => ".ali",
            Self::PartitionFinder | Self::IQTree => "",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Name of a gene stored at `path`: the file name without its extension
pub fn gene_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Codec for formats holding a single gene
pub trait GeneIO: Send + Sync {
    fn read_gene(&self, name: &str, input: &mut dyn BufRead) -> Result<GeneSeries>;

    fn write_gene(&self, gene: &GeneSeries, output: &mut dyn Write) -> Result<()>;

    fn gene_from_path(&self, path: &Path) -> Result<GeneSeries> {
        let mut reader = BufReader::new(File::open(path)?);
        self.read_gene(&gene_name_from_path(path), &mut reader)
    }

    fn gene_to_path(&self, gene: &GeneSeries, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_gene(gene, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Codec for formats holding many genes
pub trait StreamIO: Send + Sync {
    fn read_stream<'a>(&self, input: Box<dyn BufRead + 'a>) -> Result<GeneStream<'a>>;

    fn write_stream(&self, stream: GeneStream<'_>, output: &mut dyn Write) -> Result<()>;

    fn stream_from_path(&self, path: &Path) -> Result<GeneStream<'static>> {
        let reader = BufReader::new(File::open(path)?);
        self.read_stream(Box::new(reader))
    }

    fn stream_to_path(&self, stream: GeneStream<'_>, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_stream(stream, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Destination holding several named files
pub enum Container {
    Directory(PathBuf),
    Zip(ZipWriter<File>),
}

impl Container {
    /// Creates the directory or the archive at `path`
    pub fn create(file_type: FileType, path: &Path) -> Result<Self> {
        match file_type {
            FileType::Directory => {
                std::fs::create_dir_all(path)?;
                Ok(Self::Directory(path.to_path_buf()))
            }
            FileType::ZipArchive => Ok(Self::Zip(ZipWriter::new(File::create(path)?))),
            FileType::File => Err(ConcatError::Config(format!(
                "{} is not a container type",
                file_type
            ))),
        }
    }

    /// Writes one entry through `write`
    pub fn write_entry<F>(&mut self, name: &str, write: F) -> Result<()>
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        match self {
            Self::Directory(root) => {
                let mut writer = BufWriter::new(File::create(root.join(name))?);
                write(&mut writer)?;
                writer.flush()?;
            }
            Self::Zip(zip) => {
                let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
                zip.start_file(name, options)?;
                write(zip)?;
            }
        }
        log::debug!("Wrote container entry {}", name);
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        if let Self::Zip(zip) = self {
            zip.finish()?;
        }
        Ok(())
    }
}

/// Reads every file of a directory, sorted by name
pub fn read_directory(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.retain(|p| p.is_file());
    paths.sort();
    paths
        .into_iter()
        .map(|p| -> Result<(String, Vec<u8>)> { Ok((gene_name_from_path(&p), std::fs::read(&p)?)) })
        .collect()
}

/// Reads every file entry of a zip archive, in archive order
pub fn read_zip_archive(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = gene_name_from_path(Path::new(entry.name()));
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        entries.push((name, content));
    }
    Ok(entries)
}
