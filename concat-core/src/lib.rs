//! Gene concatenation core library
//!
//! Reading-frame detection, gene streams and operators, structural joins,
//! partition charsets and writer pipelines for multi-gene alignments.

pub mod error;
pub mod frame;
pub mod codes;
pub mod detect;
pub mod model;
pub mod join;
pub mod operators;
pub mod charset;
pub mod partition;
pub mod io;
pub mod config;
pub mod writers;

// Re-export commonly used types and functions
pub use error::{ConcatError, Result};
pub use frame::ReadingFrame;
pub use codes::{GeneticCode, GeneticCodes};
pub use detect::{final_column_reading_frame, ReadingFrameDetector};
pub use model::{GeneDataFrame, GeneSeries, GeneStream, TaxonKey};
pub use join::join_any;
pub use operators::Operator;
pub use charset::{Charset, CodonSet};
pub use io::{FileFormat, FileType, GeneIO, StreamIO};
pub use config::WriterConfig;
pub use writers::{FileReader, FileWriter, Routes};

/// Version information for the concatenation core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
