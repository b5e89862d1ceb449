//! Gene model
//!
//! `GeneSeries` holds one gene, `GeneStream` a lazy sequence of genes and
//! `GeneDataFrame` the wide table produced by joining a stream.

pub mod dataframe;
pub mod gene;
pub mod key;
pub mod stream;

pub use dataframe::GeneDataFrame;
pub use gene::{GeneSeries, Record, DEFAULT_GAP, DEFAULT_MISSING};
pub use key::{TaxonKey, SEQID, SPECIES};
pub use stream::GeneStream;
