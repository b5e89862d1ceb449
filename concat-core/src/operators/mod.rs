//! Gene transforms
//!
//! An operator takes ownership of one gene and returns the transformed gene,
//! or `None` to drop it from the stream. Operators compose through
//! `GeneStream::pipe`.

use crate::error::Result;
use crate::model::GeneSeries;

pub mod charsets;
pub mod filter;
pub mod frames;
pub mod sanitize;
pub mod shape;
pub mod text;
pub mod validate;

pub use charsets::OpExtractCharsets;
pub use filter::{OpDropEmpty, OpDropIfAllEmpty, OpFilterGenes, OpRenameGenes};
pub use frames::{reverse_complement, OpDetectReadingFrame, OpPadToFirstCodon, OpReverseNegativeFrames};
pub use sanitize::{sanitize, OpSanitizeGeneNames, OpSanitizeSpeciesNames};
pub use shape::{OpIndexMerge, OpMakeUniform};
pub use text::{OpSequenceCase, OpSpreadsheetCompatibility, OpTranslateGap, OpTranslateMissing, TextCase};
pub use validate::{OpCheckUniqueNames, OpCheckValid};

/// Configured transform `GeneSeries -> GeneSeries | absent`
pub trait Operator {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>>;
}

impl<O: Operator + ?Sized> Operator for &mut O {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        (**self).apply(gene)
    }
}

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        (**self).apply(gene)
    }
}

/// Adapts a closure into an operator
#[derive(Clone)]
pub struct OpFn<F> {
    func: F,
}

impl<F> OpFn<F>
where
    F: FnMut(GeneSeries) -> Result<Option<GeneSeries>>,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Operator for OpFn<F>
where
    F: FnMut(GeneSeries) -> Result<Option<GeneSeries>>,
{
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        (self.func)(gene)
    }
}

/// Operators applied one after the other, stopping once a gene is dropped
#[derive(Default)]
pub struct OpChain<'a> {
    ops: Vec<Box<dyn Operator + 'a>>,
}

impl<'a> OpChain<'a> {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn then<O: Operator + 'a>(mut self, op: O) -> Self {
        self.ops.push(Box::new(op));
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Operator for OpChain<'_> {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        let mut current = gene;
        for op in &mut self.ops {
            match op.apply(current)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}
