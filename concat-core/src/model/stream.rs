use rayon::prelude::*;

use super::gene::GeneSeries;
use crate::error::Result;
use crate::operators::Operator;

/// Single-pass, pull-based sequence of genes.
///
/// Items are results so that failures raised by a reader or by an
/// operator reach the consumer in arrival order. Dropping a stream before
/// it is exhausted is always safe.
pub struct GeneStream<'a> {
    inner: Box<dyn Iterator<Item = Result<GeneSeries>> + 'a>,
}

impl<'a> GeneStream<'a> {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<GeneSeries>> + 'a,
    {
        Self { inner: Box::new(iter) }
    }

    pub fn from_genes<I>(genes: I) -> Self
    where
        I: IntoIterator<Item = GeneSeries>,
        I::IntoIter: 'a,
    {
        Self::new(genes.into_iter().map(Ok))
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Lazily applies `op` to every upstream gene, skipping dropped ones.
    ///
    /// Pass `&mut op` to keep access to a stateful operator once the
    /// stream has been consumed.
    pub fn pipe<O: Operator + 'a>(self, mut op: O) -> GeneStream<'a> {
        let mut upstream = self.inner;
        GeneStream::new(std::iter::from_fn(move || loop {
            match upstream.next()? {
                Ok(gene) => match op.apply(gene) {
                    Ok(Some(gene)) => return Some(Ok(gene)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(e)),
            }
        }))
    }

    /// Applies a stateless operator to every gene on the rayon pool.
    ///
    /// The upstream is drained eagerly; results keep arrival order so a
    /// stateful stage may follow.
    pub fn par_pipe<O>(self, op: O) -> GeneStream<'a>
    where
        O: Operator + Clone + Send,
    {
        let upstream: Vec<Result<GeneSeries>> = self.inner.collect();
        log::debug!("Fanning out {} genes", upstream.len());
        let results: Vec<Result<Option<GeneSeries>>> = upstream
            .into_par_iter()
            .map_with(op, |op, item| item.and_then(|gene| op.apply(gene)))
            .collect();
        GeneStream::new(results.into_iter().filter_map(Result::transpose))
    }

    /// Drains the stream, stopping at the first error
    pub fn collect_genes(self) -> Result<Vec<GeneSeries>> {
        self.collect()
    }
}

impl Iterator for GeneStream<'_> {
    type Item = Result<GeneSeries>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConcatError;
    use crate::operators::OpFn;

    fn genes() -> Vec<GeneSeries> {
        (1..=4)
            .map(|i| GeneSeries::from_pairs(format!("gene{}", i), [("seq1", "ACGT")]))
            .collect()
    }

    #[test]
    fn test_pipe_is_lazy_and_drops() {
        let mut seen = 0;
        {
            let stream = GeneStream::from_genes(genes()).pipe(OpFn::new(|gene: GeneSeries| {
                seen += 1;
                Ok(if gene.name == "gene2" { None } else { Some(gene) })
            }));
            let names: Vec<String> = stream.map(|g| g.unwrap().name).collect();
            assert_eq!(names, vec!["gene1", "gene3", "gene4"]);
        }
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_errors_flow_downstream_in_order() {
        let stream = GeneStream::from_genes(genes())
            .pipe(OpFn::new(|gene: GeneSeries| {
                if gene.name == "gene3" {
                    Err(ConcatError::invalid(gene.name, "rejected"))
                } else {
                    Ok(Some(gene))
                }
            }))
            .pipe(OpFn::new(|gene: GeneSeries| Ok(Some(gene))));
        let items: Vec<_> = stream.collect();
        assert_eq!(items.len(), 4);
        assert!(items[2].is_err());
        assert!(items[3].is_ok());
    }

    #[test]
    fn test_par_pipe_keeps_order() {
        let op = OpFn::new(|gene: GeneSeries| Ok(Some(gene.map_sequences(|s| s.to_lowercase()))));
        let out = GeneStream::from_genes(genes()).par_pipe(op).collect_genes().unwrap();
        let names: Vec<&str> = out.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["gene1", "gene2", "gene3", "gene4"]);
        assert!(out.iter().all(|g| g.get_primary("seq1") == Some("acgt")));
    }
}
