//! Tab-separated table of genes
//!
//! The header names every column. Columns starting with the sequence prefix
//! hold genes, the prefix stripped from their names; all other columns are
//! key fields in header order.

use std::io::{BufRead, Write};

use super::StreamIO;
use crate::error::{ConcatError, Result};
use crate::join::join_any;
use crate::model::{GeneSeries, GeneStream, TaxonKey};

const SOURCE: &str = "tab file";

#[derive(Debug, Clone)]
pub struct TabFile {
    pub sequence_prefix: String,
}

impl Default for TabFile {
    fn default() -> Self {
        Self::new("sequence_")
    }
}

impl TabFile {
    pub fn new<S: Into<String>>(sequence_prefix: S) -> Self {
        Self {
            sequence_prefix: sequence_prefix.into(),
        }
    }

    fn parse(&self, input: &mut dyn BufRead) -> Result<Vec<GeneSeries>> {
        let mut lines = input.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(ConcatError::parse(SOURCE, "missing header")),
        };
        let columns: Vec<&str> = header.trim_end_matches(['\r', '\n']).split('\t').collect();

        let key_columns: Vec<usize> = (0..columns.len())
            .filter(|&i| !columns[i].starts_with(&self.sequence_prefix))
            .collect();
        let gene_columns: Vec<usize> = (0..columns.len())
            .filter(|&i| columns[i].starts_with(&self.sequence_prefix))
            .collect();
        if key_columns.is_empty() {
            return Err(ConcatError::parse(SOURCE, "no key columns in header"));
        }

        let fields: Vec<String> = key_columns.iter().map(|&i| columns[i].to_string()).collect();
        let mut genes: Vec<GeneSeries> = gene_columns
            .iter()
            .map(|&i| GeneSeries::new(&columns[i][self.sequence_prefix.len()..], fields.clone()))
            .collect();

        for (number, line) in lines.enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            let values: Vec<&str> = line.split('\t').collect();
            if values.len() != columns.len() {
                return Err(ConcatError::parse(
                    SOURCE,
                    format!(
                        "line {} has {} columns, expected {}",
                        number + 2,
                        values.len(),
                        columns.len()
                    ),
                ));
            }
            let key = TaxonKey::new(key_columns.iter().map(|&i| values[i].to_string()).collect());
            for (gene, &column) in genes.iter_mut().zip(&gene_columns) {
                if !values[column].is_empty() {
                    gene.push(key.clone(), values[column]);
                }
            }
        }
        Ok(genes)
    }
}

impl StreamIO for TabFile {
    fn read_stream<'a>(&self, mut input: Box<dyn BufRead + 'a>) -> Result<GeneStream<'a>> {
        let genes = self.parse(&mut input)?;
        log::debug!("Read {} genes from tab file", genes.len());
        Ok(GeneStream::from_genes(genes))
    }

    fn write_stream(&self, stream: GeneStream<'_>, output: &mut dyn Write) -> Result<()> {
        let frame = join_any(stream)?;
        let mut header = frame.key_field_names();
        header.extend(frame.gene_names().map(|name| format!("{}{}", self.sequence_prefix, name)));
        writeln!(output, "{}", header.join("\t"))?;

        for (key, cells) in frame.rows() {
            let mut values: Vec<&str> = key.values().iter().map(String::as_str).collect();
            values.extend(cells.iter().map(|cell| cell.as_deref().unwrap_or("")));
            writeln!(output, "{}", values.join("\t"))?;
        }
        log::info!("Wrote {} rows of {} genes", frame.len(), frame.column_count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TABLE: &str = "species\tvoucher\tsequence_cox1\tsequence_cytb\n\
                         Boophis\tV1\tACGT\tGG\n\
                         Mantella\tV2\t\tTT\n";

    fn read(text: &str) -> Result<Vec<GeneSeries>> {
        TabFile::default()
            .read_stream(Box::new(Cursor::new(text.to_string())))?
            .collect_genes()
    }

    #[test]
    fn test_read_table() {
        let genes = read(TABLE).unwrap();
        assert_eq!(genes.len(), 2);
        assert_eq!(genes[0].name, "cox1");
        assert_eq!(genes[0].fields, vec!["species".to_string(), "voucher".to_string()]);
        assert_eq!(genes[0].len(), 1);
        assert_eq!(genes[1].get(&TaxonKey::from(["Mantella", "V2"])), Some("TT"));
    }

    #[test]
    fn test_write_table() {
        let genes = read(TABLE).unwrap();
        let mut out = Vec::new();
        TabFile::default()
            .write_stream(GeneStream::from_genes(genes), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), TABLE);
    }

    #[test]
    fn test_malformed_tables() {
        assert!(matches!(read(""), Err(ConcatError::Parse { .. })));
        assert!(read("sequence_a\nACGT\n").is_err());
        assert!(read("species\tsequence_a\nBoophis\n").is_err());
    }
}
