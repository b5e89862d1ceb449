use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::model::GeneSeries;

use super::Operator;

/// Drops rows made only of missing and gap characters, then the gene
/// itself if no row is left
#[derive(Debug, Clone, Copy, Default)]
pub struct OpDropEmpty;

impl Operator for OpDropEmpty {
    fn apply(&mut self, mut gene: GeneSeries) -> Result<Option<GeneSeries>> {
        let before = gene.records.len();
        let records = std::mem::take(&mut gene.records);
        gene.records = records
            .into_iter()
            .filter(|r| !gene.is_void(&r.sequence))
            .collect();
        if gene.records.len() < before {
            log::debug!(
                "Dropped {} empty sequences from gene {}",
                before - gene.records.len(),
                gene.name
            );
        }
        if gene.records.is_empty() {
            log::debug!("Dropped empty gene {}", gene.name);
            return Ok(None);
        }
        Ok(Some(gene))
    }
}

/// Drops the gene only when every one of its rows is empty
#[derive(Debug, Clone, Copy, Default)]
pub struct OpDropIfAllEmpty;

impl Operator for OpDropIfAllEmpty {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        if gene.sequences().all(|s| gene.is_void(s)) {
            log::debug!("Dropped empty gene {}", gene.name);
            return Ok(None);
        }
        Ok(Some(gene))
    }
}

/// Keeps genes by name: an allow list (if any) then a deny list
#[derive(Debug, Clone, Default)]
pub struct OpFilterGenes {
    allow: Option<HashSet<String>>,
    deny: HashSet<String>,
}

impl OpFilterGenes {
    pub fn allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow: Some(names.into_iter().map(Into::into).collect()),
            deny: HashSet::new(),
        }
    }

    pub fn deny<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allow: None,
            deny: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and_deny<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(names.into_iter().map(Into::into));
        self
    }

    fn keeps(&self, name: &str) -> bool {
        let allowed = self.allow.as_ref().map_or(true, |allow| allow.contains(name));
        allowed && !self.deny.contains(name)
    }
}

impl Operator for OpFilterGenes {
    fn apply(&mut self, gene: GeneSeries) -> Result<Option<GeneSeries>> {
        Ok(self.keeps(&gene.name).then_some(gene))
    }
}

/// Renames genes found in the mapping, leaves the others untouched
#[derive(Debug, Clone, Default)]
pub struct OpRenameGenes {
    names: HashMap<String, String>,
}

impl OpRenameGenes {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Operator for OpRenameGenes {
    fn apply(&mut self, mut gene: GeneSeries) -> Result<Option<GeneSeries>> {
        if let Some(name) = self.names.get(&gene.name) {
            gene.name = name.clone();
        }
        Ok(Some(gene))
    }
}
