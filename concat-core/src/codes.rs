//! Genetic code tables
//!
//! The tables are read from a bundled JSON resource in NCBI order
//! (codons enumerated over `TCAG` for each position). Each table
//! contributes its set of stop codons to reading-frame detection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{ConcatError, Result};

/// Uppercase nucleotide triplet
pub type Codon = [u8; 3];

const BASES: &[u8; 4] = b"TCAG";
const BUNDLED_TABLES: &str = include_str!("../resources/genetic_codes.json");

/// Identifier of a genetic code table, `UNKNOWN` when no table is assumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneticCode(u8);

impl GeneticCode {
    pub const UNKNOWN: GeneticCode = GeneticCode(0);
    pub const STANDARD: GeneticCode = GeneticCode(1);

    /// Wraps an NCBI table id without checking that the table exists
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn is_known(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for GeneticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match GeneticCodes::bundled().get(*self) {
            Some(table) => write!(f, "{}: {}", self.0, table.name),
            None => write!(f, "{}: Unknown", self.0),
        }
    }
}

/// Codon at `index` in NCBI order
pub fn codon_at(index: usize) -> Codon {
    [BASES[index / 16 % 4], BASES[index / 4 % 4], BASES[index % 4]]
}

#[derive(Debug, Deserialize)]
struct RawTable {
    id: u8,
    name: String,
    #[serde(default)]
    abbr_name: Option<String>,
    ncbieaa: String,
    sncbieaa: String,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "Genetic_code_tables")]
    tables: Vec<RawTable>,
}

/// One genetic code: its name and the codons that terminate translation
#[derive(Debug, Clone, PartialEq)]
pub struct CodeTable {
    pub code: GeneticCode,
    pub name: String,
    pub abbr_name: Option<String>,
    pub stops: BTreeSet<Codon>,
    pub starts: BTreeSet<Codon>,
}

impl CodeTable {
    fn from_raw(raw: RawTable) -> Result<Self> {
        if raw.id == 0 {
            return Err(ConcatError::GeneticCodeData(
                "a table has an invalid 'id' 0".to_string(),
            ));
        }
        for (field, value) in [("ncbieaa", &raw.ncbieaa), ("sncbieaa", &raw.sncbieaa)] {
            if value.len() != 64 || !value.is_ascii() {
                return Err(ConcatError::GeneticCodeData(format!(
                    "the field '{}' of table {} should be 64 bytes",
                    field, raw.id
                )));
            }
        }

        let stops = raw
            .sncbieaa
            .bytes()
            .enumerate()
            .filter(|(_, mark)| *mark == b'*')
            .map(|(i, _)| codon_at(i))
            .collect();
        let starts = raw
            .sncbieaa
            .bytes()
            .enumerate()
            .filter(|(_, mark)| *mark == b'M')
            .map(|(i, _)| codon_at(i))
            .collect();

        Ok(Self {
            code: GeneticCode(raw.id),
            name: raw.name,
            abbr_name: raw.abbr_name,
            stops,
            starts,
        })
    }

    pub fn is_stop(&self, codon: &Codon) -> bool {
        self.stops.contains(codon)
    }
}

/// Immutable collection of genetic code tables with a reverse stop-codon index
#[derive(Debug, Clone, Default)]
pub struct GeneticCodes {
    tables: BTreeMap<GeneticCode, CodeTable>,
    tables_by_stop: HashMap<Codon, BTreeSet<GeneticCode>>,
}

impl GeneticCodes {
    /// Parses a `Genetic_code_tables` JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: RawDocument = serde_json::from_str(json)
            .map_err(|e| ConcatError::GeneticCodeData(format!("not a valid table document: {}", e)))?;

        let mut tables = BTreeMap::new();
        for raw in document.tables {
            let table = CodeTable::from_raw(raw)?;
            if tables.insert(table.code, table).is_some() {
                return Err(ConcatError::GeneticCodeData(
                    "duplicate table id".to_string(),
                ));
            }
        }
        Ok(Self::from_tables(tables.into_values()))
    }

    pub fn from_tables<I: IntoIterator<Item = CodeTable>>(tables: I) -> Self {
        let tables: BTreeMap<_, _> = tables.into_iter().map(|t| (t.code, t)).collect();
        let mut tables_by_stop: HashMap<Codon, BTreeSet<GeneticCode>> = HashMap::new();
        for table in tables.values() {
            for stop in &table.stops {
                tables_by_stop.entry(*stop).or_default().insert(table.code);
            }
        }
        Self { tables, tables_by_stop }
    }

    /// Tables shipped with the crate, loaded on first use.
    ///
    /// Malformed data leaves the collection empty, which disables
    /// code-aware detection instead of aborting.
    pub fn bundled() -> &'static GeneticCodes {
        static BUNDLED: OnceLock<GeneticCodes> = OnceLock::new();
        BUNDLED.get_or_init(|| match Self::from_json(BUNDLED_TABLES) {
            Ok(codes) => {
                log::debug!("Loaded {} genetic code tables", codes.len());
                codes
            }
            Err(e) => {
                log::warn!("Genetic code detection disabled: {}", e);
                Self::default()
            }
        })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, code: GeneticCode) -> Option<&CodeTable> {
        self.tables.get(&code)
    }

    pub fn codes(&self) -> impl Iterator<Item = GeneticCode> + '_ {
        self.tables.keys().copied()
    }

    pub fn tables(&self) -> impl Iterator<Item = &CodeTable> {
        self.tables.values()
    }

    /// Stop codons of one table, or of every table when `code` is unknown
    pub fn stops(&self, code: GeneticCode) -> BTreeSet<Codon> {
        if code.is_known() {
            self.get(code).map(|t| t.stops.clone()).unwrap_or_default()
        } else {
            self.tables_by_stop.keys().copied().collect()
        }
    }

    /// Tables in which `codon` terminates translation
    pub fn tables_stopping_at(&self, codon: &Codon) -> Option<&BTreeSet<GeneticCode>> {
        self.tables_by_stop.get(codon)
    }
}
