use regex::Regex;
use std::sync::OnceLock;

use crate::error::Result;
use crate::model::GeneSeries;

use super::Operator;

fn disallowed_run() -> &'static Regex {
    static RUN: OnceLock<Regex> = OnceLock::new();
    RUN.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("static pattern"))
}

fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'À'..='Å' => "A",
        'à'..='å' | 'ā' | 'ă' | 'ą' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' | 'Ć' | 'Č' => "C",
        'ç' | 'ć' | 'č' => "c",
        'È'..='Ë' | 'Ē' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'Ì'..='Ï' => "I",
        'ì'..='ï' | 'ı' => "i",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ñ' | 'ń' | 'ň' => "n",
        'Ò'..='Ö' | 'Ø' | 'Ő' => "O",
        'ò'..='ö' | 'ø' | 'ő' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ř' => "R",
        'ř' => "r",
        'Š' | 'Ś' | 'Ş' => "S",
        'š' | 'ś' | 'ş' => "s",
        'ß' => "ss",
        'Ť' => "T",
        'ť' => "t",
        'Ù'..='Ü' | 'Ů' | 'Ű' => "U",
        'ù'..='ü' | 'ů' | 'ű' => "u",
        'Ý' | 'Ÿ' => "Y",
        'ý' | 'ÿ' => "y",
        'Ž' | 'Ź' | 'Ż' => "Z",
        'ž' | 'ź' | 'ż' => "z",
        '⁰' | '₀' => "0",
        '¹' | '₁' => "1",
        '²' | '₂' => "2",
        '³' | '₃' => "3",
        '⁴' | '₄' => "4",
        '⁵' | '₅' => "5",
        '⁶' | '₆' => "6",
        '⁷' | '₇' => "7",
        '⁸' | '₈' => "8",
        '⁹' | '₉' => "9",
        _ => return None,
    };
    Some(folded)
}

/// Makes a name safe for every output format.
///
/// Accented Latin letters and super/subscript digits are folded to ASCII,
/// leading and trailing non-alphanumerics are removed and inner runs of
/// them collapse into a single underscore.
pub fn sanitize(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.chars() {
        match fold_char(c) {
            Some(ascii) => folded.push_str(ascii),
            None => folded.push(c),
        }
    }
    let trimmed = folded.trim_matches(|c: char| !c.is_ascii_alphanumeric());
    disallowed_run().replace_all(trimmed, "_").into_owned()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpSanitizeGeneNames;

impl Operator for OpSanitizeGeneNames {
    fn apply(&mut self, mut gene: GeneSeries) -> Result<Option<GeneSeries>> {
        gene.name = sanitize(&gene.name);
        Ok(Some(gene))
    }
}

/// Sanitizes every component of every taxon key
#[derive(Debug, Clone, Copy, Default)]
pub struct OpSanitizeSpeciesNames;

impl Operator for OpSanitizeSpeciesNames {
    fn apply(&mut self, mut gene: GeneSeries) -> Result<Option<GeneSeries>> {
        for record in &mut gene.records {
            for value in record.key.values_mut() {
                *value = sanitize(value);
            }
        }
        Ok(Some(gene))
    }
}
