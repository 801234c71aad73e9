use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use kotoba_core::error::LoadError;
use kotoba_core::{JlptLevel, SearchTerm};
use serde::Deserialize;

/// Parse a JLPT vocabulary list.
///
/// Rows are `expression,reading,meaning` after a header row. The reading is
/// used when a row has no expression, and rows with neither are dropped.
pub fn parse_vocab_csv<R: Read>(reader: R, level: JlptLevel) -> Result<Vec<SearchTerm>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut terms = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| LoadError::ParseError(format!("row {}: {e}", row + 1)))?;

        let expression = record.get(0).map(str::trim).unwrap_or_default();
        let reading = record.get(1).map(str::trim).unwrap_or_default();
        let text = if expression.is_empty() { reading } else { expression };
        if text.is_empty() {
            tracing::debug!("Skipping empty vocabulary row {}", row + 1);
            continue;
        }

        let mut term = SearchTerm::new(text, level);
        if let Some(meaning) = record.get(2) {
            term = term.with_gloss_hint(meaning.trim());
        }
        terms.push(term);
    }

    Ok(terms)
}

pub fn load_vocab_csv(path: &Path, level: JlptLevel) -> Result<Vec<SearchTerm>, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)?;
    let terms = parse_vocab_csv(file, level)?;
    tracing::info!("Loaded {} {} terms from {}", terms.len(), level, path.display());
    Ok(terms)
}

#[derive(Debug, Deserialize)]
struct KanjiInfo {
    #[serde(default)]
    jlpt_old: Option<u8>,
    #[serde(default)]
    jlpt_new: Option<u8>,
    #[serde(default)]
    meanings: Vec<String>,
}

impl KanjiInfo {
    fn level(&self) -> Option<JlptLevel> {
        self.jlpt_new
            .and_then(JlptLevel::from_number)
            .or_else(|| self.jlpt_old.and_then(JlptLevel::from_number))
    }
}

/// Terms built from kanji metadata
#[derive(Debug, Default)]
pub struct KanjiList {
    pub terms: Vec<SearchTerm>,
    /// Characters without a JLPT level
    pub skipped: usize,
}

/// Parse `kanji.json` (character -> metadata).
///
/// The level is `jlpt_new`, else `jlpt_old`. Terms come out ordered by
/// character.
pub fn parse_kanji_json(json: &str) -> Result<KanjiList, LoadError> {
    let data: BTreeMap<String, KanjiInfo> = serde_json::from_str(json)?;

    let mut list = KanjiList::default();
    for (character, info) in data {
        let Some(level) = info.level() else {
            tracing::debug!("Skipping kanji without JLPT level: {}", character);
            list.skipped += 1;
            continue;
        };

        list.terms
            .push(SearchTerm::new(character, level).with_gloss_hint(info.meanings.join("; ")));
    }

    Ok(list)
}

pub fn load_kanji_json(path: &Path) -> Result<KanjiList, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }

    let json = std::fs::read_to_string(path)?;
    let list = parse_kanji_json(&json)?;
    tracing::info!(
        "Loaded {} kanji from {} ({} without level)",
        list.terms.len(),
        path.display(),
        list.skipped
    );
    Ok(list)
}
