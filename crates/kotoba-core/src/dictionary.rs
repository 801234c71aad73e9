use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable entry identifier assigned by the backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Dictionary headword with all of its spellings and meanings.
///
/// Entries are read-only reference data: every entry carries at least one
/// kana reading, while the kanji list is empty for kana-only words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub id: EntryId,
    #[serde(default)]
    pub kanji: Vec<KanjiSpelling>,
    pub kana: Vec<KanaReading>,
    pub senses: Vec<Sense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanjiSpelling {
    pub text: String,
    #[serde(default)]
    pub common: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanaReading {
    pub text: String,
    #[serde(default)]
    pub common: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Kanji spellings this reading is restricted to, `*` or empty for all
    #[serde(default)]
    pub applies_to_kanji: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    #[serde(default)]
    pub part_of_speech: Vec<String>,
    #[serde(default)]
    pub applies_to_kanji: Vec<String>,
    #[serde(default)]
    pub applies_to_kana: Vec<String>,
    /// Cross-references to other entries
    #[serde(default)]
    pub related: Vec<Vec<String>>,
    #[serde(default)]
    pub antonym: Vec<Vec<String>>,
    #[serde(default)]
    pub field: Vec<String>,
    #[serde(default)]
    pub dialect: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
    pub glosses: Vec<Gloss>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gloss {
    pub text: String,
    pub lang: String,
    /// literal, figurative, explanation, trademark or none
    #[serde(default)]
    pub gloss_type: Option<String>,
}

impl DictionaryEntry {
    /// Main headword: first kanji spelling, falling back to the first reading
    pub fn headword(&self) -> &str {
        self.kanji
            .first()
            .map(|k| k.text.as_str())
            .or_else(|| self.kana.first().map(|k| k.text.as_str()))
            .unwrap_or_default()
    }

    /// Gloss texts in sense order, limited to the given languages (e.g. `eng`);
    /// an empty list keeps every language
    pub fn gloss_texts_in<'a>(&'a self, langs: &'a [String]) -> impl Iterator<Item = &'a str> {
        self.senses
            .iter()
            .flat_map(|sense| sense.glosses.iter())
            .filter(move |gloss| langs.is_empty() || langs.iter().any(|l| *l == gloss.lang))
            .map(|gloss| gloss.text.as_str())
    }

    pub fn kanji_common(&self, text: &str) -> Option<bool> {
        self.kanji.iter().find(|k| k.text == text).map(|k| k.common)
    }

    pub fn kana_common(&self, text: &str) -> Option<bool> {
        self.kana.iter().find(|k| k.text == text).map(|k| k.common)
    }
}
