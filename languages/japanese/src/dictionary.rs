use std::collections::HashMap;

use async_trait::async_trait;
use kotoba_core::dictionary::{DictionaryEntry, EntryId, Gloss, KanaReading, KanjiSpelling, Sense};
use kotoba_core::error::{LoadError, LookupError};
use kotoba_core::store::{Candidate, EntryStore, SourceKind};
use serde::Deserialize;

// JSON structures for parsing jmdict-simplified format
#[derive(Debug, Deserialize)]
struct JMdictJson {
    words: Vec<JMdictJsonEntry>,
}

#[derive(Debug, Deserialize)]
struct JMdictJsonEntry {
    id: String,
    #[serde(default)]
    kanji: Vec<KanjiElement>,
    #[serde(default)]
    kana: Vec<KanaElement>,
    #[serde(default)]
    sense: Vec<SenseElement>,
}

#[derive(Debug, Deserialize)]
struct KanjiElement {
    text: String,
    #[serde(default)]
    common: bool,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KanaElement {
    text: String,
    #[serde(default)]
    common: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    applies_to_kanji: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SenseElement {
    #[serde(default)]
    part_of_speech: Vec<String>,
    #[serde(default)]
    applies_to_kanji: Vec<String>,
    #[serde(default)]
    applies_to_kana: Vec<String>,
    // xrefs mix strings and sense numbers: ["丸", "まる", 1]
    #[serde(default)]
    related: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    antonym: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    field: Vec<String>,
    #[serde(default)]
    dialect: Vec<String>,
    #[serde(default)]
    misc: Vec<String>,
    #[serde(default)]
    info: Vec<String>,
    #[serde(default)]
    gloss: Vec<GlossElement>,
}

#[derive(Debug, Deserialize)]
struct GlossElement {
    lang: String,
    text: String,
    #[serde(rename = "type", default)]
    gloss_type: Option<String>,
}

fn xref_strings(xrefs: Vec<Vec<serde_json::Value>>) -> Vec<Vec<String>> {
    xrefs
        .into_iter()
        .map(|parts| {
            parts
                .into_iter()
                .map(|part| match part {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

impl JMdictJsonEntry {
    fn into_entry(self) -> Result<DictionaryEntry, String> {
        let id = self
            .id
            .parse::<u64>()
            .map_err(|_| format!("non-numeric id '{}'", self.id))?;

        if self.kana.is_empty() {
            return Err(format!("entry {id} has no kana reading"));
        }

        let senses = self
            .sense
            .into_iter()
            .map(|sense| Sense {
                part_of_speech: sense.part_of_speech,
                applies_to_kanji: sense.applies_to_kanji,
                applies_to_kana: sense.applies_to_kana,
                related: xref_strings(sense.related),
                antonym: xref_strings(sense.antonym),
                field: sense.field,
                dialect: sense.dialect,
                misc: sense.misc,
                info: sense.info,
                glosses: sense
                    .gloss
                    .into_iter()
                    .map(|g| Gloss {
                        text: g.text,
                        lang: g.lang,
                        gloss_type: g.gloss_type,
                    })
                    .collect(),
            })
            .collect();

        Ok(DictionaryEntry {
            id: EntryId(id),
            kanji: self
                .kanji
                .into_iter()
                .map(|k| KanjiSpelling {
                    text: k.text,
                    common: k.common,
                    tags: k.tags,
                })
                .collect(),
            kana: self
                .kana
                .into_iter()
                .map(|k| KanaReading {
                    text: k.text,
                    common: k.common,
                    tags: k.tags,
                    applies_to_kanji: k.applies_to_kanji,
                })
                .collect(),
            senses,
        })
    }
}

/// JMdict held in memory, indexed by kanji spelling and kana reading
#[derive(Debug, Default)]
pub struct JMdict {
    entries: Vec<DictionaryEntry>,
    by_id: HashMap<EntryId, usize>,
    kanji_index: HashMap<String, Vec<usize>>,
    kana_index: HashMap<String, Vec<usize>>,
    /// Gloss languages returned by `get_glosses_for_entry`, empty for all
    gloss_langs: Vec<String>,
}

impl JMdict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load JMdict from JSON string (jmdict-simplified format)
    pub fn from_json(json_str: &str) -> Result<Self, LoadError> {
        let data: JMdictJson = serde_json::from_str(json_str)?;

        let mut entries = Vec::with_capacity(data.words.len());
        let mut skipped = 0usize;

        for json_entry in data.words {
            match json_entry.into_entry() {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!("Skipping JMdict entry: {reason}");
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {skipped} malformed JMdict entries");
        }

        Ok(Self::from_entries(entries))
    }

    /// Build from entries, later duplicates of an id replace earlier ones
    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        let mut dict = Self::new();
        for entry in entries {
            dict.upsert(entry);
        }
        dict.rebuild_indexes();
        dict
    }

    pub fn with_gloss_langs(mut self, langs: Vec<String>) -> Self {
        self.gloss_langs = langs;
        self
    }

    /// Get the number of entries in the dictionary
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: EntryId) -> Option<&DictionaryEntry> {
        self.by_id.get(&id).and_then(|&idx| self.entries.get(idx))
    }

    /// Merge another dictionary into this one
    /// Entries from the other dictionary with the same ID will override existing ones
    pub fn merge(mut self, other: JMdict) -> Self {
        let mut replaced = 0usize;
        for entry in other.entries {
            if self.upsert(entry) {
                replaced += 1;
            }
        }
        self.rebuild_indexes();
        tracing::debug!(replaced, total = self.entries.len(), "Merged dictionary");
        self
    }

    /// Returns true when an existing entry was replaced
    fn upsert(&mut self, entry: DictionaryEntry) -> bool {
        match self.by_id.get(&entry.id) {
            Some(&idx) => {
                tracing::trace!(id = %entry.id, headword = entry.headword(), "Replacing entry");
                self.entries[idx] = entry;
                true
            }
            None => {
                self.by_id.insert(entry.id, self.entries.len());
                self.entries.push(entry);
                false
            }
        }
    }

    fn rebuild_indexes(&mut self) {
        self.kanji_index.clear();
        self.kana_index.clear();

        for (idx, entry) in self.entries.iter().enumerate() {
            for k in &entry.kanji {
                push_unique(self.kanji_index.entry(k.text.clone()).or_default(), idx);
            }
            for r in &entry.kana {
                push_unique(self.kana_index.entry(r.text.clone()).or_default(), idx);
            }
        }
    }

    fn candidates(&self, text: &str, source: SourceKind) -> Vec<Candidate> {
        let index = match source {
            SourceKind::Kanji => &self.kanji_index,
            SourceKind::Kana => &self.kana_index,
        };

        index
            .get(text)
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.entries.get(idx))
            .map(|entry| {
                let common = match source {
                    SourceKind::Kanji => entry.kanji_common(text),
                    SourceKind::Kana => entry.kana_common(text),
                };
                Candidate {
                    entry_id: entry.id,
                    source,
                    common: common.unwrap_or(false),
                }
            })
            .collect()
    }
}

fn push_unique(indices: &mut Vec<usize>, idx: usize) {
    if indices.last() != Some(&idx) {
        indices.push(idx);
    }
}

#[async_trait]
impl EntryStore for JMdict {
    async fn lookup_by_kanji_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError> {
        Ok(self.candidates(text, SourceKind::Kanji))
    }

    async fn lookup_by_kana_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError> {
        Ok(self.candidates(text, SourceKind::Kana))
    }

    async fn get_glosses_for_entry(&self, entry_id: EntryId) -> Result<Vec<String>, LookupError> {
        Ok(self
            .get(entry_id)
            .map(|entry| {
                entry
                    .gloss_texts_in(&self.gloss_langs)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "jmdict"
    }
}
