use serde::{Deserialize, Serialize};

use crate::dictionary::EntryId;
use crate::error::LookupError;

/// Which surface-form table produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Kanji,
    Kana,
}

/// One exact-text hit from a store lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub entry_id: EntryId,
    pub source: SourceKind,
    /// Whether the matched kanji/kana record is flagged common
    pub common: bool,
}

/// Read-only lookups against the dictionary backing store.
///
/// Lookups match the exact text, case-sensitive. An empty result is not an
/// error. Implementations must be side-effect free.
#[async_trait::async_trait]
pub trait EntryStore: Send + Sync {
    /// Entries with a kanji spelling equal to `text`
    async fn lookup_by_kanji_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError>;

    /// Entries with a kana reading equal to `text`
    async fn lookup_by_kana_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError>;

    /// Gloss texts across every sense of an entry, in sense order
    async fn get_glosses_for_entry(&self, entry_id: EntryId) -> Result<Vec<String>, LookupError>;

    /// Store name for logs
    fn name(&self) -> &str {
        "store"
    }
}
