pub mod dictionary;
pub mod error;
pub mod preprocess;
pub mod store;
pub mod types;

pub use dictionary::{DictionaryEntry, EntryId, Gloss, KanaReading, KanjiSpelling, Sense};
pub use error::{LoadError, LookupError, ResolveError};
pub use preprocess::{DefaultPreprocessor, TermPreprocessor};
pub use store::{Candidate, EntryStore, SourceKind};
pub use types::{
    BatchOutcome, ElementAttempt, JlptLevel, ResolutionRule, Resolved, SearchTerm, Unresolved,
    UnresolvedReason,
};
