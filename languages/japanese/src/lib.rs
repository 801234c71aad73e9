pub mod dictionary;
pub mod jlpt;
pub mod loader;

pub use dictionary::JMdict;
pub use jlpt::{KanjiList, load_kanji_json, load_vocab_csv, parse_kanji_json, parse_vocab_csv};
pub use loader::JMdictLoader;
