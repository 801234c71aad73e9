use serde::{Deserialize, Serialize};

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_kanji_table() -> String {
    "kanji".to_string()
}

fn default_kana_table() -> String {
    "kana".to_string()
}

fn default_sense_table() -> String {
    "sense".to_string()
}

/// Hosted PostgREST database holding the imported dictionary tables
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_kanji_table")]
    pub kanji_table: String,
    #[serde(default = "default_kana_table")]
    pub kana_table: String,
    #[serde(default = "default_sense_table")]
    pub sense_table: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: String::new(),
            kanji_table: default_kanji_table(),
            kana_table: default_kana_table(),
            sense_table: default_sense_table(),
        }
    }
}

impl RemoteConfig {
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }
}
