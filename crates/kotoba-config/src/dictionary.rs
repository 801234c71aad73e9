use serde::{Deserialize, Serialize};

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// jmdict-simplified JSON file
    #[serde(default)]
    pub path: Option<String>,
    /// Files merged over the base dictionary, later ids win
    #[serde(default)]
    pub additional_paths: Vec<String>,
    /// Gloss languages used for similarity ranking
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: None,
            additional_paths: vec![],
            languages: default_languages(),
        }
    }
}
