use serde::{Deserialize, Serialize};

fn default_dir() -> String {
    "out".to_string()
}

fn default_level_batch_size() -> usize {
    100
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Rows per chunk in `level_rows.json`
    #[serde(default = "default_level_batch_size")]
    pub level_batch_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            level_batch_size: default_level_batch_size(),
        }
    }
}
