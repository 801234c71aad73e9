use std::path::Path;

use kotoba_core::error::LoadError;

use crate::dictionary::JMdict;

pub struct JMdictLoader;

impl JMdictLoader {
    /// Load dictionary from file path
    pub fn load_from_file(path: &Path) -> Result<JMdict, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.display().to_string()));
        }

        tracing::info!("Loading JMdict from file: {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let dict = JMdict::from_json(&json)?;
        tracing::info!("Loaded {} dictionary entries from file", dict.entry_count());
        Ok(dict)
    }

    /// Load the base dictionary and merge additional files over it.
    ///
    /// A missing or broken base file is an error; additional files that fail
    /// to load are skipped with a warning.
    pub fn load_with_additional(
        base: &Path,
        additional_paths: &[String],
        gloss_langs: &[String],
    ) -> Result<JMdict, LoadError> {
        let mut dict = Self::load_from_file(base)?;

        for path in additional_paths {
            match Self::load_from_file(Path::new(path)) {
                Ok(additional) => {
                    tracing::info!("Merging additional dictionary from: {}", path);
                    dict = Self::merge(dict, additional);
                }
                Err(e) => {
                    tracing::warn!("Failed to load dictionary from {}: {}", path, e);
                }
            }
        }

        Ok(dict.with_gloss_langs(gloss_langs.to_vec()))
    }

    /// Merge two dictionaries (later entries override earlier ones by ID)
    pub fn merge(base: JMdict, additional: JMdict) -> JMdict {
        base.merge(additional)
    }
}
