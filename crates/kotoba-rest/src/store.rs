use kotoba_config::remote::RemoteConfig;
use kotoba_core::{Candidate, EntryId, EntryStore, LookupError, SourceKind};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::RestError;

/// `EntryStore` over the PostgREST API of the hosted dictionary database.
///
/// Surface-form tables hold `entry_id` and `value`, with the common flag as
/// an embedded `*_common` relation. Glosses live in `definition` rows under
/// each `sense`.
#[derive(Clone)]
pub struct RestStore {
    base_url: String,
    api_key: String,
    kanji_table: String,
    kana_table: String,
    sense_table: String,
    gloss_langs: Vec<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SurfaceRow {
    entry_id: u64,
    #[serde(default)]
    common: Option<Vec<CommonRow>>,
}

#[derive(Deserialize)]
struct CommonRow {
    value: Option<String>,
}

impl SurfaceRow {
    /// Common only when a flag row holds `true`
    fn is_common(&self) -> bool {
        self.common.iter().flatten().any(|row| {
            row.value
                .as_deref()
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
        })
    }
}

#[derive(Deserialize)]
struct SenseRow {
    #[serde(default)]
    definition: Vec<DefinitionRow>,
}

#[derive(Deserialize)]
struct DefinitionRow {
    value: Option<String>,
    lang: Option<String>,
}

impl RestStore {
    pub fn new(config: &RemoteConfig, gloss_langs: Vec<String>) -> Result<Self, RestError> {
        if config.url.trim().is_empty() {
            return Err(RestError::InvalidConfig("remote url is empty".to_string()));
        }

        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            base_url: config.rest_url(),
            api_key: config.api_key.clone(),
            kanji_table: config.kanji_table.clone(),
            kana_table: config.kana_table.clone(),
            sense_table: config.sense_table.clone(),
            gloss_langs,
            client,
        })
    }

    async fn lookup_surface(
        &self,
        table: &str,
        text: &str,
        source: SourceKind,
    ) -> Result<Vec<Candidate>, RestError> {
        let select = format!("entry_id,common:{table}_common(value)");
        let rows: Vec<SurfaceRow> = self
            .get(table, &[("select", select), ("value", format!("eq.{text}"))])
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Candidate {
                entry_id: EntryId(row.entry_id),
                source,
                common: row.is_common(),
            })
            .collect())
    }

    async fn glosses(&self, entry_id: EntryId) -> Result<Vec<String>, RestError> {
        let rows: Vec<SenseRow> = self
            .get(
                &self.sense_table,
                &[
                    ("select", "id,definition(value,lang)".to_string()),
                    ("entry_id", format!("eq.{entry_id}")),
                    ("order", "id.asc".to_string()),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .flat_map(|sense| sense.definition)
            .filter(|def| self.wants_lang(def.lang.as_deref()))
            .filter_map(|def| def.value)
            .collect())
    }

    fn wants_lang(&self, lang: Option<&str>) -> bool {
        match lang {
            None => true,
            Some(lang) => self.gloss_langs.is_empty() || self.gloss_langs.iter().any(|l| l == lang),
        }
    }

    async fn get<T>(&self, table: &str, query: &[(&str, String)]) -> Result<T, RestError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, table);
        let mut request = self.client.get(&url).query(query);
        if !self.api_key.is_empty() {
            request = request
                .header("apikey", &self.api_key)
                .bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RestError::AuthenticationError(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RestError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RestError::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl EntryStore for RestStore {
    async fn lookup_by_kanji_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError> {
        Ok(self
            .lookup_surface(&self.kanji_table, text, SourceKind::Kanji)
            .await?)
    }

    async fn lookup_by_kana_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError> {
        Ok(self
            .lookup_surface(&self.kana_table, text, SourceKind::Kana)
            .await?)
    }

    async fn get_glosses_for_entry(&self, entry_id: EntryId) -> Result<Vec<String>, LookupError> {
        let glosses = self.glosses(entry_id).await?;
        tracing::trace!(%entry_id, glosses = glosses.len(), "Fetched glosses");
        Ok(glosses)
    }

    fn name(&self) -> &str {
        "rest"
    }
}
