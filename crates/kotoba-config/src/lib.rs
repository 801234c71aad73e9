use std::env;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::output::OutputConfig;
use self::remote::RemoteConfig;
use self::resolver::ResolverConfig;

pub mod dictionary;
pub mod output;
pub mod remote;
pub mod resolver;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub dictionary: DictionaryConfig,
    pub remote: RemoteConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Environment variables win over profile values
    pub fn apply_env(&mut self) {
        if let Some(n) = env_parse("KOTOBA_CONCURRENCY") {
            self.resolver.concurrency = n;
        }
        if let Some(ms) = env_parse("KOTOBA_LOOKUP_TIMEOUT_MS") {
            self.resolver.lookup_timeout_ms = ms;
        }
        if let Some(n) = env_parse("KOTOBA_LOOKUP_RETRIES") {
            self.resolver.lookup_retries = n;
        }
        if let Ok(url) = env::var("KOTOBA_REMOTE_URL") {
            self.remote.url = url;
        }
        if let Ok(key) = env::var("KOTOBA_REMOTE_KEY") {
            self.remote.api_key = key;
        }
        if let Ok(dir) = env::var("KOTOBA_OUTPUT_DIR") {
            self.output.dir = dir;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
