use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_concurrency() -> usize {
    8
}

fn default_lookup_timeout_ms() -> u64 {
    5000
}

fn default_lookup_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_queue_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Concurrent store calls in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    /// Extra attempts after a timed-out lookup
    #[serde(default = "default_lookup_retries")]
    pub lookup_retries: u32,
    /// Backoff step between retries, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Job channel capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            lookup_retries: default_lookup_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl ResolverConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}
