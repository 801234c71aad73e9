use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use kotoba_config::resolver::ResolverConfig;
use kotoba_core::{Candidate, EntryStore, LookupError, SourceKind};

/// Counters over logical store calls (a call and its retries count once)
#[derive(Debug, Default)]
pub struct LookupStats {
    attempted: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    timed_out: AtomicUsize,
}

impl LookupStats {
    pub fn attempted(&self) -> usize {
        self.attempted.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Individual attempts that hit the timeout, including retried ones
    pub fn timed_out(&self) -> usize {
        self.timed_out.load(Ordering::Relaxed)
    }

    /// Every call was attempted and none came back
    pub fn all_failed(&self) -> bool {
        self.attempted() > 0 && self.succeeded() == 0
    }
}

/// Run one store call under the lookup timeout, retrying timeouts.
///
/// A call that still times out after `lookup_retries` extra attempts is
/// reported as `LookupError::Failed`. Other errors are not retried.
pub async fn call_with_retry<T, F, Fut>(
    config: &ResolverConfig,
    stats: &LookupStats,
    mut call: F,
) -> Result<T, LookupError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LookupError>>,
{
    stats.attempted.fetch_add(1, Ordering::Relaxed);
    let mut attempt = 0;

    loop {
        let result = match tokio::time::timeout(config.lookup_timeout(), call()).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout),
        };

        match result {
            Ok(value) => {
                stats.succeeded.fetch_add(1, Ordering::Relaxed);
                return Ok(value);
            }
            Err(e) if e.is_retryable() => {
                stats.timed_out.fetch_add(1, Ordering::Relaxed);
                if attempt < config.lookup_retries {
                    attempt += 1;
                    tracing::debug!(attempt, "Lookup timed out, retrying");
                    tokio::time::sleep(config.retry_backoff(attempt)).await;
                    continue;
                }
                stats.failed.fetch_add(1, Ordering::Relaxed);
                return Err(LookupError::Failed(format!(
                    "timed out after {} attempts",
                    attempt + 1
                )));
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        }
    }
}

/// Candidates found for one element string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementLookup {
    pub candidates: Vec<Candidate>,
    /// The kanji or kana call failed, so the candidate set may be partial
    pub failed: bool,
}

impl ElementLookup {
    /// Failed lookup, degraded to "no candidates"
    pub fn failed() -> Self {
        Self {
            candidates: vec![],
            failed: true,
        }
    }
}

/// Look an element up in both the kanji and kana tables.
///
/// Only `LookupError::Unavailable` is returned as an error; any other failure
/// leaves that table's candidates out and marks the lookup as failed.
pub async fn lookup_element(
    store: &dyn EntryStore,
    element: &str,
    config: &ResolverConfig,
    stats: &LookupStats,
) -> Result<ElementLookup, LookupError> {
    let (kanji, kana) = tokio::join!(
        call_with_retry(config, stats, || store.lookup_by_kanji_text(element)),
        call_with_retry(config, stats, || store.lookup_by_kana_text(element)),
    );

    let mut lookup = ElementLookup::default();

    for (kind, result) in [(SourceKind::Kanji, kanji), (SourceKind::Kana, kana)] {
        match result {
            Ok(found) => lookup.candidates.extend(found),
            Err(LookupError::Unavailable(reason)) => {
                return Err(LookupError::Unavailable(reason));
            }
            Err(e) => {
                tracing::warn!("{kind:?} lookup for '{element}' failed: {e}");
                lookup.failed = true;
            }
        }
    }

    tracing::debug!(
        element,
        candidates = lookup.candidates.len(),
        failed = lookup.failed,
        "Element looked up"
    );

    Ok(lookup)
}
