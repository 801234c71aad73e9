//! Batch resolution against an in-memory fake store

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kotoba_config::resolver::ResolverConfig;
use kotoba_core::{
    Candidate, EntryId, EntryStore, JlptLevel, LookupError, ResolutionRule, ResolveError,
    SearchTerm, SourceKind, UnresolvedReason,
};
use kotoba_resolver::Resolver;

#[derive(Default)]
struct FakeStore {
    kanji: HashMap<String, Vec<(u64, bool)>>,
    kana: HashMap<String, Vec<(u64, bool)>>,
    glosses: HashMap<u64, Vec<String>>,
    failing: HashSet<String>,
    slow: HashSet<String>,
    fail_everything: bool,
    failing_glosses: bool,
    unavailable: bool,
    calls: AtomicUsize,
}

impl FakeStore {
    fn kanji(mut self, text: &str, id: u64, common: bool) -> Self {
        self.kanji.entry(text.to_string()).or_default().push((id, common));
        self
    }

    fn kana(mut self, text: &str, id: u64, common: bool) -> Self {
        self.kana.entry(text.to_string()).or_default().push((id, common));
        self
    }

    fn glosses(mut self, id: u64, texts: &[&str]) -> Self {
        self.glosses
            .insert(id, texts.iter().map(|t| t.to_string()).collect());
        self
    }

    fn failing(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    fn slow(mut self, text: &str) -> Self {
        self.slow.insert(text.to_string());
        self
    }

    async fn lookup(
        &self,
        table: &HashMap<String, Vec<(u64, bool)>>,
        source: SourceKind,
        text: &str,
    ) -> Result<Vec<Candidate>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(LookupError::Unavailable("401 Unauthorized".to_string()));
        }
        if self.fail_everything || self.failing.contains(text) {
            return Err(LookupError::Failed("connection reset".to_string()));
        }
        if self.slow.contains(text) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }

        Ok(table
            .get(text)
            .into_iter()
            .flatten()
            .map(|(id, common)| Candidate {
                entry_id: EntryId(*id),
                source,
                common: *common,
            })
            .collect())
    }
}

#[async_trait]
impl EntryStore for FakeStore {
    async fn lookup_by_kanji_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError> {
        self.lookup(&self.kanji, SourceKind::Kanji, text).await
    }

    async fn lookup_by_kana_text(&self, text: &str) -> Result<Vec<Candidate>, LookupError> {
        self.lookup(&self.kana, SourceKind::Kana, text).await
    }

    async fn get_glosses_for_entry(&self, entry_id: EntryId) -> Result<Vec<String>, LookupError> {
        if self.fail_everything || self.failing_glosses {
            return Err(LookupError::Failed("connection reset".to_string()));
        }
        Ok(self.glosses.get(&entry_id.0).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn config() -> ResolverConfig {
    ResolverConfig {
        concurrency: 4,
        lookup_timeout_ms: 50,
        lookup_retries: 1,
        retry_backoff_ms: 1,
        queue_capacity: 8,
    }
}

fn resolver(store: FakeStore) -> Resolver {
    Resolver::new(Arc::new(store), config())
}

fn term(text: &str) -> SearchTerm {
    SearchTerm::new(text, JlptLevel::N5)
}

fn sample_store() -> FakeStore {
    FakeStore::default()
        .kanji("猫", 1586100, true)
        .kana("ねこ", 1586100, true)
        .kana("いう", 1587040, true)
        .kana("いう", 1008450, false)
        .kana("いう", 2829697, false)
        .kanji("見る", 1259290, true)
        .kana("みる", 1259290, true)
        .kanji("観る", 1259290, false)
        .kana("する", 1157170, true)
        .kana("はし", 1489310, false)
        .kana("はし", 1489320, false)
        .glosses(1489310, &["bridge"])
        .glosses(1489320, &["chopsticks"])
}

#[tokio::test]
async fn kanji_with_single_entry_resolves() {
    let outcome = resolver(sample_store())
        .resolve_batch(&[term("猫")])
        .await
        .unwrap();

    assert_eq!(outcome.resolved.len(), 1);
    assert_eq!(outcome.resolved[0].entry_id, EntryId(1586100));
    assert_eq!(outcome.resolved[0].rule, ResolutionRule::Unique);
    assert!(outcome.unresolved.is_empty());
}

#[tokio::test]
async fn common_kana_reading_wins() {
    let outcome = resolver(sample_store())
        .resolve_batch(&[term("いう")])
        .await
        .unwrap();

    assert_eq!(outcome.resolved[0].entry_id, EntryId(1587040));
    assert_eq!(outcome.resolved[0].rule, ResolutionRule::Common);
}

#[tokio::test]
async fn missing_term_has_no_candidates() {
    let outcome = resolver(sample_store())
        .resolve_batch(&[term("存在しない")])
        .await
        .unwrap();

    assert!(outcome.resolved.is_empty());
    assert_eq!(outcome.unresolved[0].reason, UnresolvedReason::NoCandidates);
    assert_eq!(outcome.unresolved[0].text, "存在しない");
}

#[tokio::test]
async fn elision_mark_is_ignored() {
    let resolver = resolver(sample_store());
    let with_mark = resolver.resolve_batch(&[term("～する")]).await.unwrap();
    let without = resolver.resolve_batch(&[term("する")]).await.unwrap();

    assert_eq!(with_mark.resolved[0].entry_id, without.resolved[0].entry_id);
    assert_eq!(with_mark.resolved[0].element, "する");
    assert_eq!(with_mark.resolved[0].text, "～する");
}

#[tokio::test]
async fn first_resolving_element_in_order() {
    // each spelling resolves uniquely to its own entry
    let store = FakeStore::default()
        .kanji("見る", 1259290, true)
        .kanji("観る", 1259300, false);
    let outcome = resolver(store)
        .resolve_batch(&[term("見る; 観る"), term("観る; 見る")])
        .await
        .unwrap();

    assert_eq!(outcome.resolved[0].element, "見る");
    assert_eq!(outcome.resolved[0].entry_id, EntryId(1259290));
    assert_eq!(outcome.resolved[1].element, "観る");
    assert_eq!(outcome.resolved[1].entry_id, EntryId(1259300));
}

#[tokio::test]
async fn later_element_used_when_first_has_no_candidates() {
    let outcome = resolver(sample_store())
        .resolve_batch(&[term("見るる; 観る")])
        .await
        .unwrap();

    assert_eq!(outcome.resolved[0].element, "観る");
}

#[tokio::test]
async fn multi_element_failure_reports_every_attempt() {
    let outcome = resolver(sample_store())
        .resolve_batch(&[term("ない1; ない2")])
        .await
        .unwrap();

    let unresolved = &outcome.unresolved[0];
    assert_eq!(unresolved.reason, UnresolvedReason::NoElementResolved);
    assert_eq!(unresolved.elements.len(), 2);
    assert_eq!(unresolved.elements[0].element, "ない1");
}

#[tokio::test]
async fn empty_term_is_unresolved() {
    let outcome = resolver(sample_store())
        .resolve_batch(&[term("～")])
        .await
        .unwrap();

    assert_eq!(outcome.unresolved[0].reason, UnresolvedReason::NoElementResolved);
}

#[tokio::test]
async fn gloss_hint_ranks_candidates() {
    let terms = [term("はし").with_gloss_hint("chopsticks")];
    let outcome = resolver(sample_store()).resolve_batch(&terms).await.unwrap();

    assert_eq!(outcome.resolved[0].entry_id, EntryId(1489320));
    assert_eq!(outcome.resolved[0].rule, ResolutionRule::Similarity);
}

#[tokio::test]
async fn fallback_never_assigns_one_entry_twice() {
    let store = FakeStore::default()
        .kana("かみ", 10, false)
        .kana("かみ", 20, false)
        .kanji("紙", 10, false)
        .kanji("紙", 20, false)
        .kanji("髪", 10, false)
        .kanji("髪", 20, false);

    let terms = [term("かみ"), term("紙"), term("髪")];
    let outcome = resolver(store).resolve_batch(&terms).await.unwrap();

    let ids: Vec<_> = outcome.resolved.iter().map(|r| r.entry_id).collect();
    assert_eq!(ids, vec![EntryId(10), EntryId(20)]);
    assert!(
        outcome
            .resolved
            .iter()
            .all(|r| r.rule == ResolutionRule::Fallback)
    );
    assert_eq!(outcome.unresolved[0].text, "髪");
    assert_eq!(outcome.unresolved[0].reason, UnresolvedReason::Ambiguous);
}

#[tokio::test]
async fn outputs_partition_input_and_are_repeatable() {
    let terms: Vec<SearchTerm> = ["猫", "いう", "nothing", "～する", "見る; 観る", "はし", "", "ねこ"]
        .iter()
        .map(|t| term(t))
        .collect();

    let resolver = resolver(sample_store());
    let first = resolver.resolve_batch(&terms).await.unwrap();
    let second = resolver.resolve_batch(&terms).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), terms.len());

    let mut seen: Vec<&str> = first
        .resolved
        .iter()
        .map(|r| r.text.as_str())
        .chain(first.unresolved.iter().map(|u| u.text.as_str()))
        .collect();
    seen.sort_unstable();
    let mut expected: Vec<&str> = terms.iter().map(|t| t.text.as_str()).collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);

    // order inside each sequence follows the input
    let resolved: Vec<_> = first.resolved.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(resolved, vec!["猫", "いう", "～する", "見る; 観る", "はし", "ねこ"]);
}

#[tokio::test]
async fn failed_lookup_degrades_to_no_candidates() {
    let store = sample_store().failing("壊れた");
    let outcome = resolver(store)
        .resolve_batch(&[term("壊れた"), term("猫")])
        .await
        .unwrap();

    assert_eq!(outcome.resolved.len(), 1);
    let broken = &outcome.unresolved[0];
    assert_eq!(broken.reason, UnresolvedReason::NoCandidates);
    assert!(broken.elements[0].lookup_failed);
}

#[tokio::test]
async fn timed_out_lookup_is_marked_failed() {
    let store = sample_store().slow("遅い");
    let outcome = resolver(store)
        .resolve_batch(&[term("遅い"), term("猫")])
        .await
        .unwrap();

    assert_eq!(outcome.resolved[0].text, "猫");
    assert!(outcome.unresolved[0].elements[0].lookup_failed);
}

#[tokio::test]
async fn failed_gloss_fetch_falls_back_to_lowest_id() {
    let store = FakeStore {
        failing_glosses: true,
        ..sample_store()
    };
    let terms = [term("はし").with_gloss_hint("chopsticks")];

    let outcome = resolver(store).resolve_batch(&terms).await.unwrap();

    // without glosses the hint cannot pick 1489320
    assert_eq!(outcome.resolved[0].entry_id, EntryId(1489310));
    assert_eq!(outcome.resolved[0].rule, ResolutionRule::Fallback);
    assert!(outcome.unresolved.is_empty());
}

#[tokio::test]
async fn total_failure_aborts_batch() {
    let store = FakeStore {
        fail_everything: true,
        ..sample_store()
    };
    let result = resolver(store).resolve_batch(&[term("猫"), term("いう")]).await;

    assert!(matches!(result, Err(ResolveError::StoreUnavailable { .. })));
}

#[tokio::test]
async fn unavailable_store_cancels_batch() {
    let store = FakeStore {
        unavailable: true,
        ..sample_store()
    };
    let terms: Vec<SearchTerm> = (0..200).map(|i| term(&format!("語{i}"))).collect();
    let store = Arc::new(store);
    let resolver = Resolver::new(store.clone(), config());

    let result = resolver.resolve_batch(&terms).await;

    match result {
        Err(ResolveError::StoreUnavailable { reason, .. }) => {
            assert!(reason.contains("401"));
        }
        other => panic!("expected StoreUnavailable, got {other:?}"),
    }
    // cancellation stops the pool before every element is tried
    assert!(store.calls.load(Ordering::SeqCst) < 400);
}

#[tokio::test]
async fn shared_elements_are_looked_up_once() {
    let store = Arc::new(sample_store());
    let resolver = Resolver::new(store.clone(), config());
    let terms = [term("猫"), term("～猫"), term("猫; 猫")];

    let outcome = resolver.resolve_batch(&terms).await.unwrap();

    assert_eq!(outcome.resolved.len(), 3);
    // one kanji and one kana call for the single distinct element
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn zero_concurrency_is_rejected() {
    let resolver = Resolver::new(
        Arc::new(sample_store()),
        ResolverConfig {
            concurrency: 0,
            ..config()
        },
    );
    let result = resolver.resolve_batch(&[term("猫")]).await;
    assert!(matches!(result, Err(ResolveError::InvalidConfig(_))));
}

#[tokio::test]
async fn empty_batch() {
    let outcome = resolver(sample_store()).resolve_batch(&[]).await.unwrap();
    assert!(outcome.is_empty());
}
