use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use kotoba_config::resolver::ResolverConfig;
use kotoba_core::{
    BatchOutcome, DefaultPreprocessor, ElementAttempt, EntryId, EntryStore, LookupError,
    ResolveError, Resolved, SearchTerm, TermPreprocessor, Unresolved, UnresolvedReason,
};
use tokio_util::sync::CancellationToken;

use crate::lookup::{ElementLookup, LookupStats, call_with_retry, lookup_element};
use crate::pool::WorkerPool;
use crate::reduction::{ClaimSet, GlossTable, Reduction, contested, reduce};

/// Resolves word-list terms to dictionary entries against one store.
///
/// A batch runs in two phases. Every distinct element string (and then every
/// entry whose glosses are needed for ranking) is fetched through a bounded
/// worker pool. The fetched data is then reduced term by term in input order
/// on a single task, which is where entry claims are made. The output only
/// depends on the term list and the store contents.
pub struct Resolver {
    store: Arc<dyn EntryStore>,
    config: ResolverConfig,
    preprocessor: Arc<dyn TermPreprocessor>,
}

/// Element strings of each term, as indexes into the distinct element list
struct BatchPlan {
    elements: Vec<String>,
    term_elements: Vec<Vec<usize>>,
}

impl BatchPlan {
    fn new(terms: &[SearchTerm], preprocessor: &dyn TermPreprocessor) -> Self {
        let mut elements: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        let term_elements = terms
            .iter()
            .map(|term| {
                preprocessor
                    .elements(&term.text)
                    .into_iter()
                    .map(|element| {
                        *positions.entry(element.clone()).or_insert_with(|| {
                            elements.push(element);
                            elements.len() - 1
                        })
                    })
                    .collect()
            })
            .collect();

        Self {
            elements,
            term_elements,
        }
    }
}

impl Resolver {
    pub fn new(store: Arc<dyn EntryStore>, config: ResolverConfig) -> Self {
        Self {
            store,
            config,
            preprocessor: Arc::new(DefaultPreprocessor),
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn TermPreprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Resolve a batch of terms.
    ///
    /// Unresolved terms are reported in the outcome, never as errors. Only a
    /// store that cannot serve the batch at all aborts it.
    pub async fn resolve_batch(&self, terms: &[SearchTerm]) -> Result<BatchOutcome, ResolveError> {
        if self.config.concurrency == 0 {
            return Err(ResolveError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let plan = BatchPlan::new(terms, self.preprocessor.as_ref());
        tracing::info!(
            store = self.store.name(),
            terms = terms.len(),
            elements = plan.elements.len(),
            concurrency = self.config.concurrency,
            "Resolving batch"
        );

        let cancel = CancellationToken::new();
        let stats = Arc::new(LookupStats::default());

        let lookups = self.fetch_candidates(&plan, &cancel, &stats).await?;
        let glosses = self.fetch_glosses(&lookups, &cancel, &stats).await?;

        if stats.all_failed() {
            return Err(ResolveError::StoreUnavailable {
                failed: stats.failed(),
                reason: "every lookup in the batch failed".to_string(),
            });
        }

        let outcome = self.reduce_batch(terms, &plan, &lookups, &glosses);

        tracing::info!(
            resolved = outcome.resolved.len(),
            unresolved = outcome.unresolved.len(),
            lookups = stats.attempted(),
            failed = stats.failed(),
            timed_out = stats.timed_out(),
            "Batch resolved"
        );

        Ok(outcome)
    }

    async fn fetch_candidates(
        &self,
        plan: &BatchPlan,
        cancel: &CancellationToken,
        stats: &Arc<LookupStats>,
    ) -> Result<Vec<ElementLookup>, ResolveError> {
        let pool = self.pool(cancel);
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        let stats_ref = Arc::clone(stats);
        let token = cancel.clone();

        let outputs = pool
            .run(plan.elements.clone(), move |element: String| {
                let store = Arc::clone(&store);
                let config = config.clone();
                let stats = Arc::clone(&stats_ref);
                let token = token.clone();
                async move {
                    let result = lookup_element(store.as_ref(), &element, &config, &stats).await;
                    if let Err(LookupError::Unavailable(reason)) = &result {
                        tracing::error!("Store unavailable while looking up '{element}': {reason}");
                        token.cancel();
                    }
                    result
                }
            })
            .await?;

        abort_if_unavailable(&outputs, cancel, stats)?;

        Ok(outputs
            .into_iter()
            .map(|output| match output {
                Some(Ok(lookup)) => lookup,
                _ => ElementLookup::failed(),
            })
            .collect())
    }

    /// Glosses for every entry that reaches similarity ranking
    async fn fetch_glosses(
        &self,
        lookups: &[ElementLookup],
        cancel: &CancellationToken,
        stats: &Arc<LookupStats>,
    ) -> Result<GlossTable, ResolveError> {
        let needed: BTreeSet<EntryId> = lookups
            .iter()
            .filter_map(|lookup| contested(&lookup.candidates))
            .flatten()
            .collect();

        if needed.is_empty() {
            return Ok(GlossTable::new());
        }
        tracing::debug!(entries = needed.len(), "Fetching glosses for ranking");

        let ids: Vec<EntryId> = needed.into_iter().collect();
        let pool = self.pool(cancel);
        let store = Arc::clone(&self.store);
        let config = self.config.clone();
        let stats_ref = Arc::clone(stats);
        let token = cancel.clone();

        let outputs = pool
            .run(ids.clone(), move |entry_id: EntryId| {
                let store = Arc::clone(&store);
                let config = config.clone();
                let stats = Arc::clone(&stats_ref);
                let token = token.clone();
                async move {
                    let result = call_with_retry(&config, &stats, || {
                        store.get_glosses_for_entry(entry_id)
                    })
                    .await;
                    match &result {
                        Err(LookupError::Unavailable(reason)) => {
                            tracing::error!("Store unavailable while fetching glosses: {reason}");
                            token.cancel();
                        }
                        Err(e) => tracing::warn!("Glosses for entry {entry_id} unavailable: {e}"),
                        Ok(_) => {}
                    }
                    result
                }
            })
            .await?;

        abort_if_unavailable(&outputs, cancel, stats)?;

        // a failed gloss fetch leaves the entry without glosses
        Ok(ids
            .into_iter()
            .zip(outputs)
            .filter_map(|(id, output)| match output {
                Some(Ok(glosses)) => Some((id, glosses)),
                _ => None,
            })
            .collect())
    }

    fn reduce_batch(
        &self,
        terms: &[SearchTerm],
        plan: &BatchPlan,
        lookups: &[ElementLookup],
        glosses: &GlossTable,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut claims = ClaimSet::new();

        for (term, element_indexes) in terms.iter().zip(&plan.term_elements) {
            let probe = term.similarity_probe();
            let mut attempts: Vec<ElementAttempt> = Vec::new();
            let mut resolved: Option<Resolved> = None;

            for &index in element_indexes {
                let element = &plan.elements[index];
                let lookup = &lookups[index];

                match reduce(&lookup.candidates, glosses, &probe, &claims, &term.text) {
                    Reduction::Resolved { entry_id, rule } => {
                        tracing::debug!(term = %term.text, element = %element, %entry_id, ?rule, "Resolved");
                        claims.claim(entry_id, &term.text);
                        resolved = Some(Resolved {
                            text: term.text.clone(),
                            entry_id,
                            level: term.level,
                            element: element.clone(),
                            rule,
                        });
                        break;
                    }
                    Reduction::Unresolved(reason) => {
                        attempts.push(ElementAttempt {
                            element: element.clone(),
                            reason,
                            lookup_failed: lookup.failed,
                        });
                    }
                }
            }

            match resolved {
                Some(resolved) => outcome.resolved.push(resolved),
                None => {
                    let reason = match attempts.as_slice() {
                        [only] => only.reason,
                        _ => UnresolvedReason::NoElementResolved,
                    };
                    tracing::debug!(term = %term.text, %reason, "Unresolved");
                    outcome.unresolved.push(Unresolved {
                        text: term.text.clone(),
                        level: term.level,
                        reason,
                        elements: attempts,
                    });
                }
            }
        }

        tracing::debug!(claimed = claims.count(), "Reduction finished");
        outcome
    }

    fn pool(&self, cancel: &CancellationToken) -> WorkerPool {
        WorkerPool::new(
            self.config.concurrency,
            self.config.queue_capacity,
            cancel.clone(),
        )
    }
}

fn abort_if_unavailable<T>(
    outputs: &[Option<Result<T, LookupError>>],
    cancel: &CancellationToken,
    stats: &LookupStats,
) -> Result<(), ResolveError> {
    if !cancel.is_cancelled() {
        return Ok(());
    }

    let reason = outputs
        .iter()
        .find_map(|output| match output {
            Some(Err(LookupError::Unavailable(reason))) => Some(reason.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "batch cancelled".to_string());

    Err(ResolveError::StoreUnavailable {
        failed: stats.failed(),
        reason,
    })
}
