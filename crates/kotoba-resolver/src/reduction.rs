//! Candidate reduction: pick one entry out of the lookup hits for an element.
//!
//! Rules run in a fixed order and stop at the first unique answer:
//! unique id, then the single common entry, then gloss similarity against the
//! term's hint, then the lowest id not yet claimed by another term.

use std::collections::{BTreeMap, HashMap};

use kotoba_core::{Candidate, EntryId, ResolutionRule, UnresolvedReason};

use crate::similarity::{best_gloss_score, probe_parts};

pub type GlossTable = HashMap<EntryId, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Resolved {
        entry_id: EntryId,
        rule: ResolutionRule,
    },
    Unresolved(UnresolvedReason),
}

/// Entries already assigned during the current batch, keyed to the term text
#[derive(Debug, Default)]
pub struct ClaimSet {
    claims: HashMap<EntryId, String>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free, or already held by the same term text
    pub fn is_available(&self, entry_id: EntryId, term: &str) -> bool {
        self.claims
            .get(&entry_id)
            .is_none_or(|holder| holder == term)
    }

    /// First claim wins
    pub fn claim(&mut self, entry_id: EntryId, term: &str) {
        self.claims
            .entry(entry_id)
            .or_insert_with(|| term.to_string());
    }

    /// Number of claimed entries
    pub fn count(&self) -> usize {
        self.claims.len()
    }
}

/// Distinct entry ids with whether any matched record is common, ascending
pub fn dedupe(candidates: &[Candidate]) -> BTreeMap<EntryId, bool> {
    let mut ids: BTreeMap<EntryId, bool> = BTreeMap::new();
    for candidate in candidates {
        *ids.entry(candidate.entry_id).or_insert(false) |= candidate.common;
    }
    ids
}

/// Entries left after the common-flag filter when it does not decide alone.
///
/// `None` when the unique or single-common rule settles the element.
pub fn contested(candidates: &[Candidate]) -> Option<Vec<EntryId>> {
    let ids = dedupe(candidates);
    if ids.len() < 2 {
        return None;
    }

    let common: Vec<EntryId> = ids
        .iter()
        .filter(|(_, common)| **common)
        .map(|(id, _)| *id)
        .collect();

    match common.len() {
        1 => None,
        0 => Some(ids.into_keys().collect()),
        _ => Some(common),
    }
}

/// Reduce one element's candidates to a single entry.
///
/// `probe` is the term's gloss hint (or its level label); `term` is the raw
/// term text used for claims.
pub fn reduce(
    candidates: &[Candidate],
    glosses: &GlossTable,
    probe: &str,
    claims: &ClaimSet,
    term: &str,
) -> Reduction {
    let ids = dedupe(candidates);

    match ids.len() {
        0 => return Reduction::Unresolved(UnresolvedReason::NoCandidates),
        1 => {
            if let Some(&entry_id) = ids.keys().next() {
                return Reduction::Resolved {
                    entry_id,
                    rule: ResolutionRule::Unique,
                };
            }
        }
        _ => {}
    }

    let remaining = match contested(candidates) {
        Some(remaining) => remaining,
        None => {
            // exactly one common entry
            let entry_id = ids
                .iter()
                .find(|(_, common)| **common)
                .map(|(id, _)| *id);
            return match entry_id {
                Some(entry_id) => Reduction::Resolved {
                    entry_id,
                    rule: ResolutionRule::Common,
                },
                None => Reduction::Unresolved(UnresolvedReason::Ambiguous),
            };
        }
    };

    if let Some(entry_id) = rank_by_similarity(&remaining, glosses, probe) {
        return Reduction::Resolved {
            entry_id,
            rule: ResolutionRule::Similarity,
        };
    }

    // remaining is ascending, so the first free id is the lowest
    match remaining
        .iter()
        .find(|id| claims.is_available(**id, term))
    {
        Some(&entry_id) => Reduction::Resolved {
            entry_id,
            rule: ResolutionRule::Fallback,
        },
        None => Reduction::Unresolved(UnresolvedReason::Ambiguous),
    }
}

/// Entry holding the single best gloss, lowest id on ties; `None` when no
/// entry scores above zero
fn rank_by_similarity(remaining: &[EntryId], glosses: &GlossTable, probe: &str) -> Option<EntryId> {
    let parts = probe_parts(probe);
    if parts.is_empty() {
        return None;
    }

    let mut best: Option<(EntryId, f64)> = None;
    for &entry_id in remaining {
        let score = glosses
            .get(&entry_id)
            .map(|texts| best_gloss_score(&parts, texts.iter().map(String::as_str)))
            .unwrap_or(0.0);

        tracing::trace!(%entry_id, score, "Gloss similarity");

        let better = match best {
            Some((best_id, best_score)) => {
                score > best_score || (score == best_score && entry_id < best_id)
            }
            None => true,
        };
        if better {
            best = Some((entry_id, score));
        }
    }

    best.filter(|(_, score)| *score > 0.0).map(|(id, _)| id)
}
