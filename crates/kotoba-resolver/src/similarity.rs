//! Gloss similarity used to rank otherwise tied candidates.
//!
//! Scores are Sørensen-Dice coefficients over character bigrams, so they
//! stay in `[0, 1]` and ignore word order inside short glosses.

/// Separators between meanings in a word-list hint (`to see; to look at`)
const HINT_SEPARATORS: [char; 2] = [';', ','];

/// Lowercased, trimmed meanings of a hint
pub fn probe_parts(probe: &str) -> Vec<String> {
    probe
        .split(HINT_SEPARATORS)
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Best score of any probe part against one gloss
pub fn gloss_similarity(parts: &[String], gloss: &str) -> f64 {
    let gloss = gloss.trim().to_lowercase();
    if gloss.is_empty() {
        return 0.0;
    }

    parts
        .iter()
        .map(|part| strsim::sorensen_dice(part, &gloss))
        .fold(0.0, f64::max)
}

/// Highest gloss score of an entry, 0.0 without glosses
pub fn best_gloss_score<'a>(parts: &[String], glosses: impl IntoIterator<Item = &'a str>) -> f64 {
    glosses
        .into_iter()
        .map(|gloss| gloss_similarity(parts, gloss))
        .fold(0.0, f64::max)
}
