use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use kotoba_core::{BatchOutcome, EntryId, JlptLevel, Resolved};
use serde::{Deserialize, Serialize};

/// Level assignment row for the hosted `jlpt_*` tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRow {
    pub id: EntryId,
    pub jlpt_level: JlptLevel,
}

pub struct OutputPaths {
    pub resolved: PathBuf,
    pub unresolved: PathBuf,
    pub level_rows: PathBuf,
}

/// One row per entry id, first resolution wins
pub fn level_rows(resolved: &[Resolved]) -> Vec<LevelRow> {
    let mut seen = HashSet::new();
    resolved
        .iter()
        .filter(|r| seen.insert(r.entry_id))
        .map(|r| LevelRow {
            id: r.entry_id,
            jlpt_level: r.level,
        })
        .collect()
}

pub fn chunk_rows(rows: &[LevelRow], batch_size: usize) -> Vec<Vec<LevelRow>> {
    rows.chunks(batch_size.max(1)).map(<[LevelRow]>::to_vec).collect()
}

/// Write `resolved.json`, `unresolved.json` and `level_rows.json` into `dir`
pub fn write_outcome(
    dir: &Path,
    outcome: &BatchOutcome,
    batch_size: usize,
) -> anyhow::Result<OutputPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let paths = OutputPaths {
        resolved: dir.join("resolved.json"),
        unresolved: dir.join("unresolved.json"),
        level_rows: dir.join("level_rows.json"),
    };

    write_json(&paths.resolved, &outcome.resolved)?;
    write_json(&paths.unresolved, &outcome.unresolved)?;

    let rows = level_rows(&outcome.resolved);
    let chunks = chunk_rows(&rows, batch_size);
    write_json(&paths.level_rows, &chunks)?;

    tracing::info!(
        "Wrote {} resolved, {} unresolved and {} level rows in {} chunks to {}",
        outcome.resolved.len(),
        outcome.unresolved.len(),
        rows.len(),
        chunks.len(),
        dir.display()
    );

    Ok(paths)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use kotoba_core::{ResolutionRule, Unresolved, UnresolvedReason};

    use super::*;

    fn resolved(text: &str, id: u64, level: JlptLevel) -> Resolved {
        Resolved {
            text: text.to_string(),
            entry_id: EntryId(id),
            level,
            element: text.to_string(),
            rule: ResolutionRule::Unique,
        }
    }

    #[test]
    fn level_rows_keep_first_occurrence() {
        let rows = level_rows(&[
            resolved("言う", 1587040, JlptLevel::N5),
            resolved("猫", 1467640, JlptLevel::N5),
            resolved("いう", 1587040, JlptLevel::N4),
        ]);

        assert_eq!(
            rows,
            vec![
                LevelRow {
                    id: EntryId(1587040),
                    jlpt_level: JlptLevel::N5,
                },
                LevelRow {
                    id: EntryId(1467640),
                    jlpt_level: JlptLevel::N5,
                },
            ]
        );
    }

    #[test]
    fn chunks_respect_batch_size() {
        let rows: Vec<LevelRow> = (0..250)
            .map(|id| LevelRow {
                id: EntryId(id),
                jlpt_level: JlptLevel::N3,
            })
            .collect();

        let chunks = chunk_rows(&rows, 100);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);

        assert_eq!(chunk_rows(&rows[..3], 0).len(), 3);
        assert!(chunk_rows(&[], 100).is_empty());
    }

    #[test]
    fn writes_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("n5");
        let outcome = BatchOutcome {
            resolved: vec![resolved("猫", 1467640, JlptLevel::N5)],
            unresolved: vec![Unresolved {
                text: "ぬこ".to_string(),
                level: JlptLevel::N5,
                reason: UnresolvedReason::NoCandidates,
                elements: vec![],
            }],
        };

        let paths = write_outcome(&out, &outcome, 100).unwrap();

        let unresolved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.unresolved).unwrap()).unwrap();
        assert_eq!(unresolved[0]["reason"], "no_candidates");

        let rows: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.level_rows).unwrap()).unwrap();
        assert_eq!(rows, serde_json::json!([[{ "id": 1467640, "jlpt_level": 5 }]]));

        let back: Vec<Resolved> =
            serde_json::from_str(&fs::read_to_string(&paths.resolved).unwrap()).unwrap();
        assert_eq!(back, outcome.resolved);
    }
}
