//! Re-run author repair over stored venue files.

use std::path::{Path, PathBuf};

use anthology_core::{RawAuthor, ResolvedAuthor, resolve_author};

use crate::venue_file::{read_venue_json, rewrite_venue_json};
use crate::{CanonicalPaper, EngineConfig, StoreError};

/// Totals for a directory repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub files: usize,
    pub files_changed: usize,
    pub papers_changed: usize,
}

/// Repaired copy of a paper's author list: every author goes through the
/// full repair chain again, empty ones are dropped and slugs recomputed.
pub fn repair_paper(paper: &CanonicalPaper, config: &EngineConfig) -> Vec<ResolvedAuthor> {
    paper
        .authors
        .iter()
        .filter_map(|author| resolve_author(&RawAuthor::from(author.parts()), config))
        .map(ResolvedAuthor::from_parts)
        .collect()
}

/// Repair author names in one venue file in place.
///
/// The file is only rewritten when some paper changed. Returns the number
/// of changed papers.
pub fn repair_file(path: &Path, config: &EngineConfig) -> Result<usize, StoreError> {
    let mut data = read_venue_json(path)?;

    let mut changed = 0;
    for paper in &mut data.papers {
        let authors = repair_paper(paper, config);
        if authors != paper.authors {
            paper.authors = authors;
            changed += 1;
        }
    }

    if changed > 0 {
        rewrite_venue_json(path, &data)?;
        tracing::info!(path = %path.display(), changed, "repaired author names");
    }
    Ok(changed)
}

/// Repair every `*.json.gz` file in `dir`, in file-name order.
pub fn repair_dir(dir: &Path, config: &EngineConfig) -> Result<RepairSummary, StoreError> {
    if !dir.is_dir() {
        return Err(StoreError::NotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(".json.gz"))
        })
        .collect();
    files.sort();

    let mut summary = RepairSummary::default();
    for path in &files {
        let changed = repair_file(path, config)?;
        summary.files += 1;
        if changed > 0 {
            summary.files_changed += 1;
            summary.papers_changed += changed;
        }
    }
    tracing::info!(
        dir = %dir.display(),
        files = summary.files,
        papers_changed = summary.papers_changed,
        "repair finished"
    );
    Ok(summary)
}
