use anthology_core::{
    RawAuthor, make_bibtex_key, normalize_paper, resolve_author, resolve_bibtex_collisions,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{CanonicalPaper, CoreError, EngineConfig, RawPaper};

/// A record that could not be normalized.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the record in the input batch.
    pub index: usize,
    pub error: CoreError,
}

/// Outcome of assembling one venue-year batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub normalized: usize,
    /// Keys that received a collision suffix.
    pub suffixed: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when the batch had records and none of them survived.
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.normalized == 0
    }
}

/// Family name of the first author that survives repair, or `""`.
fn first_author_family(raw: &RawPaper, config: &EngineConfig) -> String {
    let Some(Value::Array(items)) = raw.get("authors") else {
        return String::new();
    };
    items
        .iter()
        .filter_map(|item| RawAuthor::deserialize(item).ok())
        .find_map(|author| resolve_author(&author, config))
        .map(|author| author.family)
        .unwrap_or_default()
}

fn candidate_key(raw: &RawPaper, venue: &str, year: &str, config: &EngineConfig) -> String {
    if let Some(key) = raw.get_str("bibtex_key").filter(|k| !k.trim().is_empty()) {
        return key.to_string();
    }
    let title = raw.get_str("title").unwrap_or_default();
    make_bibtex_key(&first_author_family(raw, config), year, venue, title, config)
}

/// Assemble one venue-year batch of raw records into canonical papers.
///
/// Records without a `bibtex_key` get one derived from their first
/// repaired author, the batch year and venue, and the title. Collisions
/// are resolved once over the whole batch in input order, so the first
/// record with a given key keeps it. Each record is then normalized on its
/// own: a failure is logged and reported without stopping the batch.
pub fn assemble_batch(
    venue: &str,
    year: &str,
    raw_papers: Vec<RawPaper>,
    config: &EngineConfig,
) -> (Vec<CanonicalPaper>, BatchReport) {
    let candidates: Vec<String> = raw_papers
        .iter()
        .map(|raw| candidate_key(raw, venue, year, config))
        .collect();
    let keys = resolve_bibtex_collisions(&candidates);

    let mut report = BatchReport {
        total: raw_papers.len(),
        suffixed: candidates.iter().zip(&keys).filter(|(c, k)| c != k).count(),
        ..Default::default()
    };
    let mut papers = Vec::with_capacity(raw_papers.len());

    for (index, (mut raw, key)) in raw_papers.into_iter().zip(keys).enumerate() {
        raw.insert("bibtex_key", key);
        if !raw.contains_key("venue") {
            raw.insert("venue", venue);
        }
        match normalize_paper(&raw, config) {
            Ok(paper) => papers.push(paper),
            Err(error) => {
                tracing::warn!(venue, year, index, error = %error, "skipping paper that failed normalization");
                report.failures.push(BatchFailure { index, error });
            }
        }
    }

    report.normalized = papers.len();
    tracing::info!(
        venue,
        year,
        normalized = report.normalized,
        failed = report.failed(),
        suffixed = report.suffixed,
        "assembled batch"
    );
    (papers, report)
}
