//! Normalization and identity engine for canonical bibliographic records.
//!
//! Raw paper records arrive from many scrapers with inconsistent text
//! quality. This crate turns each of them into a [`CanonicalPaper`] with a
//! stable, human-readable `bibtex_key` and deterministic author slugs:
//!
//! - [`text`]: mojibake repair, ASCII folding, entity decoding, LaTeX stripping
//! - [`slug`]: URL-safe tokens, CJK-aware author slugs
//! - [`authors`]: free-text name splitting into given/family
//! - [`repair`]: the ordered author-name repair stages
//! - [`title`]: coarse ALL-CAPS / all-lowercase title fixing
//! - [`bibtex`]: key generation and batch collision resolution
//! - [`venue`]: venue type classification
//! - [`paper`]: record assembly into the canonical schema
//!
//! Every component takes an explicit [`EngineConfig`] carrying the static
//! tables (particles, stopwords, accent commands, venue registry).

use thiserror::Error;

pub mod authors;
pub mod bibtex;
pub mod config;
pub mod config_file;
pub mod paper;
pub mod repair;
pub mod slug;
pub mod text;
pub mod title;
pub mod venue;

// Re-export for convenience
pub use authors::{AuthorNameParts, RawAuthor, parse_author_name, parse_bibtex_authors};
pub use bibtex::{first_content_word, make_bibtex_key, resolve_bibtex_collisions};
pub use config::{EngineConfig, EngineConfigBuilder, ListOverride};
pub use paper::{CanonicalPaper, RawPaper, ResolvedAuthor, clean_code_url, normalize_paper};
pub use repair::{REPAIR_STAGES, RepairStage, repair_author, resolve_author};
pub use slug::{slugify, slugify_author};
pub use text::{decode_entities, normalize_text, repair_mojibake, strip_html, strip_latex};
pub use title::normalize_title_case;
pub use venue::{VenueRegistry, VenueType, canonical_venue_slug, get_venue_type};

#[derive(Error, Debug)]
pub enum CoreError {
    /// A required field is absent from a raw paper. This always points at an
    /// adapter defect rather than bad upstream data.
    #[error("paper missing required fields {missing:?}; available keys: {present:?}")]
    MissingRequiredField {
        missing: Vec<String>,
        present: Vec<String>,
    },
    #[error("field `{field}` has an unexpected shape: expected {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
    #[error("invalid configured pattern: {0}")]
    Config(#[from] regex::Error),
    #[error("config file error: {0}")]
    ConfigFile(String),
}
