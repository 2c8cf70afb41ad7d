//! Dataset files for canonical paper records.
//!
//! Papers are stored one venue-year per file as gzipped JSON
//! (`<venue>-<year>.json.gz`). This crate reads and writes those files and
//! the older gzipped JSONL layout, assembles a raw venue-year batch into
//! canonical records, and re-runs author repair over stored data.

use std::path::PathBuf;

use thiserror::Error;

pub mod batch;
mod gz;
pub mod input;
pub mod legacy;
pub mod repair;
pub mod venue_file;

// Re-export engine types used throughout the store API
pub use anthology_core::{CanonicalPaper, CoreError, EngineConfig, RawPaper};

pub use batch::{BatchFailure, BatchReport, assemble_batch};
pub use input::read_raw_papers;
pub use legacy::{read_legacy, write_legacy};
pub use repair::{RepairSummary, repair_dir, repair_file, repair_paper};
pub use venue_file::{VenueFile, read_venue_json, venue_file_name, write_venue_json};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),
}
