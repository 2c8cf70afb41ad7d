//! Gzipped JSONL files: one JSON record per line.

use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{StoreError, gz};

/// Read every record of a gzipped JSONL file. Blank lines are skipped.
pub fn read_legacy<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let mut records = Vec::new();
    for line in gz::open(path)?.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            records.push(serde_json::from_str(line)?);
        }
    }
    Ok(records)
}

/// Write records as gzipped JSONL.
///
/// With `atomic`, a crash mid-write never leaves a truncated file at `path`.
pub fn write_legacy<T: Serialize>(path: &Path, records: &[T], atomic: bool) -> Result<(), StoreError> {
    gz::write(path, atomic, |w| {
        for record in records {
            serde_json::to_writer(&mut *w, record)?;
            w.write_all(b"\n")?;
        }
        Ok(())
    })?;
    tracing::debug!(path = %path.display(), records = records.len(), atomic, "wrote jsonl file");
    Ok(())
}
