use std::io::Read;
use std::path::Path;

use crate::{RawPaper, StoreError, gz};

/// Read raw adapter output: a JSON array of records, or JSONL.
///
/// Files ending in `.gz` are decompressed first.
pub fn read_raw_papers(path: &Path) -> Result<Vec<RawPaper>, StoreError> {
    let text = if path.extension().is_some_and(|ext| ext == "gz") {
        let mut text = String::new();
        gz::open(path)?.read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => StoreError::Io(e),
        })?
    };
    parse_raw_papers(&text)
}

fn parse_raw_papers(text: &str) -> Result<Vec<RawPaper>, StoreError> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(StoreError::from))
        .collect()
}
