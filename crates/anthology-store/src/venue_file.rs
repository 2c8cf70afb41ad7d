use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CanonicalPaper, StoreError, gz};

/// Contents of one venue-year file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueFile {
    pub venue: String,
    pub year: String,
    pub papers: Vec<CanonicalPaper>,
    /// Other top-level keys, kept through rewrites.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize)]
struct VenueFileRef<'a> {
    venue: &'a str,
    year: &'a str,
    papers: &'a [CanonicalPaper],
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

/// Default file name for a venue-year: `icml-2024.json.gz`.
pub fn venue_file_name(venue: &str, year: &str) -> String {
    format!("{venue}-{year}.json.gz")
}

/// Write a venue-year file into `output_dir`.
///
/// `filename` overrides the file stem (without `.json.gz`). The JSON is
/// pretty-printed with two-space indentation and non-ASCII text is kept as
/// is. Returns the path written.
pub fn write_venue_json(
    venue: &str,
    year: &str,
    papers: &[CanonicalPaper],
    output_dir: &Path,
    filename: Option<&str>,
) -> Result<PathBuf, StoreError> {
    let path = match filename {
        Some(stem) => output_dir.join(format!("{stem}.json.gz")),
        None => output_dir.join(venue_file_name(venue, year)),
    };
    let extra = Map::new();
    write_to(
        &path,
        &VenueFileRef {
            venue,
            year,
            papers,
            extra: &extra,
        },
    )?;
    tracing::info!(path = %path.display(), papers = papers.len(), "wrote venue file");
    Ok(path)
}

/// Replace the venue file at `path`.
pub(crate) fn rewrite_venue_json(path: &Path, data: &VenueFile) -> Result<(), StoreError> {
    write_to(
        path,
        &VenueFileRef {
            venue: &data.venue,
            year: &data.year,
            papers: &data.papers,
            extra: &data.extra,
        },
    )
}

fn write_to(path: &Path, data: &VenueFileRef<'_>) -> Result<(), StoreError> {
    gz::write(path, true, |w| {
        serde_json::to_writer_pretty(w, data)?;
        Ok(())
    })
}

/// Read a venue-year file.
pub fn read_venue_json(path: &Path) -> Result<VenueFile, StoreError> {
    let reader = gz::open(path)?;
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(key: &str, title: &str) -> CanonicalPaper {
        CanonicalPaper {
            bibtex_key: key.to_string(),
            title: title.to_string(),
            year: "2024".to_string(),
            venue: "icml".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_venue_file_name() {
        assert_eq!(venue_file_name("icml", "2024"), "icml-2024.json.gz");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let papers = vec![paper("a2024icml-x", "Réseaux"), paper("b2024icml-y", "Y")];
        let path = write_venue_json("icml", "2024", &papers, dir.path(), None).unwrap();
        assert_eq!(path, dir.path().join("icml-2024.json.gz"));

        let data = read_venue_json(&path).unwrap();
        assert_eq!(data.venue, "icml");
        assert_eq!(data.year, "2024");
        assert_eq!(data.papers, papers);
    }

    #[test]
    fn test_filename_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_venue_json("icml", "2024", &[], dir.path(), Some("icml-2024-workshops")).unwrap();
        assert_eq!(path, dir.path().join("icml-2024-workshops.json.gz"));
        assert!(read_venue_json(&path).unwrap().papers.is_empty());
    }

    #[test]
    fn test_output_is_pretty_utf8() {
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let path = write_venue_json("icml", "2024", &[paper("k", "Réseaux")], dir.path(), None).unwrap();
        let mut text = String::new();
        gz::open(&path).unwrap().read_to_string(&mut text).unwrap();
        assert!(text.contains("Réseaux"));
        assert!(text.starts_with("{\n  \"venue\": \"icml\""));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_venue_json(&dir.path().join("nope.json.gz")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
