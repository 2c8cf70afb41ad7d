use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::authors::{AuthorNameParts, RawAuthor};
use crate::config::EngineConfig;
use crate::repair::resolve_author;
use crate::slug::slugify_author;
use crate::text::{decode_entities, repair_mojibake};
use crate::title::normalize_title_case;
use crate::venue::get_venue_type;
use crate::CoreError;

/// Fields every raw paper must carry. A missing one is an adapter bug.
pub const REQUIRED_FIELDS: [&str; 4] = ["bibtex_key", "title", "authors", "year"];

/// Optional string fields of the canonical schema, in output order.
pub const OPTIONAL_FIELDS: [&str; 14] = [
    "venue",
    "venue_name",
    "venue_type",
    "volume",
    "number",
    "pages",
    "abstract",
    "pdf_url",
    "venue_url",
    "doi",
    "openreview_url",
    "code_url",
    "source",
    "source_id",
];

/// An untyped paper record as produced by a source adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPaper(Map<String, Value>);

impl RawPaper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`, if present and a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RawPaper {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Repaired author with its URL slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAuthor {
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub slug: String,
}

impl ResolvedAuthor {
    pub fn from_parts(parts: AuthorNameParts) -> Self {
        let slug = slugify_author(&parts);
        Self {
            given: parts.given,
            family: parts.family,
            slug,
        }
    }

    pub fn parts(&self) -> AuthorNameParts {
        AuthorNameParts::new(self.given.clone(), self.family.clone())
    }
}

/// A paper in the canonical schema.
///
/// Optional fields are empty strings when unknown. Keys of the raw record
/// outside the fixed schema are carried in `extra` and serialized after the
/// fixed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalPaper {
    pub bibtex_key: String,
    pub title: String,
    pub authors: Vec<ResolvedAuthor>,
    pub year: String,
    pub venue: String,
    pub venue_name: String,
    pub venue_type: String,
    pub volume: String,
    pub number: String,
    pub pages: String,
    #[serde(rename = "abstract")]
    pub r#abstract: String,
    pub pdf_url: String,
    pub venue_url: String,
    pub doi: String,
    pub openreview_url: String,
    pub code_url: String,
    pub source: String,
    pub source_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanonicalPaper {
    fn optional_field_mut(&mut self, field: &str) -> Option<&mut String> {
        let slot = match field {
            "venue" => &mut self.venue,
            "venue_name" => &mut self.venue_name,
            "venue_type" => &mut self.venue_type,
            "volume" => &mut self.volume,
            "number" => &mut self.number,
            "pages" => &mut self.pages,
            "abstract" => &mut self.r#abstract,
            "pdf_url" => &mut self.pdf_url,
            "venue_url" => &mut self.venue_url,
            "doi" => &mut self.doi,
            "openreview_url" => &mut self.openreview_url,
            "code_url" => &mut self.code_url,
            "source" => &mut self.source,
            "source_id" => &mut self.source_id,
            _ => return None,
        };
        Some(slot)
    }

    /// Set an optional field only if it is currently empty.
    ///
    /// Enrichment may add data to a record but never overwrite it. Returns
    /// whether the field was written; required and unknown fields are never
    /// written.
    pub fn fill_if_empty(&mut self, field: &str, value: impl Into<String>) -> bool {
        let Some(slot) = self.optional_field_mut(field) else {
            return false;
        };
        if !slot.trim().is_empty() {
            return false;
        }
        let value = value.into();
        *slot = if field == "code_url" {
            clean_code_url(&value)
        } else {
            value
        };
        true
    }

    /// Reshape into raw input, e.g. to run the record through assembly again.
    pub fn to_raw(&self) -> RawPaper {
        let authors: Vec<Value> = self
            .authors
            .iter()
            .map(|a| {
                serde_json::json!({
                    "given": a.given,
                    "family": a.family,
                    "slug": a.slug,
                })
            })
            .collect();

        let mut raw = RawPaper::new()
            .with("bibtex_key", self.bibtex_key.as_str())
            .with("title", self.title.as_str())
            .with("authors", authors)
            .with("year", self.year.as_str());
        let optional = [
            ("venue", &self.venue),
            ("venue_name", &self.venue_name),
            ("venue_type", &self.venue_type),
            ("volume", &self.volume),
            ("number", &self.number),
            ("pages", &self.pages),
            ("abstract", &self.r#abstract),
            ("pdf_url", &self.pdf_url),
            ("venue_url", &self.venue_url),
            ("doi", &self.doi),
            ("openreview_url", &self.openreview_url),
            ("code_url", &self.code_url),
            ("source", &self.source),
            ("source_id", &self.source_id),
        ];
        for (key, value) in optional {
            raw.insert(key, value.as_str());
        }
        for (key, value) in &self.extra {
            raw.insert(key.as_str(), value.clone());
        }
        raw
    }
}

impl From<&CanonicalPaper> for RawPaper {
    fn from(paper: &CanonicalPaper) -> Self {
        paper.to_raw()
    }
}

/// Scalar field as text: strings verbatim, numbers rendered, null as empty.
fn text_field(raw: &RawPaper, field: &str) -> Result<String, CoreError> {
    match raw.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(CoreError::InvalidField {
            field: field.to_string(),
            expected: "a string or number",
        }),
    }
}

fn raw_authors(raw: &RawPaper) -> Result<Vec<RawAuthor>, CoreError> {
    let invalid = || CoreError::InvalidField {
        field: "authors".to_string(),
        expected: "a list of {given, family} objects or name strings",
    };
    let Some(Value::Array(items)) = raw.get("authors") else {
        return Err(invalid());
    };
    items
        .iter()
        .map(|item| RawAuthor::deserialize(item).map_err(|_| invalid()))
        .collect()
}

/// Normalize a raw paper into the canonical schema.
///
/// Fails with [`CoreError::MissingRequiredField`] when any of
/// `bibtex_key`, `title`, `authors`, `year` is absent, and with
/// [`CoreError::InvalidField`] when a field has the wrong JSON shape.
pub fn normalize_paper(raw: &RawPaper, config: &EngineConfig) -> Result<CanonicalPaper, CoreError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !raw.contains_key(f))
        .map(|f| f.to_string())
        .collect();
    if !missing.is_empty() {
        let mut present: Vec<String> = raw.keys().cloned().collect();
        present.sort();
        return Err(CoreError::MissingRequiredField { missing, present });
    }

    let title = normalize_title_case(&repair_mojibake(&decode_entities(&text_field(raw, "title")?)));
    let authors = raw_authors(raw)?
        .iter()
        .filter_map(|a| resolve_author(a, config))
        .map(ResolvedAuthor::from_parts)
        .collect();

    let venue = text_field(raw, "venue")?;
    let venue_type = match text_field(raw, "venue_type")? {
        explicit if !explicit.is_empty() => explicit,
        _ => get_venue_type(&venue, config).to_string(),
    };

    let extra = raw
        .0
        .iter()
        .filter(|(k, _)| !REQUIRED_FIELDS.contains(&k.as_str()) && !OPTIONAL_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(CanonicalPaper {
        bibtex_key: text_field(raw, "bibtex_key")?,
        title,
        authors,
        year: text_field(raw, "year")?,
        venue,
        venue_name: text_field(raw, "venue_name")?,
        venue_type,
        volume: text_field(raw, "volume")?,
        number: text_field(raw, "number")?,
        pages: text_field(raw, "pages")?,
        r#abstract: repair_mojibake(&text_field(raw, "abstract")?),
        pdf_url: text_field(raw, "pdf_url")?,
        venue_url: text_field(raw, "venue_url")?,
        doi: text_field(raw, "doi")?,
        openreview_url: text_field(raw, "openreview_url")?,
        code_url: clean_code_url(&text_field(raw, "code_url")?),
        source: text_field(raw, "source")?,
        source_id: text_field(raw, "source_id")?,
        extra,
    })
}

/// Reduce a `code_url` value to one plain URL.
///
/// Some sources deliver markdown badge markup or free text instead of a
/// link. Markdown link targets are preferred (GitHub or GitLab first), then
/// the first bare URL; anything without a URL becomes empty.
pub fn clean_code_url(raw: &str) -> String {
    static MD_LINK_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\[(?:[^\]]*\])?[^\]]*\]\((https?://[^)]+)\)").unwrap());
    static BARE_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if (raw.starts_with("https://") || raw.starts_with("http://"))
        && !raw.contains(' ')
        && !raw.contains(';')
    {
        return raw.to_string();
    }

    let links: Vec<&str> = MD_LINK_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    if let Some(first) = links.first() {
        return links
            .iter()
            .find(|url| url.contains("github.com") || url.contains("gitlab.com"))
            .unwrap_or(first)
            .to_string();
    }

    BARE_URL_RE
        .find(raw)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')']).to_string())
        .unwrap_or_default()
}
