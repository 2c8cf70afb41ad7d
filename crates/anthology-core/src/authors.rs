use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// A name split into given and family parts. Either part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorNameParts {
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub family: String,
}

impl AuthorNameParts {
    pub fn new(given: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            given: given.into(),
            family: family.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_empty() && self.family.is_empty()
    }

    /// Display form, given name first.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given, self.family).trim().to_string()
    }
}

/// An author as delivered by an adapter: already split, or a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAuthor {
    Parts {
        #[serde(default)]
        given: Option<String>,
        #[serde(default)]
        family: Option<String>,
    },
    Name(String),
}

impl From<AuthorNameParts> for RawAuthor {
    fn from(parts: AuthorNameParts) -> Self {
        RawAuthor::Parts {
            given: Some(parts.given),
            family: Some(parts.family),
        }
    }
}

impl From<&str> for RawAuthor {
    fn from(name: &str) -> Self {
        RawAuthor::Name(name.to_string())
    }
}

/// Split a full name string into given/family components.
///
/// - `"First Last"` → given `"First"`, family `"Last"`
/// - `"First Middle Last"` → given `"First Middle"`, family `"Last"`
/// - `"Last"` → given `""`, family `"Last"`
/// - `"First van der Last"` → given `"First"`, family `"van der Last"`
///
/// A particle only starts the family name when it is written in lowercase
/// and sits strictly between the first and last token.
pub fn parse_author_name(name: &str, config: &EngineConfig) -> AuthorNameParts {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.len() {
        0 => AuthorNameParts::default(),
        1 => AuthorNameParts::new("", tokens[0]),
        n => {
            let family_start = (1..n - 1)
                .find(|&i| config.is_particle(tokens[i]))
                .unwrap_or(n - 1);
            AuthorNameParts::new(
                tokens[..family_start].join(" "),
                tokens[family_start..].join(" "),
            )
        }
    }
}

/// Parse a BibTeX `author` field into name parts.
///
/// Names are separated by `and`; each is either `"Family, Given"` or free
/// text handled by [`parse_author_name`].
pub fn parse_bibtex_authors(field: &str, config: &EngineConfig) -> Vec<AuthorNameParts> {
    static AND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+and\s+").unwrap());

    AND_RE
        .split(field)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| match name.split_once(',') {
            Some((family, given)) => AuthorNameParts::new(given.trim(), family.trim()),
            None => parse_author_name(name, config),
        })
        .collect()
}
