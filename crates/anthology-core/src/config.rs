use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::CoreError;
use crate::venue::{DEFAULT_VENUE_ALIASES, DEFAULT_VENUE_TYPES, VenueRegistry, VenueType};

/// Lowercase connector words that belong with the family name.
pub const DEFAULT_PARTICLES: &[&str] = &[
    "van", "von", "de", "del", "della", "der", "den", "di", "du", "das", "dos", "do", "da", "le",
    "la", "el", "al", "bin", "ibn", "ten", "ter", "het",
];

/// Title words never used as the content word of a bibtex key.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "the", "on", "in", "at", "of", "for", "to", "and", "or", "with", "by", "from", "is",
    "are", "was", "were", "be", "been", "being", "do", "does", "did", "can", "could", "will",
    "would", "shall", "should", "may", "might", "must", "have", "has", "had", "not", "no", "nor",
    "but", "yet", "so", "if", "then", "than", "that", "this", "these", "those", "it", "its", "as",
    "into", "through", "about", "above", "below", "between", "under", "over", "after", "before",
    "during", "without", "toward", "towards", "how", "what", "when", "where", "which", "who",
    "whom", "why",
];

/// Residual BibTeX letter commands (without the backslash) and their unicode
/// letters. Order matters: earlier entries win when one command prefixes another.
pub const DEFAULT_ACCENT_COMMANDS: &[(&str, &str)] = &[
    ("L", "\u{141}"),
    ("l", "\u{142}"),
    ("O", "\u{d8}"),
    ("o", "\u{f8}"),
    ("AE", "\u{c6}"),
    ("ae", "\u{e6}"),
    ("AA", "\u{c5}"),
    ("aa", "\u{e5}"),
    ("SS", "\u{1e9e}"),
    ("ss", "\u{df}"),
    ("DH", "\u{d0}"),
    ("dh", "\u{f0}"),
    ("TH", "\u{de}"),
    ("th", "\u{fe}"),
    ("NG", "\u{14a}"),
    ("ng", "\u{14b}"),
    ("i", "\u{131}"),
    ("j", "\u{237}"),
];

/// Parenthesized annotations that are never part of a name (matched
/// case-insensitively, as regex fragments).
pub const DEFAULT_ANNOTATION_PATTERNS: &[&str] = &[
    "He/Him",
    "She/Her",
    "They/Them",
    "PhD",
    r"Ph\.?D\.?",
    r"Dr\.?",
    r"Jr\.?",
    r"Sr\.?",
    r"M\.?D\.?",
    r"M\.?Sc\.?",
];

/// Controls how a list of values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, item: T) {
        match self {
            ListOverride::Replace(v) | ListOverride::Extend(v) => v.push(item),
            ListOverride::Default => *self = ListOverride::Extend(vec![item]),
        }
    }
}

static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(|| {
    EngineConfigBuilder::new()
        .build()
        .expect("built-in engine tables compile")
});

/// Immutable static tables consumed by every engine component.
///
/// Built once (usually via [`EngineConfig::default`] or
/// [`EngineConfigBuilder`]) and passed by reference; nothing mutates it
/// afterwards, so one instance can be shared across worker threads.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    particles: HashSet<String>,
    stopwords: HashSet<String>,
    accent_commands: HashMap<String, String>,
    accent_command_re: Option<Regex>,
    annotation_re: Option<Regex>,
    venues: VenueRegistry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Exact (case-sensitive) particle check, used when splitting free text.
    pub fn is_particle(&self, token: &str) -> bool {
        self.particles.contains(token)
    }

    /// Case-insensitive particle check, used when repairing split names.
    pub fn is_particle_ignore_case(&self, token: &str) -> bool {
        self.particles.contains(&token.to_lowercase())
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn accent_replacement(&self, command: &str) -> Option<&str> {
        self.accent_commands.get(command).map(String::as_str)
    }

    /// `\Cmd` followed by a letter; group 1 is the command, group 2 the letter.
    pub(crate) fn accent_command_re(&self) -> Option<&Regex> {
        self.accent_command_re.as_ref()
    }

    pub(crate) fn annotation_re(&self) -> Option<&Regex> {
        self.annotation_re.as_ref()
    }

    pub fn venues(&self) -> &VenueRegistry {
        &self.venues
    }
}

/// Builder for [`EngineConfig`].
///
/// Every table starts from its built-in default and can be replaced or
/// extended. Annotation entries are regex fragments compiled in
/// [`build()`](Self::build), which fails fast on an invalid pattern.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    particles: ListOverride<String>,
    stopwords: ListOverride<String>,
    accent_commands: ListOverride<(String, String)>,
    annotation_patterns: ListOverride<String>,
    venue_types: ListOverride<(String, VenueType)>,
    venue_aliases: ListOverride<(String, String)>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Name particles ──

    pub fn set_particles(mut self, particles: Vec<String>) -> Self {
        self.particles = ListOverride::Replace(particles);
        self
    }

    pub fn add_particle(mut self, particle: impl Into<String>) -> Self {
        self.particles.push(particle.into());
        self
    }

    // ── Stopwords ──

    pub fn set_stopwords(mut self, stopwords: Vec<String>) -> Self {
        self.stopwords = ListOverride::Replace(stopwords);
        self
    }

    pub fn add_stopword(mut self, stopword: impl Into<String>) -> Self {
        self.stopwords.push(stopword.into());
        self
    }

    // ── Accent commands ──

    pub fn set_accent_commands(mut self, commands: Vec<(String, String)>) -> Self {
        self.accent_commands = ListOverride::Replace(commands);
        self
    }

    pub fn add_accent_command(
        mut self,
        command: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.accent_commands
            .push((command.into(), replacement.into()));
        self
    }

    // ── Annotations ──

    pub fn set_annotation_patterns(mut self, patterns: Vec<String>) -> Self {
        self.annotation_patterns = ListOverride::Replace(patterns);
        self
    }

    pub fn add_annotation_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.annotation_patterns.push(pattern.into());
        self
    }

    // ── Venues ──

    pub fn set_venues(mut self, venues: Vec<(String, VenueType)>) -> Self {
        self.venue_types = ListOverride::Replace(venues);
        self
    }

    /// Register or reclassify a venue slug. Later entries win.
    pub fn add_venue(mut self, slug: impl Into<String>, venue_type: VenueType) -> Self {
        self.venue_types.push((slug.into(), venue_type));
        self
    }

    pub fn set_venue_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.venue_aliases = ListOverride::Replace(aliases);
        self
    }

    pub fn add_venue_alias(mut self, short_name: impl Into<String>, slug: impl Into<String>) -> Self {
        self.venue_aliases.push((short_name.into(), slug.into()));
        self
    }

    /// Compile the tables into an [`EngineConfig`].
    pub fn build(self) -> Result<EngineConfig, CoreError> {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let particles = self
            .particles
            .resolve(&owned(DEFAULT_PARTICLES))
            .into_iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        let stopwords = self
            .stopwords
            .resolve(&owned(DEFAULT_STOPWORDS))
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let default_accents: Vec<(String, String)> = DEFAULT_ACCENT_COMMANDS
            .iter()
            .map(|(cmd, rep)| (cmd.to_string(), rep.to_string()))
            .collect();
        let accent_list: Vec<(String, String)> = self
            .accent_commands
            .resolve(&default_accents)
            .into_iter()
            .map(|(cmd, rep)| (cmd.trim_start_matches('\\').to_string(), rep))
            .filter(|(cmd, _)| !cmd.is_empty())
            .collect();
        let accent_command_re = compile_accent_commands(&accent_list)?;

        let annotation_re =
            compile_annotations(&self.annotation_patterns.resolve(&owned(DEFAULT_ANNOTATION_PATTERNS)))?;

        let default_types: Vec<(String, VenueType)> = DEFAULT_VENUE_TYPES
            .iter()
            .map(|(slug, ty)| (slug.to_string(), *ty))
            .collect();
        let default_aliases: Vec<(String, String)> = DEFAULT_VENUE_ALIASES
            .iter()
            .map(|(short, slug)| (short.to_string(), slug.to_string()))
            .collect();
        let venues = VenueRegistry::new(
            self.venue_types.resolve(&default_types),
            self.venue_aliases.resolve(&default_aliases),
        );

        Ok(EngineConfig {
            particles,
            stopwords,
            accent_commands: accent_list.into_iter().collect(),
            accent_command_re,
            annotation_re,
            venues,
        })
    }
}

fn compile_accent_commands(commands: &[(String, String)]) -> Result<Option<Regex>, regex::Error> {
    if commands.is_empty() {
        return Ok(None);
    }
    let mut seen = HashSet::new();
    let alternation = commands
        .iter()
        .filter(|(cmd, _)| seen.insert(cmd.as_str()))
        .map(|(cmd, _)| regex::escape(cmd))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\\({alternation})([A-Za-z\x{{80}}-\x{{FFFF}}])")).map(Some)
}

fn compile_annotations(patterns: &[String]) -> Result<Option<Regex>, regex::Error> {
    if patterns.is_empty() {
        return Ok(None);
    }
    // validate fragments one by one so a bad entry is reported on its own
    for pattern in patterns {
        Regex::new(pattern)?;
    }
    Regex::new(&format!(r"(?i)\s*\((?:{})\)\s*", patterns.join("|"))).map(Some)
}
