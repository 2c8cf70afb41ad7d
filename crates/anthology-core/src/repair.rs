//! Author-name repair stages.
//!
//! Upstream sources split names inconsistently: initials land in the family
//! field, particles stay in the given name, hyphenated surnames are cut in
//! half, and some fields hold nothing but punctuation. Each stage below
//! corrects one of these patterns. Stages are total and idempotent and run
//! in the fixed order of [`REPAIR_STAGES`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::authors::{AuthorNameParts, RawAuthor, parse_author_name};
use crate::config::EngineConfig;
use crate::text::{decode_entities, repair_mojibake};

static SINGLE_LETTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]\.?$").unwrap());

/// Parenthesized nicknames and former names, e.g. `"Jeong (Kate) Lee"`.
static PAREN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([A-Za-z\x{80}-\x{FFFF}-]+\)\s*").unwrap());

/// Leading run of initials in a family field, e.g. `"A. Osborne"`.
static LEADING_INITIALS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((?:[A-Za-z]\.?\s+)+)(\S.*)$").unwrap());

/// One step of the author-name repair pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairStage {
    CleanRawName,
    MisplacedInitial,
    MisplacedParticle,
    SingleLetterFamily,
    LeadingHyphenFamily,
    PunctuationOnlyFields,
}

/// All stages, in application order.
pub const REPAIR_STAGES: [RepairStage; 6] = [
    RepairStage::CleanRawName,
    RepairStage::MisplacedInitial,
    RepairStage::MisplacedParticle,
    RepairStage::SingleLetterFamily,
    RepairStage::LeadingHyphenFamily,
    RepairStage::PunctuationOnlyFields,
];

impl RepairStage {
    pub fn name(&self) -> &'static str {
        match self {
            RepairStage::CleanRawName => "clean_raw_name",
            RepairStage::MisplacedInitial => "fix_misplaced_initial",
            RepairStage::MisplacedParticle => "fix_misplaced_particle",
            RepairStage::SingleLetterFamily => "fix_single_letter_family",
            RepairStage::LeadingHyphenFamily => "fix_leading_hyphen_family",
            RepairStage::PunctuationOnlyFields => "fix_punctuation_only_fields",
        }
    }

    pub fn apply(self, author: AuthorNameParts, config: &EngineConfig) -> AuthorNameParts {
        match self {
            RepairStage::CleanRawName => AuthorNameParts {
                given: clean_raw_name(&author.given, config),
                family: clean_raw_name(&author.family, config),
            },
            RepairStage::MisplacedInitial => fix_misplaced_initial(author),
            RepairStage::MisplacedParticle => fix_misplaced_particle(author, config),
            RepairStage::SingleLetterFamily => fix_single_letter_family(author),
            RepairStage::LeadingHyphenFamily => fix_leading_hyphen_family(author),
            RepairStage::PunctuationOnlyFields => fix_punctuation_only_fields(author, config),
        }
    }
}

/// Passes over the stage chain before giving up on a settled result.
const MAX_REPAIR_PASSES: usize = 4;

/// Run every stage over `author`, in order, until the name settles.
///
/// A re-split in the last stage can expose a pattern an earlier stage
/// handles (`"Luc Van Gool"` re-split leaves `Van` in the given name), so the
/// chain repeats while it still changes something.
pub fn repair_author(author: AuthorNameParts, config: &EngineConfig) -> AuthorNameParts {
    let mut current = author;
    for _ in 0..MAX_REPAIR_PASSES {
        let next = run_stages(current.clone(), config);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn run_stages(author: AuthorNameParts, config: &EngineConfig) -> AuthorNameParts {
    REPAIR_STAGES.iter().fold(author, |current, stage| {
        let repaired = stage.apply(current.clone(), config);
        if repaired != current {
            tracing::trace!(
                stage = stage.name(),
                before = %current.full_name(),
                after = %repaired.full_name(),
                "author name repaired"
            );
        }
        repaired
    })
}

/// Resolve one raw author into repaired name parts.
///
/// Bare strings are cleaned and split first; pre-split pairs have each field
/// mojibake-repaired. Returns `None` when nothing usable survives.
pub fn resolve_author(raw: &RawAuthor, config: &EngineConfig) -> Option<AuthorNameParts> {
    let parts = match raw {
        RawAuthor::Parts { given, family } => AuthorNameParts {
            given: repair_mojibake(given.as_deref().unwrap_or_default()),
            family: repair_mojibake(family.as_deref().unwrap_or_default()),
        },
        RawAuthor::Name(name) => {
            let cleaned = clean_raw_name(&repair_mojibake(name), config);
            parse_author_name(&cleaned, config)
        }
    };
    let repaired = repair_author(parts, config);
    if repaired.is_empty() {
        tracing::debug!(?raw, "dropping author with empty name after repair");
        return None;
    }
    Some(repaired)
}

/// Clean a raw name string before it is split or repaired.
///
/// Decodes entities, drops `*` markers, removes degree and pronoun
/// annotations as well as parenthesized nicknames, and replaces residual
/// accent commands such as `\Lącki` with their letter.
pub fn clean_raw_name(name: &str, config: &EngineConfig) -> String {
    let mut name = decode_entities(name).replace('*', "");
    if let Some(re) = config.annotation_re() {
        name = re.replace_all(&name, " ").into_owned();
    }
    name = PAREN_NAME_RE.replace_all(&name, " ").into_owned();
    if let Some(re) = config.accent_command_re() {
        name = re
            .replace_all(&name, |caps: &regex::Captures| {
                match config.accent_replacement(&caps[1]) {
                    Some(letter) => format!("{letter}{}", &caps[2]),
                    None => caps[0].to_string(),
                }
            })
            .into_owned();
    }
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `{given: "David", family: "A Clifton"}` → `{given: "David A", family: "Clifton"}`.
///
/// The whole leading run of initials moves, so a second pass finds nothing.
pub fn fix_misplaced_initial(author: AuthorNameParts) -> AuthorNameParts {
    let Some(caps) = LEADING_INITIALS_RE.captures(&author.family) else {
        return author;
    };
    let initials = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
    let given = if author.given.is_empty() {
        initials
    } else {
        format!("{} {initials}", author.given)
    };
    AuthorNameParts {
        given,
        family: caps[2].to_string(),
    }
}

/// `{given: "Luc Van", family: "Gool"}` → `{given: "Luc", family: "Van Gool"}`.
///
/// Particles match case-insensitively here; the first given token is never
/// moved.
pub fn fix_misplaced_particle(author: AuthorNameParts, config: &EngineConfig) -> AuthorNameParts {
    if author.given.is_empty() || author.family.is_empty() {
        return author;
    }
    let words: Vec<&str> = author.given.split_whitespace().collect();
    if words.len() < 2 {
        return author;
    }

    let mut particle_start = None;
    for i in (1..words.len()).rev() {
        if config.is_particle_ignore_case(words[i]) {
            particle_start = Some(i);
        } else {
            break;
        }
    }
    let Some(start) = particle_start else {
        return author;
    };

    AuthorNameParts {
        given: words[..start].join(" "),
        family: format!("{} {}", words[start..].join(" "), author.family),
    }
}

/// `{given: "Butakov I.", family: "D."}` → `{given: "I. D.", family: "Butakov"}`.
///
/// Only fires when the given name carries initials, so a genuine one-letter
/// surname (`Weinan E`) is left alone.
pub fn fix_single_letter_family(author: AuthorNameParts) -> AuthorNameParts {
    if author.given.is_empty() || !SINGLE_LETTER_RE.is_match(&author.family) {
        return author;
    }
    let (initials, names): (Vec<&str>, Vec<&str>) = author
        .given
        .split_whitespace()
        .partition(|token| SINGLE_LETTER_RE.is_match(token));
    if initials.is_empty() || names.is_empty() {
        return author;
    }

    let mut given = initials;
    given.push(&author.family);
    AuthorNameParts {
        given: given.join(" "),
        family: names.join(" "),
    }
}

/// `{given: "Saeed Sharifi", family: "-Malvajerdi"}` → `{given: "Saeed", family: "Sharifi-Malvajerdi"}`.
pub fn fix_leading_hyphen_family(author: AuthorNameParts) -> AuthorNameParts {
    if !author.family.starts_with('-') {
        return author;
    }
    let mut tokens: Vec<&str> = author.given.split_whitespace().collect();
    let Some(last) = tokens.pop() else {
        return author;
    };
    AuthorNameParts {
        family: format!("{last}{}", author.family),
        given: tokens.join(" "),
    }
}

fn is_junk(field: &str) -> bool {
    if field.is_empty() {
        return false;
    }
    field.contains('@')
        || field.starts_with('{')
        || field.ends_with('}')
        || !field.chars().any(char::is_alphabetic)
}

/// Clear fields holding punctuation, emails or stray braces.
///
/// When the family name ends up empty but the given name still looks like a
/// name, the given name is re-split: `{given: "Lihua Xie", family: "()"}`
/// becomes `{given: "Lihua", family: "Xie"}`.
pub fn fix_punctuation_only_fields(
    author: AuthorNameParts,
    config: &EngineConfig,
) -> AuthorNameParts {
    let given = if is_junk(&author.given) {
        String::new()
    } else {
        author.given
    };
    let family = author.family;

    if family.is_empty() || is_junk(&family) {
        if given.chars().any(char::is_alphabetic) {
            return parse_author_name(&given, config);
        }
        if is_junk(&family) {
            return AuthorNameParts::default();
        }
    }
    AuthorNameParts { given, family }
}
