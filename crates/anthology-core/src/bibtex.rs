use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::text::{decode_entities, normalize_text, repair_mojibake, strip_latex};

/// Alphanumeric runs with internal hyphens, so `GPT-4` and `R-CNN` stay whole.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9]+(?:-[a-zA-Z0-9]+)*").unwrap());

const FALLBACK_CONTENT_WORD: &str = "paper";

fn has_letter(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_lowercase())
}

/// First meaningful word of a title, lowercased and stripped to `[a-z0-9]`.
///
/// Picks the first token of two or more characters that is not a stopword and
/// contains a letter. Falls back to the first token with any letter, then to
/// `"paper"`.
pub fn first_content_word(title: &str, config: &EngineConfig) -> String {
    let cleaned = strip_latex(&normalize_text(&repair_mojibake(&decode_entities(title))));
    let words: Vec<String> = TOKEN_RE
        .find_iter(&cleaned)
        .map(|m| {
            m.as_str()
                .to_lowercase()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect()
        })
        .collect();

    words
        .iter()
        .find(|w| w.len() >= 2 && !config.is_stopword(w.as_str()) && has_letter(w.as_str()))
        .or_else(|| words.iter().find(|w| has_letter(w.as_str())))
        .cloned()
        .unwrap_or_else(|| FALLBACK_CONTENT_WORD.to_string())
}

/// Build a key like `liu2025icml-reward`.
///
/// The family name is ASCII-folded and reduced to lowercase letters; the
/// venue slug is lowercased.
pub fn make_bibtex_key(
    first_author_family: &str,
    year: &str,
    venue: &str,
    title: &str,
    config: &EngineConfig,
) -> String {
    let lastname: String = normalize_text(first_author_family)
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect();
    format!(
        "{lastname}{year}{}-{}",
        venue.to_lowercase(),
        first_content_word(title, config)
    )
}

/// Suffix for the `n`th duplicate (1-based): `a`..`z`, then `aa`, `ab`, ...
fn collision_suffix(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Make every key in a batch unique, preserving order.
///
/// The first occurrence of a key is kept; later duplicates get `-a`, `-b`,
/// ... in the order they appear. A suffixed candidate that is already taken
/// by another key in the batch is skipped.
pub fn resolve_bibtex_collisions<S: AsRef<str>>(keys: &[S]) -> Vec<String> {
    let mut duplicates: HashMap<&str, usize> = HashMap::new();
    let mut emitted: HashSet<String> = HashSet::with_capacity(keys.len());
    let mut resolved = Vec::with_capacity(keys.len());

    for key in keys {
        let key = key.as_ref();
        if emitted.insert(key.to_string()) {
            duplicates.entry(key).or_insert(0);
            resolved.push(key.to_string());
            continue;
        }
        let count = duplicates.entry(key).or_insert(0);
        let candidate = loop {
            *count += 1;
            let candidate = format!("{key}-{}", collision_suffix(*count));
            if !emitted.contains(&candidate) {
                break candidate;
            }
        };
        tracing::debug!(key, resolved = %candidate, "bibtex key collision");
        emitted.insert(candidate.clone());
        resolved.push(candidate);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(title: &str) -> String {
        first_content_word(title, &EngineConfig::default())
    }

    // =========================================================================
    // first_content_word
    // =========================================================================

    #[test]
    fn test_first_content_word_skips_stopwords() {
        assert_eq!(word("On the Difficulty of Training"), "difficulty");
        assert_eq!(word("Towards a Theory of Everything"), "theory");
    }

    #[test]
    fn test_first_content_word_hyphenated_tokens() {
        assert_eq!(word("GPT-4 Technical Report"), "gpt4");
        assert_eq!(word("R-CNN for detection"), "rcnn");
    }

    #[test]
    fn test_first_content_word_latex() {
        assert_eq!(word(r"$\texttt{C2-DPO}$: a new method"), "c2dpo");
    }

    #[test]
    fn test_first_content_word_entities() {
        assert_eq!(word("&quot;Why Should I Trust You?&quot;"), "trust");
    }

    #[test]
    fn test_first_content_word_accents() {
        assert_eq!(word("Réseaux de neurones"), "reseaux");
    }

    #[test]
    fn test_first_content_word_fallback_to_letter_token() {
        // every token is a stopword or too short
        assert_eq!(word("A Is The"), "a");
    }

    #[test]
    fn test_first_content_word_numbers_only() {
        assert_eq!(word("2024"), "paper");
        assert_eq!(word(""), "paper");
        assert_eq!(word("???"), "paper");
    }

    #[test]
    fn test_first_content_word_custom_stopword() {
        let config = EngineConfig::builder().add_stopword("learning").build().unwrap();
        assert_eq!(first_content_word("Learning Rates", &config), "rates");
    }

    // =========================================================================
    // make_bibtex_key
    // =========================================================================

    #[test]
    fn test_make_bibtex_key() {
        let config = EngineConfig::default();
        assert_eq!(
            make_bibtex_key("Liu", "2025", "icml", "Reward Models for RLHF", &config),
            "liu2025icml-reward"
        );
    }

    #[test]
    fn test_make_bibtex_key_folds_family() {
        let config = EngineConfig::default();
        assert_eq!(
            make_bibtex_key("van der Müller-Lüdenscheidt", "1999", "NeurIPS", "Bandits", &config),
            "vandermullerludenscheidt1999neurips-bandits"
        );
    }

    #[test]
    fn test_make_bibtex_key_empty_family() {
        let config = EngineConfig::default();
        assert_eq!(make_bibtex_key("", "2020", "colt", "", &config), "2020colt-paper");
    }

    // =========================================================================
    // Collisions
    // =========================================================================

    #[test]
    fn test_collisions_basic() {
        assert_eq!(
            resolve_bibtex_collisions(&["a", "a", "b", "a"]),
            vec!["a", "a-a", "b", "a-b"]
        );
    }

    #[test]
    fn test_collisions_no_duplicates() {
        assert_eq!(resolve_bibtex_collisions(&["x", "y"]), vec!["x", "y"]);
        assert!(resolve_bibtex_collisions::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_collisions_widen_after_z() {
        let keys = vec!["k"; 29];
        let resolved = resolve_bibtex_collisions(&keys);
        assert_eq!(resolved[1], "k-a");
        assert_eq!(resolved[26], "k-z");
        assert_eq!(resolved[27], "k-aa");
        assert_eq!(resolved[28], "k-ab");
    }

    #[test]
    fn test_collisions_skip_taken_suffix() {
        assert_eq!(
            resolve_bibtex_collisions(&["k-a", "k", "k"]),
            vec!["k-a", "k", "k-b"]
        );
    }

    #[test]
    fn test_collisions_all_unique() {
        let keys = ["k", "k-a", "k", "k-a", "k"];
        let resolved = resolve_bibtex_collisions(&keys);
        let unique: HashSet<_> = resolved.iter().collect();
        assert_eq!(unique.len(), keys.len());
        assert_eq!(resolved[0], "k");
        assert_eq!(resolved[1], "k-a");
    }

    #[test]
    fn test_collision_suffix() {
        assert_eq!(collision_suffix(1), "a");
        assert_eq!(collision_suffix(26), "z");
        assert_eq!(collision_suffix(27), "aa");
        assert_eq!(collision_suffix(52), "az");
        assert_eq!(collision_suffix(53), "ba");
    }
}
