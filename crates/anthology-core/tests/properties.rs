//! Property-based tests for the engine's universal guarantees.

use std::collections::HashSet;

use anthology_core::{
    AuthorNameParts, EngineConfig, RawPaper, normalize_paper, repair_mojibake,
    resolve_bibtex_collisions, slugify, slugify_author,
};
use proptest::prelude::*;
use serde_json::json;

/// Arbitrary text with every mojibake signature character removed.
fn signature_free_text() -> impl Strategy<Value = String> {
    any::<String>().prop_map(|s| {
        s.chars()
            .filter(|c| !('\u{c2}'..='\u{df}').contains(c))
            .collect()
    })
}

/// Name fragments seen in upstream data, clean and malformed.
fn given_name() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop::sample::select(vec![
            "Luc", "Van", "van", "der", "A.", "B", "Saeed", "Sharifi", "Lihua", "Xie", "José",
            "*", "(PhD)", "Müller", "Ren\u{c3}\u{a9}",
        ]),
        0..4,
    )
    .prop_map(|parts| parts.join(" "))
}

fn family_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Gool", "-Malvajerdi", "()", "D.", "A. Osborne", "E", "Rossum", "", "{namdar", "de la Hoya",
        "王",
    ])
    .prop_map(str::to_string)
}

fn raw_paper() -> impl Strategy<Value = RawPaper> {
    (
        "[A-Za-z ]{0,40}",
        proptest::collection::vec((given_name(), family_name()), 0..4),
        proptest::option::of("[a-z]{2,6}"),
    )
        .prop_map(|(title, authors, venue)| {
            let authors: Vec<_> = authors
                .into_iter()
                .map(|(given, family)| json!({"given": given, "family": family}))
                .collect();
            let value = json!({
                "bibtex_key": "key",
                "title": title,
                "authors": authors,
                "year": "2024",
                "venue": venue.unwrap_or_default(),
            });
            serde_json::from_value(value).expect("object")
        })
}

proptest! {
    /// Text without a signature character is never touched.
    #[test]
    fn mojibake_repair_is_identity_without_signature(text in signature_free_text()) {
        prop_assert_eq!(repair_mojibake(&text), text);
    }

    /// Slugs only use `[a-z0-9-]`, never start or end with `-`, never repeat it.
    #[test]
    fn slugify_output_charset(text in any::<String>()) {
        let slug = slugify(&text);
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
        prop_assert_eq!(slugify(&text), slug);
    }

    /// Author slugs are never empty and depend only on the name.
    #[test]
    fn slugify_author_never_empty(given in any::<String>(), family in any::<String>()) {
        let author = AuthorNameParts::new(given, family);
        let slug = slugify_author(&author);
        prop_assert!(!slug.is_empty());
        prop_assert_eq!(slugify_author(&author.clone()), slug);
    }

    /// Collision resolution keeps length and order and makes keys unique.
    #[test]
    fn collision_resolution_unique(keys in proptest::collection::vec("[ab]{1,2}", 0..80)) {
        let resolved = resolve_bibtex_collisions(&keys);
        prop_assert_eq!(resolved.len(), keys.len());

        let unique: HashSet<&String> = resolved.iter().collect();
        prop_assert_eq!(unique.len(), resolved.len());

        // generated keys never contain `-`, so no suffixed key can shadow one
        let mut seen = HashSet::new();
        for (key, out) in keys.iter().zip(&resolved) {
            if seen.insert(key) {
                prop_assert_eq!(out, key);
            } else {
                let prefix = format!("{key}-");
                prop_assert!(out.starts_with(&prefix));
            }
        }
    }

    /// Normalizing a canonical record again changes nothing.
    #[test]
    fn normalize_is_idempotent(raw in raw_paper()) {
        let config = EngineConfig::default();
        let once = normalize_paper(&raw, &config).expect("valid record");
        let twice = normalize_paper(&once.to_raw(), &config).expect("valid record");
        prop_assert_eq!(once, twice);
    }
}
