use once_cell::sync::Lazy;
use regex::Regex;

use crate::authors::AuthorNameParts;
use crate::text::{has_cjk, normalize_text, romanize_cjk};

static NON_SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Convert text to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    // transliteration may reintroduce capitals, so fold case on both sides
    let folded = normalize_text(&text.to_lowercase()).to_lowercase();
    NON_SLUG_RE
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Author slug in "family given" order, e.g. `"van-rossum-guido"`.
///
/// CJK name parts are romanized as one token so syllables stay joined
/// (`王 良华` → `"wang-lianghua"`). Returns `"unknown"` when nothing is left.
pub fn slugify_author(author: &AuthorNameParts) -> String {
    let romanize = |part: &str| {
        let part = part.trim();
        if has_cjk(part) {
            romanize_cjk(part)
        } else {
            part.to_string()
        }
    };
    let text = format!("{} {}", romanize(&author.family), romanize(&author.given));
    let slug = slugify(text.trim());
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}
