use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Upper bound on `\command{...}` unwrap passes in [`strip_latex`].
const MAX_LATEX_UNWRAP_PASSES: usize = 32;

/// Characters U+00C2..=U+00DF are the Latin-1 reading of UTF-8 lead bytes
/// for two-byte sequences, so their presence signals double-encoded text.
fn is_mojibake_signature(c: char) -> bool {
    ('\u{c2}'..='\u{df}').contains(&c)
}

/// Repair UTF-8 text that was decoded as Latin-1 and re-encoded.
///
/// `"Ã©"` becomes `"é"` and `"Å\u{84}"` becomes `"ń"`. Text without a
/// signature character, or text that does not survive the Latin-1 round
/// trip, is returned unchanged.
pub fn repair_mojibake(text: &str) -> String {
    if !text.chars().any(is_mojibake_signature) {
        return text.to_string();
    }
    latin1_round_trip(text).unwrap_or_else(|| text.to_string())
}

fn latin1_round_trip(text: &str) -> Option<String> {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

/// Named references browsers also accept without the trailing semicolon.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Windows-1252 readings of the C1 range, as HTML5 decodes `&#128;`..`&#159;`.
/// The five unassigned bytes keep their code point.
const CP1252_C1: [char; 32] = [
    '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}', '\u{17d}', '\u{8f}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}', '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
];

/// Decode HTML named and numeric character references.
///
/// Follows the HTML5 rules: named references use the HTML5 table, the
/// legacy Latin-1 names also decode without a semicolon (`&amp`, `&eacute`),
/// and numeric references in the C1 range are read as Windows-1252
/// (`&#150;` is an en dash). Out-of-range numbers become U+FFFD. Unknown
/// names are left exactly as written.
pub fn decode_entities(text: &str) -> String {
    static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"&(?:#([0-9]+);?|#[xX]([0-9a-fA-F]+);?|([A-Za-z][A-Za-z0-9]{0,31})(;?))")
            .unwrap()
    });

    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            if let Some(digits) = caps.get(1) {
                return decode_char_ref(digits.as_str().parse().unwrap_or(u32::MAX));
            }
            if let Some(hex) = caps.get(2) {
                return decode_char_ref(u32::from_str_radix(hex.as_str(), 16).unwrap_or(u32::MAX));
            }
            let name = &caps[3];
            let decoded = if caps[4].is_empty() {
                decode_legacy_name(name)
            } else {
                quick_xml::escape::resolve_html5_entity(name).map(str::to_string)
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_char_ref(code: u32) -> String {
    let decoded = match code {
        0 => Some('\u{fffd}'),
        0x80..=0x9f => Some(CP1252_C1[(code - 0x80) as usize]),
        0xd800..=0xdfff => Some('\u{fffd}'),
        // noncharacters and the remaining controls decode to nothing
        0x01..=0x08 | 0x0b | 0x0e..=0x1f | 0x7f | 0xfdd0..=0xfdef => None,
        c if c & 0xfffe == 0xfffe && c <= 0x10ffff => None,
        c => Some(char::from_u32(c).unwrap_or('\u{fffd}')),
    };
    decoded.map(String::from).unwrap_or_default()
}

/// `&amp` and `&copy2020`: the longest legacy name prefixing `name`.
fn decode_legacy_name(name: &str) -> Option<String> {
    (2..=name.len()).rev().find_map(|end| {
        let prefix = &name[..end];
        if !LEGACY_ENTITIES.contains(&prefix) {
            return None;
        }
        quick_xml::escape::resolve_html5_entity(prefix).map(|d| format!("{d}{}", &name[end..]))
    })
}

/// Remove HTML tags and decode entities.
pub fn strip_html(text: &str) -> String {
    static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
    let without_tags = TAG_RE.replace_all(text, "");
    decode_entities(&without_tags).trim().to_string()
}

/// Fold unicode text to ASCII for key generation.
///
/// NFKD decomposition drops accents from Latin letters. Scripts with no
/// decomposition (CJK, Cyrillic, Greek) would fold to nothing, so in that
/// case the whole input is transliterated instead.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkd().filter(char::is_ascii).collect();
    if folded.trim().is_empty() && !text.trim().is_empty() {
        return deunicode::deunicode(text);
    }
    folded
}

/// Whether `text` contains a CJK Unified Ideograph.
pub fn has_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// Romanize a CJK name part as one lowercase token: `"良华"` → `"lianghua"`.
pub fn romanize_cjk(text: &str) -> String {
    deunicode::deunicode(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Remove LaTeX markup, keeping the content of braced arguments.
///
/// `\textbf{\emph{x}}` unwraps one level per pass until nothing changes, then
/// bare commands and stray `$`, `{`, `}` are deleted.
pub fn strip_latex(text: &str) -> String {
    static WRAPPED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\\[a-zA-Z]+\{([^}]*)\}").unwrap());
    static BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+").unwrap());
    static DELIM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[${}]").unwrap());

    let mut current = text.to_string();
    for _ in 0..MAX_LATEX_UNWRAP_PASSES {
        let next = WRAPPED_RE.replace_all(&current, "$1").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    let current = BARE_RE.replace_all(&current, "");
    DELIM_RE.replace_all(&current, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Mojibake
    // =========================================================================

    #[test]
    fn test_repair_mojibake_acute() {
        assert_eq!(repair_mojibake("Ren\u{c3}\u{a9}"), "René");
    }

    #[test]
    fn test_repair_mojibake_polish() {
        // "ń" is C5 84 in UTF-8
        assert_eq!(repair_mojibake("Pozna\u{c5}\u{84}"), "Poznań");
    }

    #[test]
    fn test_repair_mojibake_clean_text_unchanged() {
        assert_eq!(repair_mojibake("Plain ASCII title"), "Plain ASCII title");
        assert_eq!(repair_mojibake("Müller"), "Müller");
    }

    #[test]
    fn test_repair_mojibake_legit_latin1_unchanged() {
        // "Ä" (U+00C4) is a signature char, but "Äb" is not valid UTF-8 bytes
        assert_eq!(repair_mojibake("Äbc"), "Äbc");
    }

    #[test]
    fn test_repair_mojibake_non_latin1_char_unchanged() {
        // contains a signature char and a char outside Latin-1
        assert_eq!(repair_mojibake("Ã© 良"), "Ã© 良");
    }

    #[test]
    fn test_repair_mojibake_empty() {
        assert_eq!(repair_mojibake(""), "");
    }

    // =========================================================================
    // Entities and HTML
    // =========================================================================

    #[test]
    fn test_decode_entities_numeric() {
        assert_eq!(decode_entities("&#352;ingliar"), "\u{160}ingliar");
        assert_eq!(decode_entities("&#x160;ingliar"), "\u{160}ingliar");
    }

    #[test]
    fn test_decode_entities_named() {
        assert_eq!(decode_entities("Foo &amp; Bar"), "Foo & Bar");
        assert_eq!(decode_entities("&quot;Deep&quot;"), "\"Deep\"");
        assert_eq!(decode_entities("Andr&eacute;"), "André");
    }

    #[test]
    fn test_decode_entities_unknown_left_alone() {
        assert_eq!(decode_entities("a &notarealentity; b"), "a &notarealentity; b");
        assert_eq!(decode_entities("AT&T"), "AT&T");
    }

    #[test]
    fn test_decode_entities_without_semicolon() {
        assert_eq!(decode_entities("Tom &amp Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("Caf&eacute"), "Café");
        assert_eq!(decode_entities("&copy2020"), "©2020");
        assert_eq!(decode_entities("&#8211 x"), "\u{2013} x");
    }

    #[test]
    fn test_decode_entities_cp1252_range() {
        assert_eq!(decode_entities("1990&#150;2000"), "1990\u{2013}2000");
        assert_eq!(decode_entities("Don&#146;t"), "Don\u{2019}t");
        assert_eq!(decode_entities("&#x80;"), "\u{20ac}");
    }

    #[test]
    fn test_decode_entities_invalid_numbers() {
        assert_eq!(decode_entities("a&#0;b"), "a\u{fffd}b");
        assert_eq!(decode_entities("&#xD800;"), "\u{fffd}");
        assert_eq!(decode_entities("&#99999999999;"), "\u{fffd}");
        assert_eq!(decode_entities("a&#1;b"), "ab");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("  <p>Learning <i>fast</i> &amp; slow</p> "),
            "Learning fast & slow"
        );
    }

    // =========================================================================
    // ASCII folding
    // =========================================================================

    #[test]
    fn test_normalize_text_accents() {
        assert_eq!(normalize_text("Łukasz Müller Ñandú"), "ukasz Muller Nandu");
    }

    #[test]
    fn test_normalize_text_cjk_falls_back_to_transliteration() {
        let out = normalize_text("良华");
        assert!(!out.trim().is_empty());
        assert!(out.is_ascii());
        assert_eq!(out.to_lowercase().replace(' ', ""), "lianghua");
    }

    #[test]
    fn test_normalize_text_cyrillic() {
        assert_eq!(normalize_text("Иван").to_lowercase(), "ivan");
    }

    #[test]
    fn test_normalize_text_whitespace_only() {
        assert_eq!(normalize_text("   "), "   ");
    }

    #[test]
    fn test_romanize_cjk() {
        assert_eq!(romanize_cjk("良华"), "lianghua");
        assert_eq!(romanize_cjk("振辉"), "zhenhui");
    }

    #[test]
    fn test_has_cjk() {
        assert!(has_cjk("王"));
        assert!(!has_cjk("Wang"));
    }

    // =========================================================================
    // LaTeX
    // =========================================================================

    #[test]
    fn test_strip_latex_nested() {
        assert_eq!(strip_latex(r"\textbf{\emph{Deep}} nets"), "Deep nets");
    }

    #[test]
    fn test_strip_latex_math_and_bare_commands() {
        assert_eq!(strip_latex(r"$\texttt{C2-DPO}$: a method"), "C2-DPO: a method");
        assert_eq!(strip_latex(r"\alpha-divergence"), "-divergence");
    }

    #[test]
    fn test_strip_latex_stray_braces() {
        assert_eq!(strip_latex("{BERT} for {NLP}"), "BERT for NLP");
    }

    #[test]
    fn test_strip_latex_plain_unchanged() {
        assert_eq!(strip_latex("Nothing to strip"), "Nothing to strip");
    }
}
