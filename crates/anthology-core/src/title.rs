/// Fix titles that arrive in ALL CAPS or all lowercase.
///
/// Such titles get naive per-word capitalization: a letter is uppercased
/// when the character before it is not a letter, every other letter is
/// lowercased. Mixed-case titles, which is nearly all of them, are returned
/// unchanged, as are titles without letters.
pub fn normalize_title_case(title: &str) -> String {
    let mut letters = title.chars().filter(|c| c.is_alphabetic()).peekable();
    if letters.peek().is_none() {
        return title.to_string();
    }

    let (mut any_upper, mut any_lower) = (false, false);
    for c in letters {
        any_upper |= c.is_uppercase();
        any_lower |= c.is_lowercase();
    }
    if any_upper && any_lower {
        return title.to_string();
    }
    capitalize_words(title)
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                push_titlecase(&mut out, c);
            }
            in_word = true;
        } else {
            // apostrophes do not start a new word: "don't", "Bayes's"
            in_word = in_word && matches!(c, '\'' | '\u{2019}');
            out.push(c);
        }
    }
    out
}

/// Uppercase a word-initial letter. Expansions keep only their first letter
/// uppercase, so `ß` becomes `Ss` rather than `SS`.
fn push_titlecase(out: &mut String, c: char) {
    let mut upper = c.to_uppercase();
    if let Some(first) = upper.next() {
        out.push(first);
    }
    for rest in upper {
        out.extend(rest.to_lowercase());
    }
}
