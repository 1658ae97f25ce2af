//! Text canonicalization shared by topic classification and FAQ matching.
//!
//! Every comparison in the engine runs on normalized text, so two strings
//! that differ only in case, accents, punctuation or spacing compare equal.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize free text for matching.
///
/// Lower-cases, decomposes and drops combining marks, replaces anything that
/// is not a letter, number or whitespace with a space, then collapses
/// whitespace runs and trims. The result is stable under reapplication.
///
/// Note that decomposition also strips the breve of `й` and the diaeresis of
/// `ї`; keywords must go through this function too before being compared.
pub fn normalize(text: &str) -> String {
    let lowered: String = text.chars().flat_map(char::to_lowercase).collect();

    let cleaned: String = lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
