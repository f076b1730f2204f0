//! Soccer domain logic: status classification, league matching and message
//! rendering. Everything here is pure and total.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub mod format;
pub mod league;
pub mod status;

/// Normalizes free provider text for keyword matching.
///
/// Lowercases, strips diacritics, and collapses every run of
/// non-alphanumeric characters into a single space. `"LaLiga  Santánder!"`
/// becomes `"laliga santander"`.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(lower);
            } else {
                pending_space = true;
            }
        }
    }

    out
}

/// Whether `phrase` appears in `normalized` as a run of whole words.
///
/// Both sides must already be normalized.
pub(crate) fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    normalized
        .match_indices(phrase)
        .any(|(start, _)| {
            let end = start + phrase.len();
            let before_ok = start == 0 || normalized.as_bytes()[start - 1] == b' ';
            let after_ok = end == normalized.len() || normalized.as_bytes()[end] == b' ';
            before_ok && after_ok
        })
}
