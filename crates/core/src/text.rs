//! Letter and word normalization shared by every stage that compares text.

use unicode_normalization::UnicodeNormalization;

/// Canonical form of a word: trimmed, uppercased, NFC-composed.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_uppercase().nfc().collect()
}

/// Normalize a single tile letter.
///
/// Returns `None` unless the input composes to exactly one character, so
/// `"A\u{301}"` becomes `'Á'` while `"AB"` is rejected.
pub fn normalize_letter(raw: &str) -> Option<char> {
    let normalized = normalize_word(raw);
    let mut chars = normalized.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(first)
}

/// Number of letters in an already-normalized word.
pub fn letter_count(word: &str) -> usize {
    word.chars().count()
}
