//! Script canonicalization applied before any matching.

/// Map Arabic-script glyph variants onto the Persian forms the vocabulary is
/// written in.
///
/// Every target codepoint is outside the set of source codepoints, so the
/// mapping is idempotent.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.chars().map(canonical_char).collect()
}

fn canonical_char(c: char) -> char {
    match c {
        // Arabic Yeh, Alef Maksura -> Farsi Yeh
        '\u{064A}' | '\u{0649}' => '\u{06CC}',
        // Arabic Kaf -> Keheh
        '\u{0643}' => '\u{06A9}',
        // Arabic-Indic digits -> Extended Arabic-Indic (Persian) digits
        '\u{0660}'..='\u{0669}' => {
            let offset = u32::from(c) - 0x0660;
            char::from_u32(0x06F0 + offset).unwrap_or(c)
        }
        _ => c,
    }
}
