//! Term normalization and substring matching.

/// Converts a raw term payload into the lowercase needle it matches on.
///
/// A payload wrapped in double quotes loses one quote on each side and has
/// `\"` unescaped. Bare words are only lowercased.
pub fn normalize_term(raw: &str) -> String {
    match strip_phrase_quotes(raw) {
        Some(inner) => unescape_phrase(inner).to_lowercase(),
        None => raw.to_lowercase(),
    }
}

fn strip_phrase_quotes(raw: &str) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

fn unescape_phrase(inner: &str) -> String {
    let mut unescaped = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next_if(|next| *next == '"') {
                unescaped.push(next);
                continue;
            }
        }
        unescaped.push(ch);
    }

    unescaped
}

/// Returns true when `needle` occurs in the already-lowercased candidate.
///
/// An empty needle matches everything.
pub fn text_matches(needle: &str, lowered_candidate: &str) -> bool {
    needle.is_empty() || lowered_candidate.contains(needle)
}
