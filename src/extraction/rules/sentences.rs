//! Sentence splitting.

/// Split on `.`, `!` or `?` followed by whitespace.
///
/// Terminators stay attached to their sentence and content after the last
/// terminator is kept. Returned slices are trimmed and never empty.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let followed_by_space = chars.peek().is_some_and(|(_, next)| next.is_whitespace());
        if followed_by_space {
            let end = idx + ch.len_utf8();
            push_trimmed(&mut parts, &text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        push_trimmed(&mut parts, &text[start..]);
    }

    parts
}

fn push_trimmed<'a>(parts: &mut Vec<&'a str>, part: &'a str) {
    let trimmed = part.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed);
    }
}
