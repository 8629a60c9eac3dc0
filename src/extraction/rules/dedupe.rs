//! Whitespace normalization and order-preserving deduplication.

use std::collections::HashSet;

/// Collapse whitespace runs to single spaces and trim, keeping casing.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(word);
    }
    normalized
}

/// Comparison key for items (trim, lowercase, collapse whitespace).
#[must_use]
pub fn dedupe_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut prev_space = false;

    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            if !prev_space {
                key.push(' ');
                prev_space = true;
            }
        } else {
            for lower in ch.to_lowercase() {
                key.push(lower);
            }
            prev_space = false;
        }
    }

    key
}

/// Keep the first occurrence of every key, preserving order and original casing.
#[must_use]
pub fn dedupe_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(dedupe_key(item)))
        .collect()
}
