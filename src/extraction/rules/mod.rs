//! Rule-based extraction: markers, sentences, rule tables and the extractor.

pub mod dedupe;
pub mod extractor_rules;
pub mod markers;
pub mod patterns;
pub mod sentences;

pub use dedupe::{dedupe_key, dedupe_preserving_order, normalize_whitespace};
pub use extractor_rules::{RuleExtractor, extract_action_items};
pub use markers::{MarkerKind, MarkerRule, strip_leading_markers};
pub use patterns::{Exclusion, RulePatterns, Signal};
pub use sentences::split_sentences;
