//! Rule-based action-item extraction.

use std::sync::LazyLock;

use tracing::{debug, error};

use crate::extraction::core::config::{FallbackPolicy, RuleConfig};
use crate::extraction::rules::dedupe::{dedupe_preserving_order, normalize_whitespace};
use crate::extraction::rules::markers::strip_leading_markers;
use crate::extraction::rules::patterns::{Exclusion, RulePatterns, Signal};
use crate::extraction::rules::sentences::split_sentences;

/// Default rule set, compiled on first use.
static DEFAULT_EXTRACTOR: LazyLock<Result<RuleExtractor, regex::Error>> =
    LazyLock::new(|| RuleExtractor::new(RuleConfig::default()));

/// Extract action items with the default rule set.
///
/// Never fails: blank input, and a rule set that failed to compile, both
/// yield an empty list.
#[must_use]
pub fn extract_action_items(text: &str) -> Vec<String> {
    match DEFAULT_EXTRACTOR.as_ref() {
        Ok(extractor) => extractor.extract(text),
        Err(err) => {
            error!("Default rule set failed to compile: {err}");
            Vec::new()
        }
    }
}

/// Pure, synchronous extractor driven by declarative rule tables.
#[derive(Clone, Debug)]
pub struct RuleExtractor {
    patterns: RulePatterns,
    config: RuleConfig,
}

impl RuleExtractor {
    /// Compile the rule tables for `config`.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new(config: RuleConfig) -> Result<Self, regex::Error> {
        let patterns = RulePatterns::compile(&config)?;
        Ok(Self { patterns, config })
    }

    /// Active thresholds.
    #[must_use]
    pub const fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Extract ordered, deduplicated action items from free-form text.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut items = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (content, marker) = strip_leading_markers(self.patterns.markers(), line);
            for (idx, sentence) in split_sentences(content).into_iter().enumerate() {
                let marked = marker.is_some() && idx == 0;
                if let Some(item) = self.evaluate(sentence, marked) {
                    items.push(item);
                }
            }
        }

        let mut items = dedupe_preserving_order(items);
        if items.is_empty() && self.config.fallback == FallbackPolicy::ImperativeSentences {
            items = self.fallback(text);
        }
        items
    }

    /// Classify one sentence; returns the normalized item when it is kept.
    fn evaluate(&self, fragment: &str, marked: bool) -> Option<String> {
        let (body, signal) = match self.patterns.label_payload(fragment) {
            Some(payload) => {
                let (payload, _) = strip_leading_markers(self.patterns.markers(), payload);
                (payload, Some(Signal::Label))
            }
            None => (fragment, self.patterns.classify(fragment)),
        };

        let Some(signal) = signal else {
            debug!("Skipping fragment without signal: {fragment:?}");
            return None;
        };

        if let Some(exclusion) = self.patterns.exclusion(body) {
            debug!("Skipping {exclusion} fragment ({signal}): {fragment:?}");
            return None;
        }

        let body = body.trim_matches(|c: char| c == '-' || c == '–' || c.is_whitespace());
        if self.is_vague(body, marked) {
            debug!("Skipping {} fragment ({signal}): {fragment:?}", Exclusion::Vague);
            return None;
        }

        Some(normalize_whitespace(body))
    }

    /// Bare labels are always vague; `relaxed` fragments only need `min_marked_words`.
    fn is_vague(&self, fragment: &str, relaxed: bool) -> bool {
        if fragment.is_empty() || self.patterns.is_bare_label(fragment) {
            return true;
        }
        let words = self.patterns.word_count(fragment);
        if relaxed {
            return words < self.config.min_marked_words;
        }
        fragment.chars().count() < self.config.min_fragment_chars
            || words < self.config.min_fragment_words
    }

    /// Sentence-level pass used when the line rules found nothing.
    fn fallback(&self, text: &str) -> Vec<String> {
        let items = text
            .lines()
            .map(|line| strip_leading_markers(self.patterns.markers(), line.trim()).0)
            .flat_map(split_sentences)
            .filter(|sentence| !sentence.ends_with('?'))
            .filter(|sentence| self.patterns.starts_with_fallback_verb(sentence))
            .map(|sentence| {
                sentence.trim_matches(|c: char| c == '-' || c == '–' || c.is_whitespace())
            })
            .filter(|sentence| !self.is_vague(sentence, true))
            .map(normalize_whitespace);
        let items = dedupe_preserving_order(items);
        if !items.is_empty() {
            debug!("Fallback pass kept {} sentence(s)", items.len());
        }
        items
    }
}
