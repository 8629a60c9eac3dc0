//! Declarative rule tables for action-item classification.
//!
//! Every rule is data: a table of phrases or patterns paired with the signal
//! (or exclusion) it produces. `RulePatterns::compile` turns the tables into
//! regexes once; the compiled set is immutable and shared freely.

use std::fmt;

use regex::Regex;

use crate::extraction::core::config::RuleConfig;
use crate::extraction::rules::markers::{MarkerKind, MarkerRule};

/// Leading markers, tried in order on every pass.
pub const MARKER_TABLE: &[(MarkerKind, &str)] = &[
    (MarkerKind::Bullet, r"^[-*•]+\s+"),
    (MarkerKind::Checkbox, r"(?i)^\[(?:\s*|x|todo)\]\s*"),
    (MarkerKind::Numbered, r"^\(?\d{1,3}\)?[.)]\s+"),
    (MarkerKind::Lettered, r"^[A-Za-z][.)]\s+"),
];

/// Explicit labels; followed by `:` or a spaced dash, then the payload.
pub const LABEL_PREFIXES: &[&str] = &[
    "action items",
    "action item",
    "action",
    "todo",
    "to-do",
    "follow up",
    "follow-up",
    "next steps",
    "next step",
    "next",
];

/// Phrases that open a request or plan.
pub const SENTENCE_STARTERS: &[&str] = &[
    "we should",
    "we need to",
    "we have to",
    "we must",
    "please",
    "let's",
    "let’s",
    "make sure",
    "remember to",
    "don't forget to",
    "don’t forget to",
];

/// Verbs that make a fragment imperative when they open it.
pub const IMPERATIVE_VERBS: &[&str] = &[
    "update",
    "fix",
    "send",
    "review",
    "create",
    "add",
    "remove",
    "refactor",
    "investigate",
    "check",
    "follow up",
    "follow",
    "schedule",
    "confirm",
    "notify",
    "document",
    "test",
    "deploy",
    "reply",
    "call",
    "email",
    "meet",
    "implement",
    "write",
    "verify",
    "design",
    "set up",
    "prepare",
    "share",
    "draft",
    "submit",
    "finalize",
    "clean up",
    "merge",
    "book",
];

/// Interrogative or auxiliary openers that mark a question.
pub const QUESTION_WORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "can", "could", "should", "would", "do",
    "does", "did", "is", "are", "was", "were", "will",
];

/// Openers of status or informational statements.
pub const INFORMATIONAL_WORDS: &[&str] = &["note", "fyi", "info", "heads up", "heads-up"];

/// Informational openers only when used as a label (`Status: ...`).
pub const INFORMATIONAL_LABELS: &[&str] = &["status", "update"];

/// Labels that carry no payload on their own.
pub const BARE_LABELS: &[&str] = &[
    "todo",
    "to-do",
    "tbd",
    "asap",
    "follow up",
    "follow-up",
    "next steps",
    "next step",
    "action item",
    "action items",
];

/// First words accepted by the sentence-level fallback pass.
pub const FALLBACK_STARTERS: &[&str] = &[
    "add",
    "create",
    "implement",
    "fix",
    "update",
    "write",
    "check",
    "verify",
    "refactor",
    "document",
    "design",
    "investigate",
];

/// Why a fragment counts as actionable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Explicit label prefix such as `TODO:`.
    Label,
    /// Request or plan opener such as `please`.
    Starter,
    /// Allowlisted imperative verb.
    Imperative,
    /// Long enough `!`-terminated statement.
    Exclamation,
}

impl Signal {
    /// Stable string representation (for logs).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Starter => "starter",
            Self::Imperative => "imperative",
            Self::Exclamation => "exclamation",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an actionable fragment was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exclusion {
    /// Question or interrogative opener.
    Question,
    /// Status / FYI statement.
    Informational,
    /// Too short, too few words, or a bare label.
    Vague,
}

impl Exclusion {
    /// Stable string representation (for logs).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Informational => "informational",
            Self::Vague => "vague",
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule tests a fragment.
#[derive(Clone, Debug)]
pub enum Matcher {
    /// Regex match.
    Pattern(Regex),
    /// Fragment ends with the given character.
    Terminal(char),
    /// Fragment ends with the given character and is at least `min_chars` long.
    TerminalWithMinChars {
        /// Required last character.
        terminal: char,
        /// Minimum fragment length in characters.
        min_chars: usize,
    },
}

impl Matcher {
    /// Test a trimmed fragment.
    #[must_use]
    pub fn is_match(&self, fragment: &str) -> bool {
        match self {
            Self::Pattern(pattern) => pattern.is_match(fragment),
            Self::Terminal(terminal) => fragment.ends_with(*terminal),
            Self::TerminalWithMinChars {
                terminal,
                min_chars,
            } => fragment.ends_with(*terminal) && fragment.chars().count() >= *min_chars,
        }
    }
}

/// A classification rule.
#[derive(Clone, Debug)]
pub struct ActionRule {
    /// Signal produced on match.
    pub signal: Signal,
    /// Test applied to the fragment.
    pub matcher: Matcher,
}

/// An exclusion rule.
#[derive(Clone, Debug)]
pub struct ExclusionRule {
    /// Reason recorded on match.
    pub exclusion: Exclusion,
    /// Test applied to the fragment.
    pub matcher: Matcher,
}

/// The compiled rule set.
#[derive(Clone, Debug)]
pub struct RulePatterns {
    markers: Vec<MarkerRule>,
    label: Regex,
    actionable: Vec<ActionRule>,
    exclusions: Vec<ExclusionRule>,
    bare_label: Regex,
    word: Regex,
    first_word: Regex,
}

impl RulePatterns {
    /// Compile the tables.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn compile(config: &RuleConfig) -> Result<Self, regex::Error> {
        let markers = MARKER_TABLE
            .iter()
            .map(|(kind, pattern)| {
                Ok(MarkerRule {
                    kind: *kind,
                    pattern: Regex::new(pattern)?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let label = Regex::new(&format!(
            r"(?i)^(?:{})(?:\s*:|\s+[-–])\s*(.+)$",
            alternation(LABEL_PREFIXES)
        ))?;

        // Order matters only for the reported signal; any match is actionable.
        let actionable = vec![
            ActionRule {
                signal: Signal::Starter,
                matcher: Matcher::Pattern(Regex::new(&format!(
                    r"(?i)^(?:{})\s+\S",
                    alternation(SENTENCE_STARTERS)
                ))?),
            },
            ActionRule {
                signal: Signal::Imperative,
                matcher: Matcher::Pattern(Regex::new(&format!(
                    r"(?i)^(?:{})\b",
                    alternation(IMPERATIVE_VERBS)
                ))?),
            },
            ActionRule {
                signal: Signal::Exclamation,
                matcher: Matcher::TerminalWithMinChars {
                    terminal: '!',
                    min_chars: config.exclamation_min_chars,
                },
            },
        ];

        let exclusions = vec![
            ExclusionRule {
                exclusion: Exclusion::Question,
                matcher: Matcher::Terminal('?'),
            },
            ExclusionRule {
                exclusion: Exclusion::Question,
                matcher: Matcher::Pattern(Regex::new(&format!(
                    r"(?i)^(?:{})\b",
                    alternation(QUESTION_WORDS)
                ))?),
            },
            ExclusionRule {
                exclusion: Exclusion::Informational,
                matcher: Matcher::Pattern(Regex::new(&format!(
                    r"(?i)^(?:{})\b",
                    alternation(INFORMATIONAL_WORDS)
                ))?),
            },
            ExclusionRule {
                exclusion: Exclusion::Informational,
                matcher: Matcher::Pattern(Regex::new(&format!(
                    r"(?i)^(?:{})(?:\s*:|\s+[-–])",
                    alternation(INFORMATIONAL_LABELS)
                ))?),
            },
        ];

        let bare_label = Regex::new(&format!(
            r"(?i)^(?:{})\s*[:\-–]?\s*[.!]?$",
            alternation(BARE_LABELS)
        ))?;

        Ok(Self {
            markers,
            label,
            actionable,
            exclusions,
            bare_label,
            word: Regex::new(r"\w[\w'’-]*")?,
            first_word: Regex::new(r"[A-Za-z']+")?,
        })
    }

    /// Compiled marker rules.
    #[must_use]
    pub fn markers(&self) -> &[MarkerRule] {
        &self.markers
    }

    /// If the fragment opens with a label, return the payload after it.
    #[must_use]
    pub fn label_payload<'a>(&self, fragment: &'a str) -> Option<&'a str> {
        self.label
            .captures(fragment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|payload| !payload.is_empty())
    }

    /// First signal whose rule matches.
    #[must_use]
    pub fn classify(&self, fragment: &str) -> Option<Signal> {
        self.actionable
            .iter()
            .find(|rule| rule.matcher.is_match(fragment))
            .map(|rule| rule.signal)
    }

    /// First exclusion whose rule matches (vagueness is checked separately).
    #[must_use]
    pub fn exclusion(&self, fragment: &str) -> Option<Exclusion> {
        self.exclusions
            .iter()
            .find(|rule| rule.matcher.is_match(fragment))
            .map(|rule| rule.exclusion)
    }

    /// Whether the fragment is only a label such as `TODO` or `TBD`.
    #[must_use]
    pub fn is_bare_label(&self, fragment: &str) -> bool {
        self.bare_label.is_match(fragment)
    }

    /// Number of word tokens.
    #[must_use]
    pub fn word_count(&self, fragment: &str) -> usize {
        self.word.find_iter(fragment).count()
    }

    /// Whether the first alphabetic word is a fallback starter.
    #[must_use]
    pub fn starts_with_fallback_verb(&self, sentence: &str) -> bool {
        self.first_word.find(sentence).is_some_and(|word| {
            let word = word.as_str().to_ascii_lowercase();
            FALLBACK_STARTERS.contains(&word.as_str())
        })
    }
}

/// Escaped alternation, longest phrases first, with flexible inner whitespace.
fn alternation(phrases: &[&str]) -> String {
    let mut sorted: Vec<&str> = phrases.to_vec();
    sorted.sort_by_key(|phrase| std::cmp::Reverse(phrase.len()));
    sorted
        .iter()
        .map(|phrase| regex::escape(phrase).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}
