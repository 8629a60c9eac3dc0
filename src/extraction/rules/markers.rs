//! Leading list markers (bullets, checkboxes, numbering).

use std::fmt;

use regex::Regex;

/// Upper bound on stacked markers stripped from one line (`- [ ] 1. ...`).
const MAX_MARKER_PASSES: usize = 4;

/// Kind of leading marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// `-`, `*` or `•`.
    Bullet,
    /// `[ ]`, `[x]` or `[todo]`.
    Checkbox,
    /// `1.`, `2)` or `(3)`.
    Numbered,
    /// `a.` or `b)`.
    Lettered,
}

impl MarkerKind {
    /// Stable string representation (for logs).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Checkbox => "checkbox",
            Self::Numbered => "numbered",
            Self::Lettered => "lettered",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled marker pattern.
#[derive(Clone, Debug)]
pub struct MarkerRule {
    /// Which marker the pattern recognizes.
    pub kind: MarkerKind,
    /// Anchored pattern covering the marker and the whitespace after it.
    pub pattern: Regex,
}

/// Strip every leading marker from `text`.
///
/// Returns the remaining content, untouched apart from the removed prefix, and
/// the first marker found (if any).
#[must_use]
pub fn strip_leading_markers<'a>(
    rules: &[MarkerRule],
    text: &'a str,
) -> (&'a str, Option<MarkerKind>) {
    let mut rest = text.trim();
    let mut first = None;

    for _ in 0..MAX_MARKER_PASSES {
        let Some((kind, end)) = rules
            .iter()
            .find_map(|rule| rule.pattern.find(rest).map(|m| (rule.kind, m.end())))
        else {
            break;
        };
        first.get_or_insert(kind);
        rest = rest[end..].trim_start();
    }

    (rest.trim_end(), first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::core::config::RuleConfig;
    use crate::extraction::rules::patterns::RulePatterns;

    fn strip(text: &str) -> (&str, Option<MarkerKind>) {
        let patterns = RulePatterns::compile(&RuleConfig::default()).unwrap();
        let (rest, kind) = strip_leading_markers(patterns.markers(), text);
        (rest, kind)
    }

    #[test]
    fn test_bullets() {
        assert_eq!(strip("- Write tests"), ("Write tests", Some(MarkerKind::Bullet)));
        assert_eq!(strip("* item"), ("item", Some(MarkerKind::Bullet)));
        assert_eq!(strip("• item"), ("item", Some(MarkerKind::Bullet)));
        assert_eq!(strip("-- item"), ("item", Some(MarkerKind::Bullet)));
    }

    #[test]
    fn test_checkboxes() {
        assert_eq!(strip("[ ] Set up database"), ("Set up database", Some(MarkerKind::Checkbox)));
        assert_eq!(strip("[x] Done thing"), ("Done thing", Some(MarkerKind::Checkbox)));
        assert_eq!(strip("[TODO] Call Sam"), ("Call Sam", Some(MarkerKind::Checkbox)));
    }

    #[test]
    fn test_numbering() {
        assert_eq!(strip("1. Write tests"), ("Write tests", Some(MarkerKind::Numbered)));
        assert_eq!(strip("(2) Write tests"), ("Write tests", Some(MarkerKind::Numbered)));
        assert_eq!(strip("12) Write tests"), ("Write tests", Some(MarkerKind::Numbered)));
        assert_eq!(strip("a) Write tests"), ("Write tests", Some(MarkerKind::Lettered)));
        assert_eq!(strip("B. Write tests"), ("Write tests", Some(MarkerKind::Lettered)));
    }

    #[test]
    fn test_stacked_markers_in_any_order() {
        assert_eq!(strip("- [ ] Set up database").0, "Set up database");
        assert_eq!(strip("[ ] - Set up database").0, "Set up database");
        assert_eq!(strip("- [todo] 3. Ship").0, "Ship");
        assert_eq!(strip("- [ ] Set up database").1, Some(MarkerKind::Bullet));
    }

    #[test]
    fn test_content_is_not_consumed() {
        assert_eq!(strip("Some narrative sentence."), ("Some narrative sentence.", None));
        assert_eq!(strip("-5 degrees outside"), ("-5 degrees outside", None));
        assert_eq!(strip("2024 budget is final"), ("2024 budget is final", None));
        assert_eq!(strip("**Bold** heading"), ("**Bold** heading", None));
        assert_eq!(strip("I think we are fine"), ("I think we are fine", None));
    }

    #[test]
    fn test_marker_only_line() {
        assert_eq!(strip("[ ]"), ("", Some(MarkerKind::Checkbox)));
        assert_eq!(strip("1."), ("1.", None));
    }
}
