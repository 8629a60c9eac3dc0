//! Parsing of model replies into action items.

use serde_json::Value;

use crate::extraction::core::errors::{ExtractError, ExtractResult};

/// Parse a model reply into trimmed, non-empty string items.
///
/// Tolerates a surrounding code fence and prose around the array: the first
/// `[` at which a JSON array parses wins. Non-string elements are skipped.
///
/// # Errors
/// Returns `WrongShape` when the reply is valid JSON without an array, and
/// `MalformedOutput` when it is neither.
pub fn parse_action_items_reply(reply: &str) -> ExtractResult<Vec<String>> {
    let body = strip_code_fence(reply.trim());

    let Some(items) = first_json_array(body) else {
        return Err(match serde_json::from_str::<Value>(body) {
            Ok(value) => ExtractError::WrongShape(json_kind(&value).to_string()),
            Err(err) => ExtractError::MalformedOutput(err.to_string()),
        });
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.trim().to_string()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .collect())
}

fn first_json_array(text: &str) -> Option<Vec<Value>> {
    text.match_indices('[').find_map(|(idx, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[idx..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Array(items))) => Some(items),
            _ => None,
        }
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line.
    let rest = rest.find('\n').map_or("", |idx| &rest[idx + 1..]);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_array() {
        let items = parse_action_items_reply(r#"["Send the report", "Book the room"]"#).unwrap();
        assert_eq!(items, vec!["Send the report", "Book the room"]);
    }

    #[test]
    fn test_code_fence() {
        let reply = "```json\n[\"Send the report\"]\n```";
        assert_eq!(parse_action_items_reply(reply).unwrap(), vec!["Send the report"]);
        let reply = "```\n[\"Book the room\"]\n```";
        assert_eq!(parse_action_items_reply(reply).unwrap(), vec!["Book the room"]);
    }

    #[test]
    fn test_surrounding_prose() {
        let reply = "Sure! Here are the items:\n[\"Email Dana\", \"Fix CI\"]\nLet me know [if] needed.";
        assert_eq!(parse_action_items_reply(reply).unwrap(), vec!["Email Dana", "Fix CI"]);
    }

    #[test]
    fn test_bracket_in_prose_before_array() {
        let reply = "Items [see below]: [\"Fix CI\"]";
        assert_eq!(parse_action_items_reply(reply).unwrap(), vec!["Fix CI"]);
    }

    #[test]
    fn test_filters_blank_and_non_string_items() {
        let reply = r#"["  Ship it  ", "", "   ", 42, null, {"task": "x"}, "Call Sam"]"#;
        assert_eq!(parse_action_items_reply(reply).unwrap(), vec!["Ship it", "Call Sam"]);
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_action_items_reply("[]").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape() {
        let err = parse_action_items_reply(r#"{"items": "none"}"#).unwrap_err();
        assert!(matches!(err, ExtractError::WrongShape(_)));
        let err = parse_action_items_reply(r#""just a string""#).unwrap_err();
        assert!(matches!(err, ExtractError::WrongShape(_)));
    }

    #[test]
    fn test_malformed_output() {
        let err = parse_action_items_reply("I could not find any action items.").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedOutput(_)));
        let err = parse_action_items_reply("[\"unterminated").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedOutput(_)));
    }
}
