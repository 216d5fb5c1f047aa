//! Best-effort repair of JSON-shaped model output
//!
//! Models asked for JSON regularly return *almost* JSON. [`repair_json`]
//! applies a fixed set of string-aware rules in a single pass:
//!
//! 1. Raw newlines, carriage returns and tabs inside a string are escaped.
//! 2. A `"` inside a string that is not followed (after whitespace) by `:`,
//!    `,`, `}`, `]` or the end of input is an interior quote and is escaped.
//! 3. A `,` outside strings that is followed by `}` or `]` is dropped.
//! 4. An unterminated string is closed, then unclosed `{` / `[` are closed in
//!    reverse order.
//!
//! Valid JSON takes a fast path and is returned untouched. When the rules do
//! not yield parseable JSON the original text is returned unchanged, so that
//! the caller's parse step reports the failure. With the `json-repair`
//! feature the `jsonrepair` crate is tried before giving up.

use serde_json::Value;

/// Repair `text` if possible, otherwise return it unchanged. Never fails.
pub fn repair_json(text: &str) -> String {
    if is_valid_json(text) {
        return text.to_string();
    }

    let repaired = apply_repair_rules(text);
    if is_valid_json(&repaired) {
        tracing::debug!(
            "JSON repaired successfully:\nOriginal: {}\nRepaired: {}",
            text,
            repaired
        );
        return repaired;
    }

    #[cfg(feature = "json-repair")]
    if let Some(repaired) = repair_with_jsonrepair(text) {
        tracing::debug!(
            "JSON repaired by jsonrepair:\nOriginal: {}\nRepaired: {}",
            text,
            repaired
        );
        return repaired;
    }

    tracing::warn!("JSON repair could not fix the response, leaving it unchanged");
    text.to_string()
}

fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

#[cfg(feature = "json-repair")]
fn repair_with_jsonrepair(text: &str) -> Option<String> {
    let repaired = jsonrepair::repair_json(text, &jsonrepair::Options::default()).ok()?;
    is_valid_json(&repaired).then_some(repaired)
}

/// Single pass over `input` applying the documented rules.
pub(crate) fn apply_repair_rules(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 8);
    // Closers still owed, innermost last
    let mut open: Vec<char> = Vec::new();
    let mut in_str = false;
    let mut escape = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_str {
            if escape {
                escape = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escape = true;
                    out.push(c);
                }
                '"' => {
                    if closes_string(&chars, i + 1) {
                        in_str = false;
                        out.push('"');
                    } else {
                        out.push_str("\\\"");
                    }
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_str = true;
                out.push(c);
            }
            '{' => {
                open.push('}');
                out.push(c);
            }
            '[' => {
                open.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if open.last() == Some(&c) {
                    open.pop();
                }
                out.push(c);
            }
            ',' if matches!(next_non_whitespace(&chars, i + 1), Some('}' | ']')) => {}
            _ => out.push(c),
        }
    }

    if in_str {
        if escape {
            // dangling backslash would escape the closing quote
            out.push('\\');
        }
        out.push('"');
    }
    while let Some(closer) = open.pop() {
        out.push(closer);
    }
    out
}

/// Whether a quote at `from - 1` ends the current string
fn closes_string(chars: &[char], from: usize) -> bool {
    match next_non_whitespace(chars, from) {
        None => true,
        Some(c) => matches!(c, ':' | ',' | '}' | ']'),
    }
}

fn next_non_whitespace(chars: &[char], from: usize) -> Option<char> {
    chars.iter().skip(from).copied().find(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_valid_json_is_untouched() {
        let valid = r#"{ "name": "John",  "age": 30 }"#;
        assert_eq!(repair_json(valid), valid);
    }

    #[test]
    fn test_trailing_commas() {
        assert_eq!(parse(&repair_json(r#"{"a":1,}"#)), json!({"a": 1}));
        assert_eq!(
            parse(&repair_json("{\"a\": [1, 2, 3,\n],\n}")),
            json!({"a": [1, 2, 3]})
        );
    }

    #[test]
    fn test_commas_inside_strings_are_kept() {
        let text = r#"{"a": "x,}", "b": [1,],}"#;
        assert_eq!(parse(&repair_json(text)), json!({"a": "x,}", "b": [1]}));
    }

    #[test]
    fn test_unescaped_interior_quotes() {
        let text = r#"{"msg": "she said "hi" to me"}"#;
        assert_eq!(
            parse(&repair_json(text)),
            json!({"msg": "she said \"hi\" to me"})
        );
    }

    #[test]
    fn test_raw_newlines_in_strings() {
        let text = "{\"code\": \"fn main() {\n\tprintln!();\n}\"}";
        assert_eq!(
            parse(&repair_json(text)),
            json!({"code": "fn main() {\n\tprintln!();\n}"})
        );
    }

    #[test]
    fn test_unterminated_string_and_brackets() {
        assert_eq!(
            parse(&apply_repair_rules(r#"{"a": ["x", "y"#)),
            json!({"a": ["x", "y"]})
        );
        assert_eq!(
            parse(&repair_json(r#"{"a": "hello}"#)),
            json!({"a": "hello}"})
        );
    }

    #[test]
    fn test_dangling_escape_is_neutralized() {
        assert_eq!(parse(&apply_repair_rules(r#"{"p": "C:\"#)), json!({"p": "C:\\"}));
    }

    #[test]
    fn test_builtin_rules_give_up_on_missing_values() {
        for text in [r#"{"a": }"#, "{not json at all}", r#"{"a" 1}"#] {
            assert!(!is_valid_json(&apply_repair_rules(text)), "{text}");
        }
    }

    #[test]
    #[cfg(not(feature = "json-repair"))]
    fn test_unrepairable_input_is_returned_unchanged() {
        for text in [r#"{"a": }"#, "{not json at all}", r#"{"a" 1}"#] {
            assert_eq!(repair_json(text), text);
        }
    }

    #[test]
    fn test_non_ascii_content() {
        let text = "{\"greeting\": \"héllo wörld\",}";
        assert_eq!(parse(&repair_json(text)), json!({"greeting": "héllo wörld"}));
    }
}
