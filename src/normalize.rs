//! Response normalization
//!
//! Interprets the raw text of a model answer according to the shape of the
//! call that produced it: a single expected file, a schema-constrained JSON
//! answer, or free text.

use crate::error::LlmError;
use crate::json_repair::repair_json;
use crate::types::{AttachedFile, NormalizedResult, SingleFilePayload};

/// Normalize a raw model answer
///
/// - the text is trimmed;
/// - with a schema, `{...}`-shaped text goes through [`repair_json`];
/// - a single-file call returns the full text as that file's content, even
///   when it is wrapped in a code fence (see [`SingleFilePayload::unfenced`]);
/// - a schema call parses the (repaired) text as JSON;
/// - anything else is returned as raw text.
pub fn normalize(
    raw_text: &str,
    schema_requested: bool,
    files: &[AttachedFile],
    expected_single_file: bool,
) -> Result<NormalizedResult, LlmError> {
    let trimmed = raw_text.trim();

    let content = if schema_requested && trimmed.starts_with('{') && trimmed.ends_with('}') {
        repair_json(trimmed)
    } else {
        trimmed.to_string()
    };

    if expected_single_file && let Some(file) = files.first() {
        return Ok(NormalizedResult::SingleFile(SingleFilePayload {
            file: file.clone(),
            content,
        }));
    }

    if schema_requested {
        return serde_json::from_str(&content)
            .map(NormalizedResult::ParsedJson)
            .map_err(|e| LlmError::malformed(trimmed, format!("Failed to parse JSON: {e}")));
    }

    Ok(NormalizedResult::RawText(content))
}

/// Unwrap text that is entirely one fenced code block
///
/// Anything else, including text with prose around the fence, is returned
/// unchanged.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // first line is the (possibly empty) language tag
    let Some(newline) = body.find('\n') else {
        return text;
    };
    let body = &body[newline + 1..];
    if body.contains("\n```") {
        // more than one fenced block
        return text;
    }
    body.strip_suffix('\n').unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_text_round_trip() {
        let result = normalize("hello", false, &[], false).unwrap();
        assert_eq!(result, NormalizedResult::RawText("hello".into()));
    }

    #[test]
    fn test_raw_text_is_trimmed() {
        let result = normalize("  \n hello world \n", false, &[], false).unwrap();
        assert_eq!(result.as_text(), Some("hello world"));
    }

    #[test]
    fn test_schema_trailing_comma_is_repaired() {
        let result = normalize(" {\"a\":1,} ", true, &[], false).unwrap();
        assert_eq!(result, NormalizedResult::ParsedJson(json!({"a": 1})));
    }

    #[test]
    #[cfg(not(feature = "json-repair"))]
    fn test_unrepairable_schema_answer_is_malformed() {
        let err = normalize("  {\"a\": }  ", true, &[], false).unwrap_err();
        match err {
            LlmError::MalformedResponse { text, .. } => assert_eq!(text, "{\"a\": }"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_object_followed_by_prose_is_malformed() {
        // not `{...}`-shaped, so no repair backend ever sees it
        let text = "{\"score\": 7}\nLet me know if you need anything else.";
        let err = normalize(&format!("  {text}\n"), true, &[], false).unwrap_err();
        match err {
            LlmError::MalformedResponse { text: offending, reason } => {
                assert_eq!(offending, text);
                assert!(reason.starts_with("Failed to parse JSON"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_schema_answer_that_is_not_an_object() {
        // arrays skip repair but still parse
        let result = normalize("[1, 2]", true, &[], false).unwrap();
        assert_eq!(result.as_json(), Some(&json!([1, 2])));

        let err = normalize("Sure! Here you go.", true, &[], false).unwrap_err();
        assert_eq!(err.offending_text(), Some("Sure! Here you go."));
    }

    #[test]
    fn test_single_file_regardless_of_shape() {
        let files = [AttachedFile::from("src/lib.rs")];
        for text in ["fn main() {}", "{\"a\":1,}", "", "not code at all"] {
            let result = normalize(text, false, &files, true).unwrap();
            let payload = result.as_single_file().unwrap();
            assert_eq!(payload.file, files[0]);
            assert_eq!(payload.content, text);
        }
    }

    #[test]
    fn test_single_file_fence_is_kept() {
        // a markdown file whose body really is one fenced block
        let files = [AttachedFile::from("USAGE.md")];
        let text = "```sh\ncargo run\n```";
        let result = normalize(text, false, &files, true).unwrap();
        let payload = result.as_single_file().unwrap();
        assert_eq!(payload.content, text);
        assert_eq!(payload.unfenced(), "cargo run");
    }

    #[test]
    fn test_multiple_files_without_schema_are_raw_text() {
        let files = [AttachedFile::from("a.rs"), AttachedFile::from("b.rs")];
        let result = normalize("two files", false, &files, false).unwrap();
        assert_eq!(result, NormalizedResult::RawText("two files".into()));
    }

    #[test]
    fn test_strip_code_fence_edge_cases() {
        assert_eq!(strip_code_fence("```\nbody\n```"), "body");
        assert_eq!(strip_code_fence("no fence"), "no fence");
        assert_eq!(strip_code_fence("```inline```"), "```inline```");
        let two = "```\na\n```\ntext\n```\nb\n```";
        assert_eq!(strip_code_fence(two), two);
    }
}
