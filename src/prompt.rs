//! Prompt assembly
//!
//! Turns the adapter context, an optional schema, and an optional category
//! into a system prompt, and pairs it with the user instruction. Building a
//! prompt never fails; missing inputs only make it shorter.

use crate::types::{Category, ChatMessage};

/// Line written between the system and user prompt in prompt logs
pub const PROMPT_LOG_SEPARATOR: &str = "----------------------------------------";

/// Build the system prompt
///
/// Returns an empty string when `context` is empty, which suppresses the
/// system message entirely.
pub fn build_system_prompt(
    context: &str,
    schema: Option<&str>,
    category: Option<&Category>,
) -> String {
    let context = context.trim();
    if context.is_empty() {
        return String::new();
    }

    let mut prompt = context.to_string();

    if let Some(schema) = schema {
        prompt.push_str(
            "\n\nRespond only with a single JSON object that conforms to the following schema. \
             Do not wrap it in markdown and do not add any text before or after it.\n",
        );
        prompt.push_str(schema.trim());
    }

    if let Some(category) = category {
        prompt.push_str(&format!("\n\nCategory: {category}"));
    }

    prompt
}

/// Order the system and user messages for a chat completion
pub fn assemble_messages(system_prompt: &str, instruction: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if !system_prompt.is_empty() {
        messages.push(ChatMessage::system(system_prompt));
    }
    messages.push(ChatMessage::user(instruction.trim()));
    messages
}

/// Text persisted by the prompt log
pub fn format_prompt_log(system_prompt: &str, instruction: &str) -> String {
    format!("{system_prompt}\n\n{PROMPT_LOG_SEPARATOR}\n{instruction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn test_empty_context_emits_no_system_message() {
        for context in ["", "   ", "\n"] {
            let system = build_system_prompt(context, Some(r#"{"a": "number"}"#), None);
            assert!(system.is_empty());

            let messages = assemble_messages(&system, "hello");
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role, MessageRole::User);
        }
    }

    #[test]
    fn test_schema_is_embedded_verbatim() {
        let schema = r#"{"type": "object", "properties": {"ok": {"type": "boolean"}}}"#;
        let system = build_system_prompt("You are a reviewer.", Some(schema), None);

        assert!(system.starts_with("You are a reviewer."));
        assert!(system.contains(schema));
        assert!(system.contains("JSON"));
    }

    #[test]
    fn test_category_is_appended() {
        let system = build_system_prompt("ctx", None, Some(&Category::from(7)));
        assert!(system.ends_with("Category: 7"));

        let system = build_system_prompt("ctx", None, None);
        assert_eq!(system, "ctx");
    }

    #[test]
    fn test_system_message_precedes_user_message() {
        let messages = assemble_messages("system text", "  do the thing \n");
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("system text"),
                ChatMessage::user("do the thing"),
            ]
        );
    }

    #[test]
    fn test_prompt_log_format() {
        let log = format_prompt_log("sys", "user");
        assert_eq!(log, format!("sys\n\n{}\nuser", "-".repeat(40)));
    }
}
