//! Request and response types

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Category hint appended to the system prompt
///
/// Callers pass either a numeric category id or a free-form name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Number(i64),
    Name(String),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for Category {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Category {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

/// Reference to a file the caller expects the model to produce or rewrite
///
/// Only the identity is carried; the adapter never touches the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachedFile(PathBuf);

impl AttachedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for AttachedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for AttachedFile {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AttachedFile {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<PathBuf> for AttachedFile {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

impl From<&Path> for AttachedFile {
    fn from(value: &Path) -> Self {
        Self::new(value)
    }
}

/// One call's worth of input to [`crate::OpenRouterClient::send`]
#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    /// Free-form user instruction
    pub instruction: String,
    /// Output schema descriptor; when set the answer is parsed as JSON
    pub schema: Option<String>,
    /// Optional steering hint
    pub category: Option<Category>,
    /// Files the answer refers to, in caller order
    pub files: Vec<AttachedFile>,
    /// Per-call timeout override
    pub timeout: Option<Duration>,
    /// Where to persist the assembled prompt, if anywhere
    pub prompt_log: Option<PathBuf>,
}

impl PromptRequest {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Default::default()
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn category(mut self, category: impl Into<Category>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn file(mut self, file: impl Into<AttachedFile>) -> Self {
        self.files.push(file.into());
        self
    }

    pub fn files<I, F>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<AttachedFile>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn prompt_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_log = Some(path.into());
        self
    }

    /// True iff exactly one file is attached and no schema was requested
    pub fn expected_single_file(&self) -> bool {
        self.files.len() == 1 && self.schema.is_none()
    }
}

/// Text of the first choice returned by the remote model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelOutput {
    pub text: String,
}

/// Full content of the single file a call was expected to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFilePayload {
    pub file: AttachedFile,
    pub content: String,
}

impl SingleFilePayload {
    /// Content with a surrounding code fence removed
    ///
    /// Only text that is entirely one fenced block is unwrapped. Anything
    /// else is returned as is.
    pub fn unfenced(&self) -> &str {
        crate::normalize::strip_code_fence(&self.content)
    }
}

/// Normalized model answer
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    RawText(String),
    ParsedJson(serde_json::Value),
    SingleFile(SingleFilePayload),
}

impl NormalizedResult {
    /// Text for `RawText`, content for `SingleFile`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::RawText(text) => Some(text),
            Self::SingleFile(payload) => Some(&payload.content),
            Self::ParsedJson(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ParsedJson(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::ParsedJson(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_single_file(&self) -> Option<&SingleFilePayload> {
        match self {
            Self::SingleFile(payload) => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_payload_unfenced() {
        let fenced = SingleFilePayload {
            file: AttachedFile::from("main.py"),
            content: "```python\nprint('hi')\n```".into(),
        };
        assert_eq!(fenced.unfenced(), "print('hi')");

        let plain = SingleFilePayload {
            file: AttachedFile::from("main.py"),
            content: "print('hi')".into(),
        };
        assert_eq!(plain.unfenced(), "print('hi')");
    }

    #[test]
    fn test_expected_single_file() {
        let req = PromptRequest::new("rewrite").file("src/main.rs");
        assert!(req.expected_single_file());

        let req = PromptRequest::new("rewrite").file("a.rs").schema("{}");
        assert!(!req.expected_single_file());

        let req = PromptRequest::new("rewrite").files(["a.rs", "b.rs"]);
        assert!(!req.expected_single_file());

        assert!(!PromptRequest::new("hi").expected_single_file());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::from(3).to_string(), "3");
        assert_eq!(Category::from("refactor").to_string(), "refactor");
    }

    #[test]
    fn test_message_role_serialization() {
        let msg = ChatMessage::system("be brief");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");
    }
}
