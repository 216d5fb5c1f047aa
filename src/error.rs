//! Error Handling Module
//!
//! A single error enum covers every failure the adapter can surface:
//! construction-time configuration problems, remote call failures,
//! responses that cannot be interpreted, and prompt log I/O.
//!
//! # Example
//!
//! ```rust,ignore
//! use openrouter_prompt::error::LlmError;
//!
//! let error = LlmError::MissingCredential("no key".into());
//! assert!(error.is_configuration_error());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the OpenRouter adapter
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key could be resolved when the client was built
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Invalid configuration value (base URL, timeout, tracing setup)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Transport or API failure while talking to the chat endpoint
    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),

    /// The model answered, but the answer could not be interpreted
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        /// The offending (trimmed) response text
        text: String,
        /// Why the text was rejected
        reason: String,
    },

    /// Writing or renaming the prompt log failed
    #[error("Failed to write prompt log to {}: {source}", path.display())]
    LogWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LlmError {
    /// Create a malformed-response error for the given text
    pub fn malformed(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised while building the client
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential(_) | Self::ConfigurationError(_)
        )
    }

    /// The response text that caused a `MalformedResponse`, if any
    pub fn offending_text(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RemoteCallFailed(format!("request timed out: {err}"))
        } else {
            Self::RemoteCallFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(LlmError::MissingCredential("x".into()).is_configuration_error());
        assert!(LlmError::ConfigurationError("x".into()).is_configuration_error());
        assert!(!LlmError::RemoteCallFailed("x".into()).is_configuration_error());
    }

    #[test]
    fn test_offending_text() {
        let err = LlmError::malformed("{oops}", "expected value");
        assert_eq!(err.offending_text(), Some("{oops}"));
        assert_eq!(err.to_string(), "Malformed response: expected value");

        let err = LlmError::RemoteCallFailed("boom".into());
        assert_eq!(err.offending_text(), None);
    }

    #[test]
    fn test_log_write_failed_display() {
        let err = LlmError::LogWriteFailed {
            path: PathBuf::from("/tmp/prompt.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/prompt.log"));
        assert!(msg.contains("denied"));
    }
}
