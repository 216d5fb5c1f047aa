//! Chat completion transport
//!
//! [`ChatTransport`] is the seam between the adapter and the remote chat API.
//! [`HttpChatTransport`] talks to an OpenAI-compatible
//! `POST {base_url}/chat/completions` endpoint with `reqwest`; tests and
//! embedders can supply their own implementation to observe the request or
//! return a canned response.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::types::{ChatMessage, RawModelOutput};

/// Request body for a chat completion
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Upper bound for the whole call; not sent on the wire
    #[serde(skip)]
    pub timeout: Duration,
}

/// Chat completion response (only the fields the adapter reads)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice
    ///
    /// An empty choice list or a first choice without text content is a
    /// malformed response.
    pub fn first_output(&self) -> Result<RawModelOutput, LlmError> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| LlmError::malformed("", "response contained no choices"))?;
        let text = choice
            .message
            .content
            .clone()
            .ok_or_else(|| LlmError::malformed("", "first choice has no text content"))?;
        Ok(RawModelOutput { text })
    }
}

/// Remote chat completion call
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(
        &self,
        api_key: &SecretString,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError>;
}

/// `reqwest`-backed transport for OpenAI-compatible endpoints
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpChatTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn complete(
        &self,
        api_key: &SecretString,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let url = self.chat_url();
        tracing::debug!(
            request_id = %request_id,
            url = %url,
            model = %request.model,
            timeout_secs = request.timeout.as_secs(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .timeout(request.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(request_id = %request_id, status = status.as_u16(), "Chat completion failed");
            return Err(LlmError::RemoteCallFailed(format!(
                "API error {}: {}",
                status.as_u16(),
                extract_error_message(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            LlmError::RemoteCallFailed(format!("Failed to decode chat completion response: {e}"))
        })
    }
}

/// Pull `error.message` out of an OpenAI-style error body, else the raw body
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
