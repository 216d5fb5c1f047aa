//! OpenRouter client
//!
//! [`OpenRouterClient`] holds the immutable per-adapter configuration (model,
//! system context, credential, default timeout, debug flag) and runs one
//! call per [`OpenRouterClient::send`]: build the prompt, optionally log it,
//! issue a single chat completion, normalize the first choice.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::config::{
    ConfigSource, DEFAULT_BASE_URL, DEFAULT_CONTEXT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, EnvConfig,
    keys,
};
use crate::error::LlmError;
use crate::normalize::normalize;
use crate::prompt::{assemble_messages, build_system_prompt, format_prompt_log};
use crate::prompt_log::write_prompt_log;
use crate::transport::{ChatCompletionRequest, ChatTransport, HttpChatTransport};
use crate::types::{NormalizedResult, PromptRequest};

/// Chat adapter for OpenRouter
pub struct OpenRouterClient {
    model: String,
    context: String,
    api_key: SecretString,
    base_url: String,
    default_timeout: Duration,
    debug: bool,
    transport: Arc<dyn ChatTransport>,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("model", &self.model)
            .field("context", &self.context)
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .field("debug", &self.debug)
            .field("has_api_key", &!self.api_key.expose_secret().is_empty())
            .finish()
    }
}

impl OpenRouterClient {
    /// Start building a client
    pub fn builder() -> OpenRouterBuilder {
        OpenRouterBuilder::new()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Answers from this adapter must be checked by the caller
    pub fn requires_evaluation(&self) -> bool {
        true
    }

    /// Toggle verbose request/response logging
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
        let state = if enabled { "enabled" } else { "disabled" };
        tracing::info!("Debug mode {}", state);
    }

    /// Replace the credential used for subsequent calls
    ///
    /// A blank key is rejected and the current one is kept.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential(
                "Unable to replace OpenRouter API key: the new key is blank".to_string(),
            ));
        }
        self.api_key = SecretString::from(api_key);
        Ok(())
    }

    /// Send a bare instruction with no schema, files or log
    pub async fn prompt(&self, instruction: impl Into<String>) -> Result<NormalizedResult, LlmError> {
        self.send(PromptRequest::new(instruction)).await
    }

    /// Run one prompt through the model and normalize the answer
    pub async fn send(&self, request: PromptRequest) -> Result<NormalizedResult, LlmError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        let system_prompt = build_system_prompt(
            &self.context,
            request.schema.as_deref(),
            request.category.as_ref(),
        );
        let expected_single_file = request.expected_single_file();

        if self.debug {
            tracing::debug!("Requesting prompt using the model: {}", self.model);
            tracing::debug!("System prompt: {}", system_prompt);
            tracing::debug!("User prompt: {}", request.instruction);
            if !request.files.is_empty() {
                let files: Vec<String> = request.files.iter().map(ToString::to_string).collect();
                tracing::debug!("Expected files: {:?}", files);
            }
            tracing::debug!(
                "Request parameters: model={}, timeout={}s",
                self.model,
                timeout.as_secs()
            );
        }

        if let Some(path) = &request.prompt_log {
            let contents = format_prompt_log(&system_prompt, &request.instruction);
            write_prompt_log(path, &contents).await?;
        }

        let completion = ChatCompletionRequest {
            model: self.model.clone(),
            messages: assemble_messages(&system_prompt, &request.instruction),
            timeout,
        };

        let response = self
            .transport
            .complete(&self.api_key, completion)
            .await
            .map_err(|e| {
                let detail = match e {
                    LlmError::RemoteCallFailed(msg) => msg,
                    other => other.to_string(),
                };
                LlmError::RemoteCallFailed(format!(
                    "Unable to get response from OpenRouter model {}: {detail}",
                    self.model
                ))
            })?;

        let output = response.first_output()?;
        if self.debug {
            tracing::debug!(response = %output.text, "Response received");
        }

        normalize(
            &output.text,
            request.schema.is_some(),
            &request.files,
            expected_single_file,
        )
    }
}

/// Builder for [`OpenRouterClient`]
///
/// Every value falls back to the config source, then to a built-in default.
/// The credential additionally falls back to the environment source.
pub struct OpenRouterBuilder {
    api_key: Option<String>,
    model: Option<String>,
    context: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    debug: bool,
    config: Arc<dyn ConfigSource>,
    env: Arc<dyn ConfigSource>,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn ChatTransport>>,
}

impl Default for OpenRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenRouterBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: None,
            context: None,
            base_url: None,
            timeout: None,
            debug: false,
            config: Arc::new(EnvConfig),
            env: Arc::new(EnvConfig),
            http_client: None,
            transport: None,
        }
    }

    /// Set the API key
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model id (e.g. `openai/gpt-4o`)
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system context; an empty context disables the system message
    pub fn context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the default request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start with debug logging enabled
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Configuration source consulted for defaults
    pub fn config_source(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = config;
        self
    }

    /// Source consulted last for the credential
    pub fn env_source(mut self, env: Arc<dyn ConfigSource>) -> Self {
        self.env = env;
        self
    }

    /// Set custom HTTP client
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the HTTP transport entirely
    pub fn with_transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    ///
    /// Fails with [`LlmError::MissingCredential`] when no API key can be found.
    pub fn build(self) -> Result<OpenRouterClient, LlmError> {
        // Priority: parameter > config source > environment
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| non_empty(self.config.get(keys::API_KEY)))
            .or_else(|| non_empty(self.env.get(keys::API_KEY)))
            .ok_or_else(|| {
                LlmError::MissingCredential(format!(
                    "Unable to create OpenRouter client: no API key provided (set {})",
                    keys::API_KEY
                ))
            })?;

        let model = self
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.config.get_string_or(keys::DEFAULT_MODEL, DEFAULT_MODEL));

        let default_timeout = match self.timeout {
            Some(timeout) => timeout,
            None => Duration::from_secs(
                self.config
                    .get_u64_or(keys::MODEL_TIMEOUT, DEFAULT_TIMEOUT_SECS),
            ),
        };
        if default_timeout.is_zero() {
            return Err(LlmError::ConfigurationError(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| self.config.get_string_or(keys::BASE_URL, DEFAULT_BASE_URL));
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(LlmError::ConfigurationError(
                "Base URL must start with http:// or https://".to_string(),
            ));
        }

        let context = self.context.unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let http_client = self.http_client.unwrap_or_default();
                Arc::new(HttpChatTransport::with_http_client(http_client, &base_url))
            }
        };

        tracing::info!("Created OpenRouter client. Using model: {}", model);

        Ok(OpenRouterClient {
            model,
            context,
            api_key: SecretString::from(api_key),
            base_url,
            default_timeout,
            debug: self.debug,
            transport,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
