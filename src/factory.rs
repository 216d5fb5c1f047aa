//! Model factory
//!
//! Lets callers that juggle several providers create an adapter from a model
//! name, an optional context and an optional key, without knowing how the
//! adapter is configured.

use std::sync::Arc;

use crate::client::OpenRouterClient;
use crate::config::{ConfigSource, EnvConfig};
use crate::error::LlmError;
use crate::transport::ChatTransport;

/// Creates model adapters by name
pub trait ModelFactory: Send + Sync {
    type Model;

    /// Create an adapter for `model_name`
    ///
    /// `context` replaces the default system context; `key` takes precedence
    /// over configured credentials.
    fn create_model(
        &self,
        model_name: &str,
        context: Option<&str>,
        key: Option<&str>,
    ) -> Result<Self::Model, LlmError>;
}

/// Factory producing [`OpenRouterClient`]s that share configuration sources
#[derive(Clone)]
pub struct OpenRouterFactory {
    config: Arc<dyn ConfigSource>,
    env: Arc<dyn ConfigSource>,
    transport: Option<Arc<dyn ChatTransport>>,
}

impl Default for OpenRouterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenRouterFactory {
    pub fn new() -> Self {
        tracing::info!("OpenRouter model factory initialized");
        Self {
            config: Arc::new(EnvConfig),
            env: Arc::new(EnvConfig),
            transport: None,
        }
    }

    pub fn with_config_source(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = config;
        self
    }

    pub fn with_env_source(mut self, env: Arc<dyn ConfigSource>) -> Self {
        self.env = env;
        self
    }

    /// Share one transport across every created client
    pub fn with_transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl ModelFactory for OpenRouterFactory {
    type Model = OpenRouterClient;

    fn create_model(
        &self,
        model_name: &str,
        context: Option<&str>,
        key: Option<&str>,
    ) -> Result<OpenRouterClient, LlmError> {
        let mut builder = OpenRouterClient::builder()
            .config_source(self.config.clone())
            .env_source(self.env.clone())
            .model(model_name);
        if let Some(context) = context {
            builder = builder.context(context);
        }
        if let Some(key) = key {
            builder = builder.api_key(key);
        }
        if let Some(transport) = &self.transport {
            builder = builder.with_transport(transport.clone());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CONTEXT, DEFAULT_MODEL, MapConfig, keys};

    fn hermetic_factory(config: MapConfig) -> OpenRouterFactory {
        OpenRouterFactory::new()
            .with_config_source(Arc::new(config))
            .with_env_source(Arc::new(MapConfig::new()))
    }

    #[test]
    fn test_create_model_with_explicit_values() {
        let factory = hermetic_factory(MapConfig::new());
        let client = factory
            .create_model("google/gemini-pro", Some("You review code."), Some("k"))
            .unwrap();
        assert_eq!(client.model(), "google/gemini-pro");
        assert_eq!(client.context(), "You review code.");
    }

    #[test]
    fn test_create_model_uses_configured_key_and_defaults() {
        let factory = hermetic_factory(MapConfig::new().with(keys::API_KEY, "cfg-key"));
        let client = factory.create_model("", None, None).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.context(), DEFAULT_CONTEXT);
    }

    #[test]
    fn test_create_model_without_key_fails() {
        let factory = hermetic_factory(MapConfig::new());
        let err = factory.create_model("openai/gpt-4o", None, None).unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential(_)));
    }
}
