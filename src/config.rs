//! Configuration sources
//!
//! The adapter never reads process-wide configuration on its own. Callers
//! hand it a [`ConfigSource`] (and a separate one for the environment
//! fallback), which keeps tests hermetic and lets embedders plug in their
//! own key/value store.

use std::collections::HashMap;

/// Default model used when neither the builder nor the config names one
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Default OpenRouter endpoint
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default system context
pub const DEFAULT_CONTEXT: &str = "You are a helpful assistant.";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration keys understood by the adapter
pub mod keys {
    pub const DEFAULT_MODEL: &str = "DEFAULT_MODEL";
    pub const MODEL_TIMEOUT: &str = "MODEL_TIMEOUT";
    pub const API_KEY: &str = "OPENROUTER_API_KEY";
    pub const BASE_URL: &str = "OPENROUTER_BASE_URL";
}

/// String-keyed configuration lookup
pub trait ConfigSource: Send + Sync {
    /// Look up a raw value
    fn get(&self, key: &str) -> Option<String>;

    /// Look up a non-empty string value, falling back to `default`
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Look up an unsigned integer, falling back to `default` when the key is
    /// missing or does not parse
    fn get_u64_or(&self, key: &str, default: u64) -> u64 {
        match self.get(key) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(key, value = %raw, "Ignoring non-numeric config value");
                    default
                }
            },
            None => default,
        }
    }
}

/// Reads values from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigSource for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory configuration
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_config_lookup() {
        let config = MapConfig::new().with(keys::DEFAULT_MODEL, "openai/gpt-4o");
        assert_eq!(config.get(keys::DEFAULT_MODEL).as_deref(), Some("openai/gpt-4o"));
        assert_eq!(config.get(keys::BASE_URL), None);
    }

    #[test]
    fn test_typed_fallbacks() {
        let config: MapConfig = [(keys::MODEL_TIMEOUT, "120"), (keys::BASE_URL, "  ")]
            .into_iter()
            .collect();

        assert_eq!(config.get_u64_or(keys::MODEL_TIMEOUT, 60), 120);
        assert_eq!(config.get_u64_or("MISSING", 60), 60);
        assert_eq!(
            config.get_string_or(keys::BASE_URL, DEFAULT_BASE_URL),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_non_numeric_timeout_falls_back() {
        let config = MapConfig::new().with(keys::MODEL_TIMEOUT, "soon");
        assert_eq!(config.get_u64_or(keys::MODEL_TIMEOUT, 60), 60);
    }
}
