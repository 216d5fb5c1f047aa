//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; applications that want them on
//! the console or in a file can install a subscriber here.
//!
//! ## Example
//!
//! ```rust,ignore
//! use openrouter_prompt::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::LlmError;

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to stderr (ignored when `log_file` is set)
    pub enable_console: bool,
    /// Write to this file instead of the console
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            enable_console: true,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Debug level, text output
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }
}

/// Builder for [`SubscriberConfig`]
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    enable_console: Option<bool>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self, LlmError> {
        self.log_level = Some(parse_level(level)?);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.enable_console = Some(enable);
        self
    }

    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            enable_console: self.enable_console.unwrap_or(true),
            log_file: self.log_file,
        }
    }
}

fn parse_level(level: &str) -> Result<tracing::Level, LlmError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(LlmError::ConfigurationError(format!(
            "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
        ))),
    }
}

fn parse_format(format: &str) -> Result<OutputFormat, LlmError> {
    match format.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "json-compact" => Ok(OutputFormat::JsonCompact),
        _ => Err(LlmError::ConfigurationError(format!(
            "Invalid log format: {format}. Valid options: text, json, json-compact"
        ))),
    }
}

/// Install a global tracing subscriber
///
/// Returns a guard when logging to a file; keep it alive for the lifetime of
/// the program or buffered lines are lost. An already-installed global
/// subscriber is not an error.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, LlmError> {
    let level = config.log_level.as_str().to_lowercase();
    let filter = format!("openrouter_prompt={level}");

    if let Some(path) = &config.log_file {
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path.file_name().ok_or_else(|| {
            LlmError::ConfigurationError(format!("Invalid log file path: {}", path.display()))
        })?;
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        try_init_with(&filter, config.output_format, writer, false)?;
        return Ok(Some(guard));
    }

    if config.enable_console {
        try_init_with(&filter, config.output_format, std::io::stderr, true)?;
    }
    Ok(None)
}

fn try_init_with<W>(
    filter: &str,
    format: OutputFormat,
    writer: W,
    ansi: bool,
) -> Result<(), LlmError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);

    let init_result = match format {
        OutputFormat::Text => builder.with_ansi(ansi).try_init(),
        OutputFormat::Json => builder.json().try_init(),
        OutputFormat::JsonCompact => builder.json().flatten_event(true).try_init(),
    };

    match init_result {
        Ok(()) => Ok(()),
        Err(e) => {
            let message = e.to_string();
            if message.contains("global default trace dispatcher has already been set") {
                Ok(())
            } else {
                Err(LlmError::ConfigurationError(format!(
                    "Failed to initialize tracing: {e}"
                )))
            }
        }
    }
}

/// Initialize with default configuration
pub fn init_default() -> Result<Option<WorkerGuard>, LlmError> {
    init_subscriber(SubscriberConfig::default())
}

/// Initialize for debugging
pub fn init_debug() -> Result<Option<WorkerGuard>, LlmError> {
    init_subscriber(SubscriberConfig::debug())
}

/// Initialize from environment variables
///
/// - `OPENROUTER_LOG_LEVEL`: trace, debug, info, warn, error
/// - `OPENROUTER_LOG_FORMAT`: text, json, json-compact
/// - `OPENROUTER_LOG_FILE`: log file path
pub fn init_from_env() -> Result<Option<WorkerGuard>, LlmError> {
    let mut builder = SubscriberConfig::builder();

    if let Ok(level) = std::env::var("OPENROUTER_LOG_LEVEL") {
        builder = builder.log_level_str(&level)?;
    }
    if let Ok(format) = std::env::var("OPENROUTER_LOG_FORMAT") {
        builder = builder.output_format(parse_format(&format)?);
    }
    if let Ok(file_path) = std::env::var("OPENROUTER_LOG_FILE") {
        builder = builder.log_file(PathBuf::from(file_path));
    }

    init_subscriber(builder.build())
}
