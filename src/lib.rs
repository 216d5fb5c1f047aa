//! openrouter-prompt
//!
//! A small adapter around OpenRouter's OpenAI-compatible chat completion API.
//! It assembles a system prompt (context, output schema, category hint),
//! sends exactly one chat completion per call, and normalizes the answer into
//! raw text, parsed JSON, or the content of a single expected file.
//!
//! ```rust,no_run
//! use openrouter_prompt::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let client = OpenRouterClient::builder()
//!         .api_key("your-api-key")
//!         .model("anthropic/claude-3.5-sonnet")
//!         .build()?;
//!
//!     let answer = client
//!         .send(PromptRequest::new("Rate this haiku").schema(r#"{"score": "number"}"#))
//!         .await?;
//!     println!("{:?}", answer.as_json());
//!     Ok(())
//! }
//! ```
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod json_repair;
pub mod normalize;
pub mod prompt;
pub mod prompt_log;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use client::{OpenRouterBuilder, OpenRouterClient};
pub use error::LlmError;

pub mod prelude {
    pub use crate::client::{OpenRouterBuilder, OpenRouterClient};
    pub use crate::config::{ConfigSource, EnvConfig, MapConfig};
    pub use crate::error::LlmError;
    pub use crate::factory::{ModelFactory, OpenRouterFactory};
    pub use crate::transport::{ChatTransport, HttpChatTransport};
    pub use crate::types::{
        AttachedFile, Category, ChatMessage, MessageRole, NormalizedResult, PromptRequest,
        SingleFilePayload,
    };
}
