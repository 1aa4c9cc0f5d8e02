//! Registrar LLM Provider Layer
//!
//! Pluggable LLM provider implementations behind one async trait.
//!
//! # Architecture
//!
//! Every provider supports two call shapes:
//! - **Structured generation**: a system instruction, a user message and a
//!   JSON schema the reply must satisfy. Used by the extractor.
//! - **Tool-calling chat**: a message history plus tool definitions; the reply
//!   is either plain text or a set of tool calls. Used by the agent.
//!
//! # Providers
//!
//! - `OpenAiProvider`: OpenAI chat completions (default)
//! - `OllamaProvider`: Local Ollama API integration
//! - `MockProvider`: Deterministic mock for testing
//!
//! # Examples
//!
//! ```
//! use registrar_llm::{LlmProvider, MockProvider, OutputSchema};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new(r#"{"answer": 42}"#);
//! let schema = OutputSchema {
//!     name: "Answer".to_string(),
//!     schema: serde_json::json!({"type": "object"}),
//! };
//! let reply = provider
//!     .generate_structured("Answer briefly.", "What is six times seven?", &schema)
//!     .await
//!     .unwrap();
//! assert_eq!(reply, r#"{"answer": 42}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod schema;
pub mod types;

use async_trait::async_trait;

pub use error::LlmError;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use schema::{strict_schema, OutputSchema};
pub use types::{AssistantTurn, ChatMessage, Role, ToolCallRequest, ToolSpec};

/// Trait for LLM providers
///
/// Implementations must be safe to share across tasks; the pipeline awaits
/// one call at a time but holds the provider for the whole run.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier used for requests
    fn model_name(&self) -> &str;

    /// Generate a reply constrained to `schema`, returned as raw JSON text
    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema,
    ) -> Result<String, LlmError>;

    /// One round of tool-calling chat
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<AssistantTurn, LlmError>;
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Box<P> {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema,
    ) -> Result<String, LlmError> {
        (**self).generate_structured(system, user, schema).await
    }

    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<AssistantTurn, LlmError> {
        (**self).chat_with_tools(messages, tools).await
    }
}

/// Retry delay before attempt `attempt + 1`: 1s, 2s, 4s, ...
pub(crate) fn backoff_delay(attempt: u32) -> std::time::Duration {
    std::time::Duration::from_secs(2u64.saturating_pow(attempt.saturating_sub(1)))
}
