//! Error types for agent operations.

use registrar_llm::LlmError;
use thiserror::Error;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Provider call failed
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The model kept calling tools without giving a final answer
    #[error("Agent reached max iterations ({0})")]
    MaxIterations(usize),

    /// Agent was built with unusable settings
    #[error("Configuration error: {0}")]
    Config(String),
}
