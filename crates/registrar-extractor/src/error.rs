//! Error types for the Extractor

use registrar_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Extraction timeout
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    /// Reply was not a company object, or carried an unusable date
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
