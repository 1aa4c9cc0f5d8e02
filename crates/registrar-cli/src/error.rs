//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file missing, unreadable or empty
    #[error("Input error: {0}")]
    Input(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] registrar_store::StoreError),

    /// LLM provider setup error
    #[error("LLM error: {0}")]
    Llm(#[from] registrar_llm::LlmError),

    /// Extractor setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] registrar_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
