//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How input text is split into segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Recursive separator-based splitting with overlap
    #[default]
    Recursive,
    /// One segment per blank-line-delimited paragraph
    Paragraph,
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Text chunking strategy
    pub chunk_strategy: ChunkStrategy,

    /// Maximum chunk size (characters)
    pub chunk_size: usize,

    /// Characters carried from one chunk into the next
    pub chunk_overlap: usize,

    /// Maximum time for a single extraction call (seconds)
    pub extraction_timeout_secs: u64,

    /// Longest segment sent to the model (characters)
    pub max_text_length: usize,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.chunk_strategy == ChunkStrategy::Recursive
            && self.chunk_size > self.max_text_length
        {
            return Err("chunk_size cannot exceed max_text_length".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            chunk_strategy: ChunkStrategy::Recursive,
            chunk_size: 1000,
            chunk_overlap: 100,
            extraction_timeout_secs: 60,
            max_text_length: 50_000,
        }
    }
}
