//! Registrar Extractor
//!
//! Converts unstructured text to candidate company records using an LLM.
//!
//! # Architecture
//!
//! ```text
//! Text → TextChunker → segments → Extractor → LLM → CompanyRecord
//! ```
//!
//! # Key Features
//!
//! - **Chunking**: recursive separator splitting with overlap, or one segment
//!   per paragraph
//! - **Structured output**: the reply is constrained by a JSON schema derived
//!   from the record shape
//! - **Date normalization**: year-only and year-month dates are pinned to the
//!   first day of the period
//! - **Timeouts**: a hung model call becomes an error instead of a stall
//!
//! # Example Usage
//!
//! ```
//! use registrar_extractor::{Extractor, ExtractorConfig};
//! use registrar_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let llm = Arc::new(MockProvider::new(
//!     r#"{"company_name": "Acme Corp", "founders": ["Alice", "Bob"], "founding_date": "2005"}"#,
//! ));
//! let extractor = Extractor::new(llm, ExtractorConfig::default()).unwrap();
//!
//! let segments = extractor.chunk("Acme Corp was founded in 2005 by Alice and Bob.");
//! assert_eq!(segments.len(), 1);
//!
//! let record = extractor.extract(&segments[0]).await.unwrap();
//! assert_eq!(record.company_name.as_deref(), Some("Acme Corp"));
//! assert_eq!(record.founding_date.unwrap().to_string(), "2005-01-01");
//! # });
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod parser;
mod prompt;

#[cfg(test)]
mod tests;

pub use chunking::TextChunker;
pub use config::{ChunkStrategy, ExtractorConfig};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::{parse_company_response, CompanyInfo};
pub use prompt::SYSTEM_PROMPT;
