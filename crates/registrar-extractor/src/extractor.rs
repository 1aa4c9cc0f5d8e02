//! Core Extractor implementation

use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_company_response, CompanyInfo};
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use registrar_domain::CompanyRecord;
use registrar_llm::{LlmProvider, OutputSchema};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

/// The Extractor turns one text segment into a candidate company record
pub struct Extractor<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: ExtractorConfig,
    chunker: TextChunker,
    schema: OutputSchema,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
{
    /// Create a new Extractor
    ///
    /// Fails if `config` does not validate.
    pub fn new(llm_provider: Arc<L>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let chunker = TextChunker::new(
            config.chunk_strategy,
            config.chunk_size,
            config.chunk_overlap,
        );

        Ok(Self {
            llm_provider,
            config,
            chunker,
            schema: OutputSchema::for_type::<CompanyInfo>(),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The shared provider handle
    pub fn provider(&self) -> &Arc<L> {
        &self.llm_provider
    }

    /// Split input text into segments using the configured strategy
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.chunker.chunk(text)
    }

    /// Extract a company record from one segment
    ///
    /// A segment that mentions no company yields an empty record, not an
    /// error.
    pub async fn extract(&self, segment: &str) -> Result<CompanyRecord, ExtractorError> {
        let length = segment.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                length,
                self.config.max_text_length,
            ));
        }

        let user = user_prompt(segment);
        debug!(
            model = self.llm_provider.model_name(),
            segment_len = length,
            "Requesting structured extraction"
        );

        let response = timeout(
            self.config.extraction_timeout(),
            self.llm_provider
                .generate_structured(SYSTEM_PROMPT, &user, &self.schema),
        )
        .await
        .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))??;

        debug!("LLM response length: {} chars", response.len());

        let record = parse_company_response(&response)?;

        match &record.company_name {
            Some(name) => info!("Extracted candidate record for {}", name),
            None => debug!("No company mentioned in segment"),
        }

        Ok(record)
    }
}
