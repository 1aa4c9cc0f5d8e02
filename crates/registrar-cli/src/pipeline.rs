//! Pipeline driver: chunk, extract, gate, insert, report.
//!
//! Chunks are processed strictly in order and one at a time. A failure in one
//! chunk is recorded in its outcome and never stops the chunks after it.

use registrar_agent::{instruction_for, is_stored_observation, AddCompanyTool, Agent};
use registrar_domain::{CompanyStore, InsertOutcome, StoredCompany};
use registrar_extractor::Extractor;
use registrar_gatekeeper::{Gatekeeper, RejectionReason};
use registrar_llm::LlmProvider;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What happened to one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Complete record found and stored
    Inserted {
        /// Store-assigned id
        id: i64,
        /// Stored company name
        company_name: String,
    },

    /// Complete record found but the store rejected it
    InsertFailed {
        /// Company that failed to insert
        company_name: String,
        /// Backend or agent error message
        cause: String,
    },

    /// Record found but at least one field was missing or invalid
    Incomplete {
        /// Company name, when the model found one
        company_name: Option<String>,
        /// Why the gate refused it
        reasons: Vec<RejectionReason>,
    },

    /// The chunk mentions no company
    NotFound,

    /// The model call or its reply failed
    ExtractionFailed {
        /// Error message
        error: String,
    },

    /// Complete record handed to the agent
    Delegated {
        /// Company the agent was asked to store
        company_name: String,
        /// The agent's closing message
        reply: String,
        /// What each tool call returned
        observations: Vec<String>,
        /// Whether any tool call reported a stored row
        stored: bool,
    },
}

/// Outcome of one chunk, with its position in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    /// 1-based chunk number
    pub index: usize,

    /// Number of chunks in the run
    pub total: usize,

    /// What happened
    pub outcome: ChunkOutcome,
}

/// Counts per outcome kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Chunks processed
    pub chunks: usize,
    /// Rows stored directly
    pub inserted: usize,
    /// Inserts that did not land, directly or through the agent
    pub insert_failed: usize,
    /// Records refused by the gate
    pub incomplete: usize,
    /// Chunks with no company
    pub not_found: usize,
    /// Chunks whose extraction failed
    pub extraction_failed: usize,
    /// Records the agent stored
    pub delegated: usize,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per chunk, in input order
    pub chunks: Vec<ChunkReport>,

    /// Table contents after the run, or why they could not be read
    pub rows: Result<Vec<StoredCompany>, String>,
}

impl RunReport {
    /// Tally the chunk outcomes
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            chunks: self.chunks.len(),
            ..Summary::default()
        };
        for chunk in &self.chunks {
            match chunk.outcome {
                ChunkOutcome::Inserted { .. } => summary.inserted += 1,
                ChunkOutcome::InsertFailed { .. } => summary.insert_failed += 1,
                ChunkOutcome::Incomplete { .. } => summary.incomplete += 1,
                ChunkOutcome::NotFound => summary.not_found += 1,
                ChunkOutcome::ExtractionFailed { .. } => summary.extraction_failed += 1,
                ChunkOutcome::Delegated { stored: true, .. } => summary.delegated += 1,
                ChunkOutcome::Delegated { stored: false, .. } => summary.insert_failed += 1,
            }
        }
        summary
    }
}

/// Runs text through extraction, the gate and the store
pub struct Pipeline<L, S>
where
    L: LlmProvider,
    S: CompanyStore + 'static,
{
    extractor: Extractor<L>,
    gatekeeper: Gatekeeper,
    store: Arc<S>,
    agent: Option<Agent<L>>,
}

impl<L, S> Pipeline<L, S>
where
    L: LlmProvider,
    S: CompanyStore + 'static,
{
    /// Create a pipeline that inserts accepted records directly
    pub fn new(extractor: Extractor<L>, gatekeeper: Gatekeeper, store: Arc<S>) -> Self {
        Self {
            extractor,
            gatekeeper,
            store,
            agent: None,
        }
    }

    /// Route accepted records through the tool-calling agent instead
    ///
    /// The agent shares the extractor's provider and this pipeline's store.
    pub fn with_agent(mut self, max_iterations: usize) -> Self {
        let tool = AddCompanyTool::new(self.store.clone(), self.gatekeeper.clone());
        let agent = Agent::new(self.extractor.provider().clone())
            .tool(tool)
            .max_iterations(max_iterations);
        self.agent = Some(agent);
        self
    }

    /// The store records go to
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Create the table and, when `fresh_start` is set, clear it
    pub async fn prepare(&self, fresh_start: bool) -> Result<(), S::Error> {
        self.store.initialize().await?;
        if fresh_start {
            self.store.reset().await?;
            info!("Cleared existing rows");
        }
        Ok(())
    }

    /// Process all of `text` and read back the table
    pub async fn run(&self, text: &str) -> RunReport {
        self.run_with(text, |_| {}).await
    }

    /// Like `run`, calling `on_chunk` as each chunk finishes
    pub async fn run_with<F>(&self, text: &str, mut on_chunk: F) -> RunReport
    where
        F: FnMut(&ChunkReport),
    {
        let segments = self.extractor.chunk(text);
        let total = segments.len();
        info!(chunks = total, "Split input into chunks");

        let mut chunks = Vec::with_capacity(total);
        for (i, segment) in segments.iter().enumerate() {
            let index = i + 1;
            info!("Processing chunk {}/{}", index, total);

            let report = ChunkReport {
                index,
                total,
                outcome: self.process_chunk(segment).await,
            };
            on_chunk(&report);
            chunks.push(report);
        }

        let rows = self.store.list_all().await.map_err(|e| {
            error!(error = %e, "Error retrieving data");
            e.to_string()
        });

        RunReport { chunks, rows }
    }

    async fn process_chunk(&self, segment: &str) -> ChunkOutcome {
        let record = match self.extractor.extract(segment).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Extraction failed");
                return ChunkOutcome::ExtractionFailed {
                    error: e.to_string(),
                };
            }
        };

        if record.is_empty() {
            info!("No company information found");
            return ChunkOutcome::NotFound;
        }

        let company = match self.gatekeeper.admit(&record) {
            Ok(company) => company,
            Err(reasons) => {
                info!(?reasons, "Incomplete record skipped");
                return ChunkOutcome::Incomplete {
                    company_name: record.company_name,
                    reasons,
                };
            }
        };

        match &self.agent {
            None => match self.store.insert(&company).await {
                InsertOutcome::Added { id, company_name } => {
                    ChunkOutcome::Inserted { id, company_name }
                }
                InsertOutcome::Failed {
                    company_name,
                    cause,
                } => ChunkOutcome::InsertFailed {
                    company_name,
                    cause,
                },
            },
            Some(agent) => match agent.run(&instruction_for(&company)).await {
                Ok(response) => {
                    let stored = response
                        .observations
                        .iter()
                        .any(|observation| is_stored_observation(observation));
                    if !stored {
                        warn!(company = %company.company_name, "Agent did not store the company");
                    }
                    ChunkOutcome::Delegated {
                        company_name: company.company_name,
                        reply: response.content,
                        observations: response.observations,
                        stored,
                    }
                }
                Err(e) => {
                    warn!(error = %e, company = %company.company_name, "Agent failed");
                    ChunkOutcome::InsertFailed {
                        company_name: company.company_name,
                        cause: e.to_string(),
                    }
                }
            },
        }
    }
}
