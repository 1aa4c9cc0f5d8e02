//! Tool-calling reasoning loop.

use crate::error::AgentError;
use crate::tools::Tool;
use registrar_domain::NewCompany;
use registrar_llm::{ChatMessage, LlmProvider, ToolCallRequest, ToolSpec};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default cap on model round trips per instruction
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

const SYSTEM_PROMPT: &str = "You are a careful data-entry assistant. \
When asked to store a company, call the add_company_to_db tool with exactly the \
company name, founding date (YYYY-MM-DD) and founders you were given. \
Never invent values. After the tool answers, reply with one short sentence \
confirming or denying that the company was stored.";

/// Natural-language instruction describing one validated record
pub fn instruction_for(company: &NewCompany) -> String {
    format!(
        "A new company has been identified. Please add it to the database. \
         Company Name: {}, Founding Date: {}, Founders: {}",
        company.company_name,
        company.founding_date.format("%Y-%m-%d"),
        company.founders_joined()
    )
}

/// Final result of one agent run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    /// The model's closing message
    pub content: String,

    /// Names of the tools called, in order
    pub tool_calls_made: Vec<String>,

    /// What each tool call returned, in the same order
    pub observations: Vec<String>,

    /// Model round trips used
    pub iterations: usize,
}

/// Reasoning loop over `LlmProvider::chat_with_tools`
pub struct Agent<L: LlmProvider> {
    llm: Arc<L>,
    tools: Vec<Box<dyn Tool>>,
    max_iterations: usize,
}

impl<L: LlmProvider> Agent<L> {
    /// Create an agent with no tools
    pub fn new(llm: Arc<L>) -> Self {
        Self {
            llm,
            tools: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Register a tool
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Set the iteration cap
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run one instruction to completion
    pub async fn run(&self, instruction: &str) -> Result<AgentResponse, AgentError> {
        if self.max_iterations == 0 {
            return Err(AgentError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        let specs: Vec<ToolSpec> = self.tools.iter().map(|t| t.spec()).collect();
        let mut messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(instruction),
        ];
        let mut tool_calls_made = Vec::new();
        let mut observations = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                warn!(max_iterations = self.max_iterations, "Agent reached max iterations");
                return Err(AgentError::MaxIterations(self.max_iterations));
            }

            debug!(
                iteration = iterations,
                model = self.llm.model_name(),
                message_count = messages.len(),
                "Agent iteration starting"
            );

            let turn = self.llm.chat_with_tools(&messages, &specs).await?;

            if !turn.has_tool_calls() {
                let content = turn.content.unwrap_or_default();
                info!(
                    iterations,
                    tool_calls_total = tool_calls_made.len(),
                    "Agent finished"
                );
                return Ok(AgentResponse {
                    content,
                    tool_calls_made,
                    observations,
                    iterations,
                });
            }

            messages.push(ChatMessage::from_turn(&turn));

            for call in &turn.tool_calls {
                info!(tool = %call.name, id = %call.id, "Executing tool call");
                let result = self.execute_tool(call).await;

                tool_calls_made.push(call.name.clone());
                observations.push(result.clone());
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
            }
        }
    }

    async fn execute_tool(&self, call: &ToolCallRequest) -> String {
        match self.tools.iter().find(|t| t.name() == call.name) {
            Some(tool) => tool.invoke(&call.arguments).await,
            None => {
                warn!(tool = %call.name, "Unknown tool requested");
                format!("Error: Unknown tool '{}'", call.name)
            }
        }
    }
}
