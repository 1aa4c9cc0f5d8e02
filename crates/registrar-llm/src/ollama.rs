//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local chat API for running extraction
//! against a local model.
//!
//! # Features
//!
//! - Async HTTP communication with `/api/chat`
//! - Structured output through the `format` field
//! - Native tool calling through the `tools` field
//! - Retry logic with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use registrar_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1").unwrap();
//! ```

use crate::{
    backoff_delay, AssistantTurn, ChatMessage, LlmError, LlmProvider, OutputSchema, Role,
    ToolCallRequest, ToolSpec,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize, Deserialize, Default)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunction,
}

#[derive(Serialize, Deserialize)]
struct OllamaFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "qwen2.5")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: 0.0,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a new Ollama provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the per-request HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Send one chat request, retrying with exponential backoff
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Response format is invalid
    async fn chat(&self, request: &OllamaChatRequest<'_>) -> Result<OllamaMessage, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let max_attempts = self.max_retries.max(1);
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < max_attempts {
            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return response
                            .json::<OllamaChatResponse>()
                            .await
                            .map(|r| r.message)
                            .map_err(|e| {
                                LlmError::InvalidResponse(format!(
                                    "Failed to parse response: {}",
                                    e
                                ))
                            });
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < max_attempts {
                let delay = backoff_delay(attempts);
                warn!(attempt = attempts, "Ollama request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    fn request<'a>(
        &'a self,
        messages: Vec<OllamaMessage>,
        format: Option<&'a Value>,
        tools: Vec<Value>,
    ) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format,
            tools,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        }
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn to_wire(message: &ChatMessage) -> OllamaMessage {
    OllamaMessage {
        role: role_name(message.role).to_string(),
        content: message.content.clone().unwrap_or_default(),
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| OllamaToolCall {
                function: OllamaFunction {
                    name: call.name.clone(),
                    // Ollama takes arguments as an object, not JSON text
                    arguments: serde_json::from_str(&call.arguments)
                        .unwrap_or(Value::String(call.arguments.clone())),
                },
            })
            .collect(),
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema,
    ) -> Result<String, LlmError> {
        let messages = vec![
            OllamaMessage {
                role: "system".to_string(),
                content: system.to_string(),
                ..Default::default()
            },
            OllamaMessage {
                role: "user".to_string(),
                content: user.to_string(),
                ..Default::default()
            },
        ];

        debug!(model = %self.model, user_len = user.len(), "Sending structured request to Ollama");
        let reply = self
            .chat(&self.request(messages, Some(&schema.schema), Vec::new()))
            .await?;
        Ok(reply.content)
    }

    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<AssistantTurn, LlmError> {
        let wire = messages.iter().map(to_wire).collect();
        let tool_defs = tools.iter().map(ToolSpec::to_function_format).collect();

        let reply = self.chat(&self.request(wire, None, tool_defs)).await?;

        // Ollama does not assign call ids; number them per turn
        let tool_calls = reply
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, call)| {
                let arguments = match call.function.arguments {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                ToolCallRequest::new(format!("call_{}", i), call.function.name, arguments)
            })
            .collect();

        Ok(AssistantTurn {
            content: Some(reply.content).filter(|c| !c.is_empty()),
            tool_calls,
        })
    }
}
