//! OpenAI Provider Implementation
//!
//! Talks to the chat completions endpoint directly over reqwest.
//!
//! # Features
//!
//! - Strict `json_schema` response format for structured extraction
//! - Function tools with `tool_choice: "auto"` for the agent loop
//! - Retry logic with exponential backoff on network errors, 429 and 5xx
//! - Configurable base URL for OpenAI-compatible servers
//!
//! # Examples
//!
//! ```no_run
//! use registrar_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("sk-...", "gpt-4o-mini")
//!     .unwrap()
//!     .with_max_retries(5);
//! ```

use crate::{
    backoff_delay, AssistantTurn, ChatMessage, LlmError, LlmProvider, OutputSchema, Role,
    ToolCallRequest, ToolSpec,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for extraction and agent calls
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for a single HTTP request
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per call
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// OpenAI chat completions provider
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a provider for `model` authenticated with `api_key`
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: 0.0,
            max_retries: DEFAULT_MAX_RETRIES,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    /// Point at an OpenAI-compatible server
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sampling temperature (0.0 for deterministic extraction)
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Replace the per-request HTTP timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_once(&self, body: &Value) -> Result<Value, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                LlmError::Unauthorized(error_text)
            }
            reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(self.model.clone()),
            s if s.is_server_error() => {
                LlmError::Communication(format!("HTTP {}: {}", s, error_text))
            }
            s => LlmError::InvalidResponse(format!("HTTP {}: {}", s, error_text)),
        })
    }

    async fn post_chat(&self, body: &Value) -> Result<Value, LlmError> {
        let max_attempts = self.max_retries.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.post_once(body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempts < max_attempts => {
                    let delay = backoff_delay(attempts);
                    warn!(
                        attempt = attempts,
                        delay_secs = delay.as_secs(),
                        error = %e,
                        "OpenAI request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}

fn first_message(response: &Value) -> Result<&Value, LlmError> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| LlmError::InvalidResponse("No message in response".to_string()))
}

/// Message in chat completions wire format.
fn to_wire(message: &ChatMessage) -> Value {
    let mut value = json!({
        "role": message.role,
        "content": message.content,
    });

    if !message.tool_calls.is_empty() {
        value["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": { "name": call.name, "arguments": call.arguments }
                })
            })
            .collect();
    }
    if message.role == Role::Tool {
        if let Some(id) = &message.tool_call_id {
            value["tool_call_id"] = json!(id);
        }
    }

    value
}

fn parse_tool_call(value: &Value) -> Option<ToolCallRequest> {
    let function = value.get("function")?;
    Some(ToolCallRequest::new(
        value.get("id")?.as_str()?,
        function.get("name")?.as_str()?,
        function.get("arguments")?.as_str()?,
    ))
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema,
    ) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "strict": true,
                    "schema": schema.schema
                }
            }
        });

        debug!(model = %self.model, user_len = user.len(), "Sending structured request");
        let response = self.post_chat(&body).await?;
        let message = first_message(&response)?;

        if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
            return Err(LlmError::InvalidResponse(format!("Model refused: {}", refusal)));
        }

        message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LlmError::InvalidResponse("Response has no content".to_string()))
    }

    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<AssistantTurn, LlmError> {
        let mut body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages.iter().map(to_wire).collect::<Vec<_>>(),
        });
        if !tools.is_empty() {
            body["tools"] = tools.iter().map(ToolSpec::to_function_format).collect();
            body["tool_choice"] = json!("auto");
        }

        debug!(
            model = %self.model,
            message_count = messages.len(),
            tool_count = tools.len(),
            "Sending tool-calling request"
        );
        let response = self.post_chat(&body).await?;
        let message = first_message(&response)?;

        let tool_calls = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|call| {
                        let parsed = parse_tool_call(call);
                        if parsed.is_none() {
                            warn!("Failed to parse tool call: {:?}", call);
                        }
                        parsed
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(AssistantTurn {
            content: message
                .get("content")
                .and_then(Value::as_str)
                .map(str::to_string),
            tool_calls,
        })
    }
}
