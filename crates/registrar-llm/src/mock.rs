//! Mock LLM provider for deterministic testing

use crate::{AssistantTurn, ChatMessage, LlmError, LlmProvider, OutputSchema, ToolSpec};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Error,
    Delayed(Duration, String),
}

/// Mock LLM provider for deterministic testing
///
/// Structured calls are answered by the first registered pattern contained
/// in the user message, falling back to the default response. Tool-calling
/// turns are replayed from a queue; once it is empty the default response is
/// returned as the final answer.
///
/// Clones share state, so a test can keep a handle to inspect call counts
/// after moving the provider into an extractor or agent.
///
/// # Examples
///
/// ```
/// use registrar_llm::{LlmProvider, MockProvider, OutputSchema};
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("Acme", r#"{"company_name": "Acme"}"#);
///
/// let schema = OutputSchema { name: "T".into(), schema: serde_json::json!({}) };
/// let reply = provider.generate_structured("", "Acme was founded...", &schema).await.unwrap();
/// assert_eq!(reply, r#"{"company_name": "Acme"}"#);
/// assert_eq!(provider.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, Scripted)>>>,
    turns: Arc<Mutex<VecDeque<AssistantTurn>>>,
    call_count: Arc<Mutex<usize>>,
    last_messages: Arc<Mutex<Vec<ChatMessage>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            turns: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer user messages containing `pattern` with `response`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((pattern.into(), Scripted::Reply(response.into())));
    }

    /// Fail user messages containing `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        lock(&self.responses).push((pattern.into(), Scripted::Error));
    }

    /// Answer user messages containing `pattern` only after `delay`
    pub fn add_delayed_response(
        &mut self,
        pattern: impl Into<String>,
        delay: Duration,
        response: impl Into<String>,
    ) {
        lock(&self.responses).push((pattern.into(), Scripted::Delayed(delay, response.into())));
    }

    /// Queue the next tool-calling turn
    pub fn push_turn(&mut self, turn: AssistantTurn) {
        lock(&self.turns).push_back(turn);
    }

    /// Get the number of provider calls of either shape
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Message history passed to the most recent tool-calling call
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        lock(&self.last_messages).clone()
    }

    fn scripted_for(&self, user: &str) -> Option<Scripted> {
        lock(&self.responses)
            .iter()
            .find(|(pattern, _)| user.contains(pattern.as_str()))
            .map(|(_, scripted)| scripted.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn generate_structured(
        &self,
        _system: &str,
        user: &str,
        _schema: &OutputSchema,
    ) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;

        match self.scripted_for(user) {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Error) => Err(LlmError::Other("Mock error".to_string())),
            Some(Scripted::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Ok(self.default_response.clone()),
        }
    }

    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSpec],
    ) -> Result<AssistantTurn, LlmError> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_messages) = messages.to_vec();

        let next = lock(&self.turns).pop_front();
        Ok(next.unwrap_or_else(|| AssistantTurn::text(self.default_response.clone())))
    }
}
