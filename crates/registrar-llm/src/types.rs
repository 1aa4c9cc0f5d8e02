//! Provider-neutral chat and tool-calling types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation
    System,
    /// The human (or pipeline) side
    User,
    /// The model
    Assistant,
    /// Result of a tool invocation
    Tool,
}

/// One message in a tool-calling conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message
    pub role: Role,

    /// Text content, absent on assistant turns that only call tools
    pub content: Option<String>,

    /// Tool calls requested by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    /// Id of the call a tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Assistant turn echoed back into history so the tool results line up
    pub fn from_turn(turn: &AssistantTurn) -> Self {
        Self {
            role: Role::Assistant,
            content: turn.content.clone(),
            tool_calls: turn.tool_calls.clone(),
            tool_call_id: None,
        }
    }

    /// Result of executing one tool call
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    /// Unique tool name
    pub name: String,

    /// What the tool does, shown to the model
    pub description: String,

    /// JSON schema for the arguments object
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    /// Function-tool wire format shared by OpenAI and Ollama.
    pub fn to_function_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters
            }
        })
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Call id, echoed back on the matching tool message
    pub id: String,

    /// Name of the requested tool
    pub name: String,

    /// Arguments as JSON text
    pub arguments: String,
}

impl ToolCallRequest {
    /// Create a call request
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse arguments into a typed struct.
    pub fn parse_args<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.arguments)
    }
}

/// One model reply in a tool-calling conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssistantTurn {
    /// Text content, if any
    pub content: Option<String>,

    /// Requested tool calls; empty means the model is done
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantTurn {
    /// Final answer with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Turn that only requests tool calls
    pub fn calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// Whether the model asked for any tool to run
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
