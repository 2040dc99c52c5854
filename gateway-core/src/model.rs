//! Request/response data model (§3).

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::message::ChatMessage;

/// The one model id this gateway ever advertises (§3 invariant: stable).
pub const MODEL_ID: &str = "apple.local";

/// Tool-choice union (§3 `ChatRequest`, REDESIGN notes "tool-choice union").
/// Decodes permissively: unknown strings fall back to `Auto`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolChoice {
    None,
    #[default]
    Auto,
    Required,
    Function(String),
}

impl ToolChoice {
    /// Decodes a `tool_choice` JSON value per §4.3: string `"none"|"auto"|"required"`,
    /// or `{type:"function", function:{name}}`. Anything else falls back to `Auto`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => match s.as_str() {
                "none" => ToolChoice::None,
                "required" => ToolChoice::Required,
                "auto" => ToolChoice::Auto,
                _ => ToolChoice::Auto,
            },
            serde_json::Value::Object(obj) => {
                if obj.get("type").and_then(|t| t.as_str()) == Some("function") {
                    if let Some(name) = obj
                        .get("function")
                        .and_then(|f| f.get("name"))
                        .and_then(|n| n.as_str())
                    {
                        return ToolChoice::Function(name.to_string());
                    }
                }
                ToolChoice::Auto
            }
            _ => ToolChoice::Auto,
        }
    }
}

/// One tool definition supplied in a chat request (§3 `ToolDefinition`).
/// `parameters` (the JSON Schema) is accepted but never consulted by the
/// executor — only `name` and `description` drive the synthetic system
/// prompt in §4.7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Internal chat request, after wire-adapter decoding (§3 `ChatRequest`).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
    pub multi_segment: bool,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: ToolChoice,
}

impl ChatRequest {
    /// `true` when a non-empty tool list is present — forces non-streaming
    /// end-to-end per §4.7 / §9 (REDESIGN: "streaming with tools").
    pub fn forces_tool_orchestration(&self) -> bool {
        !self.tools.is_empty()
    }
}

/// Internal completion request (§3 `CompletionRequest`).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// Generates an opaque, unique response id with the given prefix (e.g.
/// `chatcmpl-`), mirroring OpenAI's id shape without depending on any one
/// collaborator's counter.
pub fn new_response_id(prefix: &str) -> String {
    format!("{prefix}{}", uuid::Uuid::new_v4().simple())
}

/// Current unix-second timestamp, used for `created` fields.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// One choice in a non-streaming chat response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: String,
}

/// Non-streaming chat completion response (§3 `ChatResponse`).
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub object: &'static str,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    pub fn single(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_response_id("chatcmpl-"),
            object: "chat.completion",
            created: unix_now(),
            model: model.into(),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage::new(crate::message::Role::Assistant, content),
                finish_reason: "stop".to_string(),
            }],
        }
    }
}

/// One choice in a non-streaming text completion response.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionChoice {
    pub text: String,
    pub index: u32,
    pub finish_reason: String,
}

/// Non-streaming text completion response (§3 `CompletionResponse`).
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResponse {
    pub id: String,
    pub object: &'static str,
    pub created: u64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: new_response_id("cmpl-"),
            object: "text_completion",
            created: unix_now(),
            model: model.into(),
            choices: vec![CompletionChoice {
                text: text.into(),
                index: 0,
                finish_reason: "stop".to_string(),
            }],
        }
    }
}

/// The one model entry this gateway ever advertises (§3 `Model`).
/// `created` is captured once at process start by the caller and passed in;
/// this type itself carries no interior mutability.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: &'static str,
    pub created: u64,
    pub owned_by: &'static str,
}

impl ModelInfo {
    pub fn new(created: u64) -> Self {
        Self {
            id: MODEL_ID.to_string(),
            object: "model",
            created,
            owned_by: "system",
        }
    }
}

/// Tool-call envelope the model is asked to emit for tool use (§4.7, GLOSSARY).
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallEnvelope {
    pub tool_call: ToolCallBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallBody {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}
