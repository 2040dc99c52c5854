//! Ollama-compatible chat/generate/tags/version/ps wire shapes (§4.3
//! "Ollama chat", "Ollama generate", "Ollama tags").

use serde::Deserialize;
use serde_json::{json, Value};

use gateway_core::{ChatMessage, ChatRequest, CompletionRequest, MODEL_ID};

use crate::error::HttpError;

use super::parse_role;

#[derive(Debug, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct WireOptions {
    temperature: Option<f32>,
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireChatRequest {
    #[serde(default)]
    model: Option<String>,
    messages: Vec<WireMessage>,
    #[serde(default)]
    #[allow(dead_code)]
    stream: Option<bool>,
    #[serde(default)]
    options: Option<WireOptions>,
}

/// Decodes `POST /api/chat` (§4.3 "Ollama chat"). Always translated as
/// non-streaming, regardless of the wire `stream` flag (§9 REDESIGN FLAG
/// "Ollama chat streaming").
pub fn decode_chat_request(body: &[u8]) -> Result<ChatRequest, HttpError> {
    let wire: WireChatRequest =
        serde_json::from_slice(body).map_err(|e| HttpError::InvalidBody(e.to_string()))?;
    let options = wire.options.unwrap_or_default();
    let messages = wire
        .messages
        .into_iter()
        .map(|m| ChatMessage::new(parse_role(&m.role), m.content))
        .collect();
    Ok(ChatRequest {
        model: wire.model.unwrap_or_else(|| MODEL_ID.to_string()),
        messages,
        temperature: options.temperature,
        max_tokens: options.num_predict,
        stream: false,
        multi_segment: false,
        tools: Vec::new(),
        tool_choice: Default::default(),
    })
}

/// Encodes the non-streaming `/api/chat` response (§4.3).
pub fn encode_chat_response(model: &str, created_at: &str, content: &str) -> Value {
    json!({
        "model": model,
        "created_at": created_at,
        "message": { "role": "assistant", "content": content },
        "done": true,
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePrompt {
    Single(String),
    Many(Vec<String>),
}

impl WirePrompt {
    fn flatten(&self) -> String {
        match self {
            WirePrompt::Single(s) => s.clone(),
            WirePrompt::Many(parts) => parts.join("\n\n"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireGenerateRequest {
    #[serde(default)]
    model: Option<String>,
    prompt: WirePrompt,
    #[serde(default)]
    stream: Option<bool>,
}

/// Decodes `POST /api/generate` (§4.3 "Ollama generate": "same shape as
/// OpenAI completions on input").
pub fn decode_generate_request(body: &[u8]) -> Result<CompletionRequest, HttpError> {
    let wire: WireGenerateRequest =
        serde_json::from_slice(body).map_err(|e| HttpError::InvalidBody(e.to_string()))?;
    Ok(CompletionRequest {
        model: wire.model.unwrap_or_else(|| MODEL_ID.to_string()),
        prompt: wire.prompt.flatten(),
        temperature: None,
        max_tokens: None,
        stream: wire.stream.unwrap_or(false),
    })
}

/// Non-streaming `/api/generate` response.
pub fn encode_generate_response(model: &str, created_at: &str, response: &str) -> Value {
    json!({
        "model": model,
        "created_at": created_at,
        "response": response,
        "done": true,
    })
}

/// `GET /api/tags` (§4.3 "Ollama tags").
pub fn encode_tags(modified_at: &str) -> Value {
    json!({
        "models": [{
            "name": "apple.local:latest",
            "modified_at": modified_at,
            "size": null,
            "digest": null,
            "details": {
                "format": "system",
                "family": "apple-intelligence",
                "families": ["apple-intelligence"],
                "parameter_size": null,
                "quantization_level": null,
            },
        }]
    })
}

/// `GET /api/version`.
pub fn encode_version() -> Value {
    json!({ "version": "0.1.0" })
}

/// `GET /api/ps`.
pub fn encode_ps() -> Value {
    json!({ "models": [] })
}
