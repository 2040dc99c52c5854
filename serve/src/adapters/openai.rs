//! OpenAI-compatible chat/completions/models wire shapes (§4.3 "OpenAI
//! chat", "OpenAI completions", "Model discovery").

use serde::Deserialize;
use serde_json::{json, Value};

use gateway_core::{
    ChatMessage, ChatRequest, ChatResponse, CompletionRequest, CompletionResponse, ModelInfo,
    ToolChoice, ToolDefinition, MODEL_ID,
};

use crate::error::HttpError;

use super::parse_role;

#[derive(Debug, Deserialize)]
struct WireChatMessage {
    role: String,
    content: gateway_core::MessageContent,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireTool {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireChatRequest {
    #[serde(default)]
    model: Option<String>,
    messages: Vec<WireChatMessage>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    stream: Option<bool>,
    #[serde(default)]
    multi_segment: Option<bool>,
    #[serde(default)]
    tools: Option<Vec<WireTool>>,
    #[serde(default)]
    tool_choice: Option<Value>,
}

/// Decodes a `POST /v1/chat/completions` body (§4.3 "OpenAI chat").
pub fn decode_chat_request(body: &[u8]) -> Result<ChatRequest, HttpError> {
    let wire: WireChatRequest =
        serde_json::from_slice(body).map_err(|e| HttpError::InvalidBody(e.to_string()))?;

    let messages = wire
        .messages
        .into_iter()
        .map(|m| ChatMessage::new(parse_role(&m.role), m.content.flatten()))
        .collect();

    let tools = wire
        .tools
        .unwrap_or_default()
        .into_iter()
        .map(|t| ToolDefinition {
            name: t.function.name,
            description: t.function.description,
            parameters: t.function.parameters.unwrap_or(Value::Null),
        })
        .collect();

    let tool_choice = wire
        .tool_choice
        .as_ref()
        .map(ToolChoice::from_json)
        .unwrap_or_default();

    Ok(ChatRequest {
        model: wire.model.unwrap_or_else(|| MODEL_ID.to_string()),
        messages,
        temperature: wire.temperature,
        max_tokens: wire.max_tokens,
        stream: wire.stream.unwrap_or(false),
        multi_segment: wire.multi_segment.unwrap_or(true),
        tools,
        tool_choice,
    })
}

/// Encodes a non-streaming chat response as its wire JSON (§3 `ChatResponse`).
pub fn encode_chat_response(response: &ChatResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|_| json!({}))
}

/// `prompt` accepts string or array of strings, joined with `"\n\n"` (§4.3
/// "OpenAI completions").
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
struct WireCompletionRequest {
    #[serde(default)]
    model: Option<String>,
    prompt: WirePrompt,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    stream: Option<bool>,
}

/// Decodes a `POST /v1/completions` body (§4.3 "OpenAI completions").
pub fn decode_completion_request(body: &[u8]) -> Result<CompletionRequest, HttpError> {
    let wire: WireCompletionRequest =
        serde_json::from_slice(body).map_err(|e| HttpError::InvalidBody(e.to_string()))?;
    Ok(CompletionRequest {
        model: wire.model.unwrap_or_else(|| MODEL_ID.to_string()),
        prompt: wire.prompt.flatten(),
        temperature: wire.temperature,
        max_tokens: wire.max_tokens,
        stream: wire.stream.unwrap_or(false),
    })
}

pub fn encode_completion_response(response: &CompletionResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|_| json!({}))
}

/// `GET /v1/models` (§4.3 "Model discovery").
pub fn encode_model_list(model: &ModelInfo) -> Value {
    json!({ "object": "list", "data": [model] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_string_content() {
        let body = br#"{"model":"apple.local","messages":[{"role":"user","content":"hi"}]}"#;
        let req = decode_chat_request(body).unwrap();
        assert_eq!(req.messages[0].content, "hi");
        assert!(req.multi_segment);
        assert!(!req.stream);
    }

    #[test]
    fn decodes_structured_parts_content() {
        let body = br#"{"messages":[{"role":"user","content":[{"type":"text","text":"a"},{"type":"image_url"},{"type":"text","text":"b"}]}]}"#;
        let req = decode_chat_request(body).unwrap();
        assert_eq!(req.messages[0].content, "ab");
    }

    #[test]
    fn decodes_tools_and_tool_choice() {
        let body = br#"{"messages":[{"role":"user","content":"list ."}],"tools":[{"type":"function","function":{"name":"list_directory","description":"list"}}],"tool_choice":{"type":"function","function":{"name":"list_directory"}}}"#;
        let req = decode_chat_request(body).unwrap();
        assert_eq!(req.tools.len(), 1);
        assert_eq!(req.tools[0].name, "list_directory");
        assert_eq!(req.tool_choice, ToolChoice::Function("list_directory".to_string()));
    }

    #[test]
    fn missing_model_defaults_to_apple_local() {
        let body = br#"{"messages":[{"role":"user","content":"hi"}]}"#;
        let req = decode_chat_request(body).unwrap();
        assert_eq!(req.model, "apple.local");
    }

    #[test]
    fn completion_prompt_array_joins_with_double_newline() {
        let body = br#"{"prompt":["a","b"]}"#;
        let req = decode_completion_request(body).unwrap();
        assert_eq!(req.prompt, "a\n\nb");
    }

    #[test]
    fn invalid_json_body_is_rejected() {
        let err = decode_chat_request(b"not json").unwrap_err();
        assert!(matches!(err, HttpError::InvalidBody(_)));
    }
}
