//! Server-Sent Events shapes for the two OpenAI-compatible streaming routes
//! (§4.4 "SSE for chat.completions streaming" / "SSE for text completions
//! streaming") and their line-framing.

use serde::Serialize;

/// One line of SSE framing: `"data: " + raw + "\n\n"` (§4.4 `emitSSE(raw)`).
pub fn sse_line(raw: &str) -> String {
    format!("data: {raw}\n\n")
}

/// Serializes `value` then frames it as one SSE line (§4.4 `emitSSE(json)`).
pub fn sse_json_line<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let raw = serde_json::to_string(value)?;
    Ok(sse_line(&raw))
}

/// The literal terminating sentinel for every OpenAI-compatible SSE stream
/// (§4.4, §8 testable property).
pub const DONE_LINE: &str = "data: [DONE]\n\n";

/// Delta payload inside one chat-completion streaming chunk. A terminal
/// event carries an empty delta (§3 invariant, §4.4).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatChunkChoice {
    pub index: u32,
    pub delta: ChatDelta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// One `chat.completion.chunk` SSE event (§4.4).
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: &'static str,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChunkChoice>,
}

impl ChatCompletionChunk {
    /// A content delta event: one chunk of generated text.
    pub fn delta(id: &str, created: u64, model: &str, content: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            object: "chat.completion.chunk",
            created,
            model: model.to_string(),
            choices: vec![ChatChunkChoice {
                index: 0,
                delta: ChatDelta {
                    content: Some(content.into()),
                },
                finish_reason: None,
            }],
        }
    }

    /// The terminal event: empty delta, `finish_reason: "stop"` (§4.4, §8).
    pub fn terminal(id: &str, created: u64, model: &str) -> Self {
        Self {
            id: id.to_string(),
            object: "chat.completion.chunk",
            created,
            model: model.to_string(),
            choices: vec![ChatChunkChoice {
                index: 0,
                delta: ChatDelta::default(),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextChunkChoice {
    pub text: String,
    pub index: u32,
    pub finish_reason: Option<String>,
}

/// One `text_completion.chunk` SSE event (§4.4).
#[derive(Debug, Clone, Serialize)]
pub struct TextCompletionChunk {
    pub id: String,
    pub object: &'static str,
    pub created: u64,
    pub model: String,
    pub choices: Vec<TextChunkChoice>,
}

impl TextCompletionChunk {
    pub fn delta(id: &str, created: u64, model: &str, text: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            object: "text_completion.chunk",
            created,
            model: model.to_string(),
            choices: vec![TextChunkChoice {
                text: text.into(),
                index: 0,
                finish_reason: None,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_line_framing() {
        assert_eq!(sse_line("hello"), "data: hello\n\n");
    }

    #[test]
    fn chat_chunk_delta_has_content_and_no_finish_reason() {
        let chunk = ChatCompletionChunk::delta("chatcmpl-1", 1000, "apple.local", "hi");
        let line = sse_json_line(&chunk).unwrap();
        assert!(line.starts_with("data: {"));
        assert!(line.ends_with("\n\n"));
        assert!(line.contains("\"content\":\"hi\""));
        assert!(!line.contains("finish_reason"));
    }

    #[test]
    fn chat_chunk_terminal_has_empty_delta_and_stop_reason() {
        let chunk = ChatCompletionChunk::terminal("chatcmpl-1", 1000, "apple.local");
        let v = serde_json::to_value(&chunk).unwrap();
        assert_eq!(v["choices"][0]["delta"], serde_json::json!({}));
        assert_eq!(v["choices"][0]["finish_reason"], "stop");
    }

    #[test]
    fn done_line_is_the_literal_sentinel() {
        assert_eq!(DONE_LINE, "data: [DONE]\n\n");
    }
}
