//! Chat message types and the polymorphic `content` flattening (§3, REDESIGN
//! notes "per-message polymorphic content").
//!
//! The wire adapters in `serve` decode OpenAI's four content shapes into
//! [`MessageContent`]; [`MessageContent::flatten`] is the one place that
//! collapses all four into the single string the rest of the engine works
//! with.

use serde::{Deserialize, Serialize};

/// Role of a chat message (§3 `ChatMessage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One structured content part, e.g. `{"type": "text", "text": "hi"}`.
/// Non-text parts (images, etc.) are accepted on the wire and ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

/// Tagged union over the four content shapes OpenAI's wire format accepts
/// for `messages[*].content`. Deserializes permissively via `serde_json`
/// untagged matching, then [`flatten`](MessageContent::flatten) collapses
/// every variant to one string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    PlainString(String),
    StringArray(Vec<String>),
    PartsArray(Vec<ContentPart>),
    SinglePart(ContentPart),
}

impl MessageContent {
    /// Collapses any of the four wire shapes into one string, per §8's
    /// invariant that equivalent content shapes yield the same flattened
    /// string.
    pub fn flatten(&self) -> String {
        match self {
            MessageContent::PlainString(s) => s.clone(),
            MessageContent::StringArray(parts) => parts.join("\n"),
            MessageContent::PartsArray(parts) => parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join(""),
            MessageContent::SinglePart(part) => part.text.clone().unwrap_or_default(),
        }
    }
}

/// A single chat turn (§3 `ChatMessage`). Lives only for the duration of
/// one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_plain_string() {
        let c = MessageContent::PlainString("hi".into());
        assert_eq!(c.flatten(), "hi");
    }

    #[test]
    fn flatten_string_array_joins_with_newline() {
        let c = MessageContent::StringArray(vec!["a".into(), "b".into()]);
        assert_eq!(c.flatten(), "a\nb");
    }

    #[test]
    fn flatten_parts_array_concatenates_text_and_ignores_non_text() {
        let c = MessageContent::PartsArray(vec![
            ContentPart {
                kind: "text".into(),
                text: Some("a".into()),
            },
            ContentPart {
                kind: "image_url".into(),
                text: None,
            },
            ContentPart {
                kind: "text".into(),
                text: Some("b".into()),
            },
        ]);
        assert_eq!(c.flatten(), "ab");
    }

    #[test]
    fn flatten_single_part() {
        let c = MessageContent::SinglePart(ContentPart {
            kind: "text".into(),
            text: Some("solo".into()),
        });
        assert_eq!(c.flatten(), "solo");
    }

    #[test]
    fn equivalent_shapes_flatten_the_same() {
        let a = MessageContent::PlainString("hello".into());
        let b = MessageContent::SinglePart(ContentPart {
            kind: "text".into(),
            text: Some("hello".into()),
        });
        assert_eq!(a.flatten(), b.flatten());
    }
}
