//! Newline-delimited JSON shapes for the Ollama-compatible streaming route
//! (§4.3 "Ollama generate", §4.4) and their line-framing.

use serde::Serialize;

/// One NDJSON line: the serialized value followed by `\n` (§4.4
/// `emitNDJSON(json)`).
pub fn ndjson_line<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let raw = serde_json::to_string(value)?;
    Ok(format!("{raw}\n"))
}

/// One `/api/generate` streaming record (§4.3). `response` is absent on the
/// final `done: true` record.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRecord {
    pub model: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub done: bool,
}

impl GenerateRecord {
    pub fn chunk(model: &str, created_at: &str, response: impl Into<String>) -> Self {
        Self {
            model: model.to_string(),
            created_at: created_at.to_string(),
            response: Some(response.into()),
            done: false,
        }
    }

    pub fn done(model: &str, created_at: &str) -> Self {
        Self {
            model: model.to_string(),
            created_at: created_at.to_string(),
            response: None,
            done: true,
        }
    }
}
