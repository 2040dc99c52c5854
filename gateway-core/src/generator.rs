//! Generator façade (§4.6, "the language-model backend itself" in §1).
//!
//! Wraps the opaque on-device model with an availability gate and a
//! graceful fallback string. Mirrors the teacher's `LlmClient` trait: a
//! minimal async boundary the rest of the engine calls through, with a
//! fixed mock implementation for tests.

use async_trait::async_trait;

/// Fallback content returned (as a normal 200 response, not an error — §7)
/// when the backend's availability probe fails.
pub const UNAVAILABLE_FALLBACK_PREFIX: &str = "(Local fallback) Apple Intelligence unavailable: ";

/// Generic friendly fallback used mid-stream when the backend errors after
/// already starting to produce output (§4.6 termination, §7).
pub const MID_STREAM_FALLBACK: &str =
    "\n\n(Local fallback) Apple Intelligence had trouble continuing this response.";

/// The on-device text-generation backend, treated as an opaque collaborator
/// (§1 Out of scope: "The language-model backend itself").
///
/// Implementations are injected at the composition root (`cli`); `serve`
/// and `gateway-core` depend only on this trait.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Runs one bounded generation: `instructions` is a system-level
    /// directive (tool catalog, summarization instructions, continuation
    /// instructions); `prompt` is the budgeted conversation text. Returns
    /// the model's raw text reply.
    async fn generate(&self, instructions: &str, prompt: &str) -> Result<String, String>;

    /// Availability probe (§1, §7). Called before each top-level
    /// generation; summarization (§4.5) and multi-segment rounds (§4.6)
    /// treat a `false` here the same way.
    async fn is_available(&self) -> bool;
}

/// Runs `generator.generate`, translating backend unavailability into the
/// graceful fallback string instead of propagating an error (§7).
pub async fn generate_or_fallback(
    generator: &dyn Generator,
    instructions: &str,
    prompt: &str,
) -> String {
    if !generator.is_available().await {
        tracing::warn!("generator unavailable, using fallback response");
        return format!("{UNAVAILABLE_FALLBACK_PREFIX}the on-device model is not ready.");
    }
    match generator.generate(instructions, prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "generator call failed, using fallback response");
            format!("{UNAVAILABLE_FALLBACK_PREFIX}{e}")
        }
    }
}

/// Deterministic mock used by tests and by `cli` when no real backend is
/// wired. `available` toggles the probe; `reply` is echoed verbatim from
/// `generate`, or `reply_fn` derives a reply from the prompt when set.
pub struct MockGenerator {
    pub available: bool,
    pub reply: String,
}

impl MockGenerator {
    pub fn always_replies(reply: impl Into<String>) -> Self {
        Self {
            available: true,
            reply: reply.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            reply: String::new(),
        }
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String, String> {
        Ok(self.reply.clone())
    }

    async fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generate_or_fallback_returns_reply_when_available() {
        let g = MockGenerator::always_replies("hello");
        let out = generate_or_fallback(&g, "instr", "prompt").await;
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn generate_or_fallback_uses_prefix_when_unavailable() {
        let g = MockGenerator::unavailable();
        let out = generate_or_fallback(&g, "instr", "prompt").await;
        assert!(out.starts_with(UNAVAILABLE_FALLBACK_PREFIX));
    }
}
