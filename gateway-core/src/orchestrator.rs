//! Tool-call orchestrator (§4.7): the round-trip state machine that lets the
//! model invoke a sandboxed file operation through a [`ToolExecutor`].
//!
//! Triggered by the router whenever a chat request carries a non-empty
//! `tools` list; forces non-streaming behavior end-to-end (§9 REDESIGN FLAG
//! "streaming with tools"). Only a single tool round-trip is performed per
//! request — no recursive tool chains.

use crate::budget::build_prompt;
use crate::generator::{generate_or_fallback, Generator};
use crate::message::{ChatMessage, Role};
use crate::model::{ToolCallEnvelope, ToolDefinition};
use crate::tools::{ToolCatalogEntry, ToolExecutor};

const ENVELOPE_INSTRUCTIONS: &str = "To call a tool, reply ONLY with a single JSON object in \
this exact format: {\"tool_call\": {\"name\": \"<tool-name>\", \"arguments\": { ... }}}";

/// Result of running the orchestration loop for one request.
#[derive(Debug, Clone)]
pub struct OrchestrationOutcome {
    /// The text to return as the final assistant answer.
    pub content: String,
    /// `Some(tool_name)` when a tool was actually dispatched during this run.
    pub tool_invoked: Option<String>,
}

/// Builds the synthetic system message (§4.7 step 1): the envelope
/// instructions, the caller-supplied `tools`, and the fixed built-in catalog.
fn build_tool_system_message(tools: &[ToolDefinition], catalog: &[ToolCatalogEntry]) -> String {
    let mut out = String::new();
    out.push_str(ENVELOPE_INSTRUCTIONS);
    out.push_str("\n\nAvailable tools:\n");
    for t in tools {
        let desc = t.description.as_deref().unwrap_or("");
        out.push_str(&format!("- {}: {}\n", t.name, desc));
    }
    out.push_str("\nBuilt-in tools (always available):\n");
    for entry in catalog {
        out.push_str(&format!("- {}: {}\n", entry.name, entry.description));
    }
    out
}

/// Parses the model's reply into a tool-call envelope (§4.7 step 3): first
/// tries strict whole-string JSON decode, then falls back to extracting the
/// substring between the first `{` and the last `}`.
fn parse_tool_envelope(reply: &str) -> Option<ToolCallEnvelope> {
    let trimmed = reply.trim();
    if let Ok(env) = serde_json::from_str::<ToolCallEnvelope>(trimmed) {
        return Some(env);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<ToolCallEnvelope>(&trimmed[start..=end]).ok()
}

/// Runs the full tool-call orchestration loop (§4.7) for one chat request.
///
/// `messages` is the caller's chat history (without the synthetic system
/// message — this function prepends it). Returns the final answer text,
/// always with an implied `finish_reason: "stop"` (the caller attaches that
/// to the wire response).
pub async fn run_tool_orchestration(
    generator: &dyn Generator,
    executor: &dyn ToolExecutor,
    messages: &[ChatMessage],
    tools: &[ToolDefinition],
) -> OrchestrationOutcome {
    let system_text = build_tool_system_message(tools, executor.catalog());
    let mut history = Vec::with_capacity(messages.len() + 1);
    history.push(ChatMessage::new(Role::System, system_text));
    history.extend(messages.iter().cloned());

    let prompt = build_prompt(generator, &history).await;
    let reply = generate_or_fallback(
        generator,
        "Respond to the conversation above, following the tool-call protocol if a tool is needed.",
        &prompt,
    )
    .await;

    let Some(envelope) = parse_tool_envelope(&reply) else {
        // §4.7 step 5: no envelope found on the first generation, treat the
        // reply itself as the final answer.
        return OrchestrationOutcome {
            content: reply,
            tool_invoked: None,
        };
    };

    tracing::info!(tool = %envelope.tool_call.name, "dispatching tool call from orchestrator");
    let result = executor
        .execute(&envelope.tool_call.name, &envelope.tool_call.arguments)
        .await;
    let result_json = serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string());

    history.push(ChatMessage::new(Role::Assistant, reply));
    history.push(ChatMessage::new(Role::Tool, result_json));

    let prompt2 = build_prompt(generator, &history).await;
    let final_answer = generate_or_fallback(
        generator,
        "Using the tool result above, give the final answer to the user in natural language.",
        &prompt2,
    )
    .await;

    OrchestrationOutcome {
        content: final_answer,
        tool_invoked: Some(envelope.tool_call.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockGenerator;
    use crate::tools::{BuiltinToolExecutor, PathPolicy};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    fn msg(role: Role, content: &str) -> ChatMessage {
        ChatMessage::new(role, content)
    }

    #[tokio::test]
    async fn no_envelope_in_reply_is_treated_as_final_answer() {
        let gen = MockGenerator::always_replies("Just a normal answer, no tool needed.");
        let dir = tempfile::tempdir().unwrap();
        let executor = BuiltinToolExecutor::new(PathPolicy::for_test(dir.path()));
        let outcome = run_tool_orchestration(
            &gen,
            &executor,
            &[msg(Role::User, "hello")],
            &[ToolDefinition {
                name: "list_directory".to_string(),
                description: None,
                parameters: Value::Null,
            }],
        )
        .await;
        assert_eq!(outcome.content, "Just a normal answer, no tool needed.");
        assert!(outcome.tool_invoked.is_none());
    }

    /// A generator that returns a tool-call envelope once, then a plain
    /// natural-language reply on the second call.
    struct TwoTurnGenerator {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl Generator for TwoTurnGenerator {
        async fn generate(&self, _instructions: &str, _prompt: &str) -> Result<String, String> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == 1 {
                Ok(r#"{"tool_call": {"name": "list_directory", "arguments": {"path": "."}}}"#
                    .to_string())
            } else {
                Ok("Here is a summary of the directory contents.".to_string())
            }
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn envelope_reply_dispatches_tool_and_returns_second_generation() {
        let gen = TwoTurnGenerator {
            calls: Mutex::new(0),
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
        let executor = BuiltinToolExecutor::new(PathPolicy::for_test(dir.path()));
        let outcome = run_tool_orchestration(
            &gen,
            &executor,
            &[msg(Role::User, "list .")],
            &[ToolDefinition {
                name: "list_directory".to_string(),
                description: Some("list files".to_string()),
                parameters: Value::Null,
            }],
        )
        .await;
        assert_eq!(outcome.tool_invoked.as_deref(), Some("list_directory"));
        assert_eq!(outcome.content, "Here is a summary of the directory contents.");
        assert_eq!(*gen.calls.lock().unwrap(), 2);
    }

    #[test]
    fn parse_tool_envelope_handles_surrounding_prose() {
        let reply = "Sure, here goes: {\"tool_call\": {\"name\": \"read_file\", \"arguments\": {\"path\": \"a.txt\"}}} thanks";
        let env = parse_tool_envelope(reply).unwrap();
        assert_eq!(env.tool_call.name, "read_file");
    }

    #[test]
    fn parse_tool_envelope_returns_none_for_plain_text() {
        assert!(parse_tool_envelope("just some plain text, no json here").is_none());
    }
}
