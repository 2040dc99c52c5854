//! Context budgeter (§4.5): shrinks an oversized chat history into a single
//! prompt string that fits a fixed input-token ceiling.

use crate::generator::Generator;
use crate::message::{ChatMessage, Role};

/// Heuristic token ceiling for the whole prompt.
pub const MAX_CONTEXT_TOKENS: usize = 4000;
/// Tokens reserved for the model's own output.
pub const RESERVE_FOR_OUTPUT: usize = 512;
/// How many of the most recent messages are always kept verbatim.
const KEEP_RECENT: usize = 6;
/// Clamp applied to the "older" text before summarization.
const OLDER_TEXT_CLAMP: usize = 6000;
/// Clamp applied to the first summarization pass.
const SUMMARY_CLAMP: usize = 1500;
/// Clamp applied to the second (re-summarization) pass.
const RESUMMARY_CLAMP: usize = 800;

/// `max(1000, max_context_tokens - reserve_for_output)` (§4.5 Budget).
pub fn budget_tokens() -> usize {
    MAX_CONTEXT_TOKENS.saturating_sub(RESERVE_FOR_OUTPUT).max(1000)
}

/// Heuristic token estimate: `ceil(chars / 4)` (§4.5 Token estimation).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Formats one message as `"<role>: <content>"` (§4.5 Formatting).
fn format_message(m: &ChatMessage) -> String {
    format!("{}: {}", m.role.as_str(), m.content)
}

/// Joins formatted messages with `\n` and appends the trailing
/// `"assistant:"` prompt line (§4.5 Formatting).
fn format_prompt(messages: &[ChatMessage]) -> String {
    let mut lines: Vec<String> = messages.iter().map(format_message).collect();
    lines.push("assistant:".to_string());
    lines.join("\n")
}

/// Keeps the first half and last half of `text`, joined by `"\n…\n"`, so the
/// result is at most `limit` characters (§4.5 step 3, head+tail clamping).
fn clamp_head_tail(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let half = limit / 2;
    let head: String = chars[..half].iter().collect();
    let tail: String = chars[chars.len() - half..].iter().collect();
    format!("{head}\n…\n{tail}")
}

/// Clamps to at most `limit` characters from the front, used for the final
/// summary/re-summary hard clamps.
fn clamp_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    text.chars().take(limit).collect()
}

/// Naïve extractive fallback used when the generator is unavailable during
/// summarization (§4.5 "If the Generator is unavailable..."): first 8
/// sentences + `"… "` + last 4 sentences, clamped to `target`.
fn naive_summary(text: &str, target: usize) -> String {
    let sentences: Vec<&str> = text
        .split_inclusive(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return clamp_chars(text, target);
    }
    let first: Vec<&str> = sentences.iter().take(8).copied().collect();
    let last_start = sentences.len().saturating_sub(4);
    let last: Vec<&str> = sentences[last_start.max(first.len())..].to_vec();
    let joined = if last.is_empty() {
        first.join(" ")
    } else {
        format!("{}… {}", first.join(" "), last.join(" "))
    };
    clamp_chars(&joined, target)
}

/// Summarizes `older_text` down to at most `target` characters, using the
/// generator when available and the naïve extractive fallback otherwise
/// (§4.5 step 4 and its fallback clause).
async fn summarize(generator: &dyn Generator, older_text: &str, target: usize) -> String {
    if !generator.is_available().await {
        return naive_summary(older_text, target);
    }
    let instructions = format!(
        "Summarize the following conversation excerpt in at most {target} characters. \
         Preserve technical detail relevant to the latest user request."
    );
    match generator.generate(&instructions, older_text).await {
        Ok(summary) => clamp_chars(&summary, target),
        Err(_) => naive_summary(older_text, target),
    }
}

/// Produces a single prompt string for `messages`, compressing older turns
/// via summarization when the naive prompt would exceed the budget (§4.5
/// algorithm, steps 1-6).
pub async fn build_prompt(generator: &dyn Generator, messages: &[ChatMessage]) -> String {
    let full_prompt = format_prompt(messages);
    if estimate_tokens(&full_prompt) <= budget_tokens() {
        return full_prompt;
    }

    let keep_recent = KEEP_RECENT.min(messages.len());
    let split = messages.len() - keep_recent;
    let older = &messages[..split];
    let recent = &messages[split..];

    let older_text = older.iter().map(format_message).collect::<Vec<_>>().join("\n");
    let clamped_older = clamp_head_tail(&older_text, OLDER_TEXT_CLAMP);

    let summary = summarize(generator, &clamped_older, SUMMARY_CLAMP).await;
    let recent_formatted = format_prompt(recent);
    let mut composed = format!("system: Conversation summary (compressed): \n{summary}\n{recent_formatted}");

    if estimate_tokens(&composed) > budget_tokens() {
        let re_summary = summarize(generator, &summary, RESUMMARY_CLAMP).await;
        composed = format!("system: Conversation summary (compressed): \n{re_summary}\n{recent_formatted}");
    }

    composed
}
